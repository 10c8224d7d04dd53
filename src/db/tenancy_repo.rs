// src/db/tenancy_repo.rs

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, Executor};
use uuid::Uuid;

use crate::{
    common::{db_utils::translate_db_error, error::AppError},
    db::repository::EstablishmentStore,
    models::tenancy::{
        Establishment, EstablishmentMember, EstablishmentRole, NewEstablishment,
        UserEstablishment, UserEstablishmentLink,
    },
};

#[derive(Clone)]
pub struct EstablishmentRepository {
    pool: PgPool,
}

const ESTABLISHMENT_COLUMNS: &str = "id, created_by, name, tax_id, email, phone, address, is_active, created_at, updated_at";
const LINK_COLUMNS: &str = "id, user_id, establishment_id, role, is_active, created_at";

// Linha do JOIN estabelecimento + papel
#[derive(FromRow)]
struct EstablishmentWithRole {
    #[sqlx(flatten)]
    establishment: Establishment,
    role: EstablishmentRole,
}

impl EstablishmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_establishment<'e, E>(
        &self,
        executor: E, // Aceita um executor (pool ou transação)
        new_establishment: &NewEstablishment,
    ) -> Result<Establishment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Establishment>(&format!(
            r#"
            INSERT INTO establishments (created_by, name, tax_id, email, phone, address)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {ESTABLISHMENT_COLUMNS}
            "#
        ))
        .bind(new_establishment.created_by)
        .bind(&new_establishment.name)
        .bind(&new_establishment.tax_id)
        .bind(&new_establishment.email)
        .bind(&new_establishment.phone)
        .bind(&new_establishment.address)
        .fetch_one(executor)
        .await
        .map_err(translate_db_error)
    }

    async fn insert_link<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        establishment_id: Uuid,
        role: EstablishmentRole,
    ) -> Result<UserEstablishmentLink, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, UserEstablishmentLink>(&format!(
            r#"
            INSERT INTO user_establishment_links (user_id, establishment_id, role)
            VALUES ($1, $2, $3)
            RETURNING {LINK_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(establishment_id)
        .bind(role)
        .fetch_one(executor)
        .await
        .map_err(translate_db_error) // Par duplicado vira Conflict
    }
}

#[async_trait]
impl EstablishmentStore for EstablishmentRepository {
    async fn create_with_owner(
        &self,
        new_establishment: NewEstablishment,
    ) -> Result<(Establishment, UserEstablishmentLink), AppError> {
        // 1. Inicia a transação
        let mut tx = self.pool.begin().await?;

        // 2. Cria o estabelecimento
        let establishment = self.insert_establishment(&mut *tx, &new_establishment).await?;

        // 3. Vincula o criador como dono. Se falhar, o drop do `tx` desfaz tudo.
        let link = self
            .insert_link(
                &mut *tx,
                new_establishment.created_by,
                establishment.id,
                EstablishmentRole::Owner,
            )
            .await?;

        // 4. Commit
        tx.commit().await?;

        Ok((establishment, link))
    }

    async fn find(&self, id: Uuid) -> Result<Option<Establishment>, AppError> {
        let establishment = sqlx::query_as::<_, Establishment>(&format!(
            "SELECT {ESTABLISHMENT_COLUMNS} FROM establishments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(establishment)
    }

    async fn update(&self, establishment: &Establishment) -> Result<Option<Establishment>, AppError> {
        sqlx::query_as::<_, Establishment>(&format!(
            r#"
            UPDATE establishments
            SET name = $2, tax_id = $3, email = $4, phone = $5, address = $6,
                is_active = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING {ESTABLISHMENT_COLUMNS}
            "#
        ))
        .bind(establishment.id)
        .bind(&establishment.name)
        .bind(&establishment.tax_id)
        .bind(&establishment.email)
        .bind(&establishment.phone)
        .bind(&establishment.address)
        .bind(establishment.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(translate_db_error)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<UserEstablishment>, AppError> {
        let rows = sqlx::query_as::<_, EstablishmentWithRole>(
            r#"
            SELECT e.id, e.created_by, e.name, e.tax_id, e.email, e.phone, e.address,
                   e.is_active, e.created_at, e.updated_at, l.role
            FROM establishments e
            INNER JOIN user_establishment_links l ON l.establishment_id = e.id
            WHERE l.user_id = $1 AND l.is_active = TRUE
            ORDER BY e.name ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| UserEstablishment { establishment: row.establishment, role: row.role })
            .collect())
    }

    async fn find_link(
        &self,
        user_id: Uuid,
        establishment_id: Uuid,
    ) -> Result<Option<UserEstablishmentLink>, AppError> {
        let link = sqlx::query_as::<_, UserEstablishmentLink>(&format!(
            r#"
            SELECT {LINK_COLUMNS}
            FROM user_establishment_links
            WHERE user_id = $1 AND establishment_id = $2
            "#
        ))
        .bind(user_id)
        .bind(establishment_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(link)
    }

    async fn create_link(
        &self,
        user_id: Uuid,
        establishment_id: Uuid,
        role: EstablishmentRole,
    ) -> Result<UserEstablishmentLink, AppError> {
        self.insert_link(&self.pool, user_id, establishment_id, role).await
    }

    async fn set_link_active(
        &self,
        user_id: Uuid,
        establishment_id: Uuid,
        is_active: bool,
    ) -> Result<Option<UserEstablishmentLink>, AppError> {
        let link = sqlx::query_as::<_, UserEstablishmentLink>(&format!(
            r#"
            UPDATE user_establishment_links
            SET is_active = $3
            WHERE user_id = $1 AND establishment_id = $2
            RETURNING {LINK_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(establishment_id)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await?;
        Ok(link)
    }

    async fn list_members(&self, establishment_id: Uuid) -> Result<Vec<EstablishmentMember>, AppError> {
        let members = sqlx::query_as::<_, EstablishmentMember>(
            r#"
            SELECT u.id AS user_id, u.name, u.email, l.role, l.is_active
            FROM user_establishment_links l
            INNER JOIN users u ON u.id = l.user_id
            WHERE l.establishment_id = $1
            ORDER BY u.name ASC
            "#,
        )
        .bind(establishment_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(members)
    }
}
