// src/db/payer_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{db_utils::translate_db_error, error::AppError},
    db::repository::{PayerStore, ScopedRepository},
    models::payers::{NewPayer, Payer},
};

#[derive(Clone)]
pub struct PayerRepository {
    pool: PgPool,
}

impl PayerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const PAYER_COLUMNS: &str =
    "id, establishment_id, name, email, phone, tax_id, notes, is_active, created_at, updated_at";

#[async_trait]
impl ScopedRepository<Payer> for PayerRepository {
    async fn find(&self, establishment_id: Uuid, id: Uuid) -> Result<Option<Payer>, AppError> {
        let payer = sqlx::query_as::<_, Payer>(&format!(
            "SELECT {PAYER_COLUMNS} FROM payers WHERE id = $1 AND establishment_id = $2"
        ))
        .bind(id)
        .bind(establishment_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(payer)
    }

    async fn list(&self, establishment_id: Uuid) -> Result<Vec<Payer>, AppError> {
        let payers = sqlx::query_as::<_, Payer>(&format!(
            "SELECT {PAYER_COLUMNS} FROM payers WHERE establishment_id = $1 ORDER BY name ASC"
        ))
        .bind(establishment_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(payers)
    }

    async fn delete(&self, establishment_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM payers WHERE id = $1 AND establishment_id = $2")
            .bind(id)
            .bind(establishment_id)
            .execute(&self.pool)
            .await
            .map_err(translate_db_error)?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl PayerStore for PayerRepository {
    async fn create_payer(&self, new_payer: NewPayer) -> Result<Payer, AppError> {
        sqlx::query_as::<_, Payer>(&format!(
            r#"
            INSERT INTO payers (establishment_id, name, email, phone, tax_id, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {PAYER_COLUMNS}
            "#
        ))
        .bind(new_payer.establishment_id)
        .bind(&new_payer.name)
        .bind(&new_payer.email)
        .bind(&new_payer.phone)
        .bind(&new_payer.tax_id)
        .bind(&new_payer.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(translate_db_error)
    }

    async fn update_payer(&self, payer: &Payer) -> Result<Option<Payer>, AppError> {
        sqlx::query_as::<_, Payer>(&format!(
            r#"
            UPDATE payers
            SET name = $3, email = $4, phone = $5, tax_id = $6, notes = $7,
                is_active = $8, updated_at = NOW()
            WHERE id = $1 AND establishment_id = $2
            RETURNING {PAYER_COLUMNS}
            "#
        ))
        .bind(payer.id)
        .bind(payer.establishment_id)
        .bind(&payer.name)
        .bind(&payer.email)
        .bind(&payer.phone)
        .bind(&payer.tax_id)
        .bind(&payer.notes)
        .bind(payer.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(translate_db_error)
    }

    async fn count_charges(&self, establishment_id: Uuid, payer_id: Uuid) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM charges WHERE payer_id = $1 AND establishment_id = $2",
        )
        .bind(payer_id)
        .bind(establishment_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
