// src/db/finance_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{db_utils::translate_db_error, error::AppError},
    db::repository::{ChargeStore, ScopedRepository},
    models::finance::{Charge, NewCharge},
};

#[derive(Clone)]
pub struct ChargeRepository {
    pool: PgPool,
}

impl ChargeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const CHARGE_COLUMNS: &str = "id, establishment_id, payer_id, amount, due_date, payment_date, status, description, created_at, updated_at";

// =========================================================================
//  MENSALIDADES (Cobranças)
// =========================================================================

#[async_trait]
impl ScopedRepository<Charge> for ChargeRepository {
    async fn find(&self, establishment_id: Uuid, id: Uuid) -> Result<Option<Charge>, AppError> {
        let charge = sqlx::query_as::<_, Charge>(&format!(
            "SELECT {CHARGE_COLUMNS} FROM charges WHERE id = $1 AND establishment_id = $2"
        ))
        .bind(id)
        .bind(establishment_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(charge)
    }

    async fn list(&self, establishment_id: Uuid) -> Result<Vec<Charge>, AppError> {
        let charges = sqlx::query_as::<_, Charge>(&format!(
            r#"
            SELECT {CHARGE_COLUMNS}
            FROM charges
            WHERE establishment_id = $1
            ORDER BY due_date ASC, created_at ASC
            "#
        ))
        .bind(establishment_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(charges)
    }

    async fn delete(&self, establishment_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM charges WHERE id = $1 AND establishment_id = $2")
            .bind(id)
            .bind(establishment_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ChargeStore for ChargeRepository {
    async fn create_charge(&self, new_charge: NewCharge) -> Result<Charge, AppError> {
        sqlx::query_as::<_, Charge>(&format!(
            r#"
            INSERT INTO charges (
                establishment_id, payer_id, amount,
                due_date, payment_date, status, description
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {CHARGE_COLUMNS}
            "#
        ))
        .bind(new_charge.establishment_id)
        .bind(new_charge.payer_id)
        .bind(new_charge.amount)
        .bind(new_charge.due_date)
        .bind(new_charge.payment_date)
        .bind(new_charge.status)
        .bind(&new_charge.description)
        .fetch_one(&self.pool)
        .await
        .map_err(translate_db_error)
    }

    // Última escrita vence: sem controle de versão.
    async fn update_charge(&self, charge: &Charge) -> Result<Option<Charge>, AppError> {
        sqlx::query_as::<_, Charge>(&format!(
            r#"
            UPDATE charges
            SET payer_id = $3, amount = $4, due_date = $5, payment_date = $6,
                status = $7, description = $8, updated_at = NOW()
            WHERE id = $1 AND establishment_id = $2
            RETURNING {CHARGE_COLUMNS}
            "#
        ))
        .bind(charge.id)
        .bind(charge.establishment_id)
        .bind(charge.payer_id)
        .bind(charge.amount)
        .bind(charge.due_date)
        .bind(charge.payment_date)
        .bind(charge.status)
        .bind(&charge.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(translate_db_error)
    }
}
