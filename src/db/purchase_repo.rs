// src/db/purchase_repo.rs

use async_trait::async_trait;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::translate_db_error, error::AppError},
    db::repository::{PurchaseStore, ScopedRepository},
    models::purchases::{NewLineItem, NewPurchase, Purchase, PurchaseDetail, PurchaseLineItem},
};

#[derive(Clone)]
pub struct PurchaseRepository {
    pool: PgPool,
}

const PURCHASE_COLUMNS: &str = "id, establishment_id, responsible_user_id, name, category, description, purchase_date, total, created_at, updated_at";
const ITEM_COLUMNS: &str = "id, purchase_id, product_name, quantity, unit_price, line_total, category, note, created_at";

impl PurchaseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_item<'e, E>(
        &self,
        executor: E,
        purchase_id: Uuid,
        item: &NewLineItem,
    ) -> Result<PurchaseLineItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, PurchaseLineItem>(&format!(
            r#"
            INSERT INTO purchase_line_items (
                purchase_id, product_name, quantity, unit_price, line_total, category, note
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(purchase_id)
        .bind(&item.product_name)
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(item.line_total)
        .bind(&item.category)
        .bind(&item.note)
        .fetch_one(executor)
        .await
        .map_err(translate_db_error)
    }

    /// Regrava o total da compra como a soma dos itens. Devolve a compra atualizada.
    async fn recalculate_total<'e, E>(
        &self,
        executor: E,
        establishment_id: Uuid,
        purchase_id: Uuid,
    ) -> Result<Purchase, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let purchase = sqlx::query_as::<_, Purchase>(&format!(
            r#"
            UPDATE purchases
            SET total = (
                SELECT COALESCE(SUM(line_total), 0)
                FROM purchase_line_items
                WHERE purchase_line_items.purchase_id = purchases.id
            ),
            updated_at = NOW()
            WHERE id = $1 AND establishment_id = $2
            RETURNING {PURCHASE_COLUMNS}
            "#
        ))
        .bind(purchase_id)
        .bind(establishment_id)
        .fetch_one(executor)
        .await?;
        Ok(purchase)
    }

    async fn items_of<'e, E>(&self, executor: E, purchase_id: Uuid) -> Result<Vec<PurchaseLineItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, PurchaseLineItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM purchase_line_items WHERE purchase_id = $1 ORDER BY created_at ASC, id ASC"
        ))
        .bind(purchase_id)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }

    // Trava a compra (FOR UPDATE) dentro da transação, já checando o estabelecimento
    async fn lock_purchase<'e, E>(
        &self,
        executor: E,
        establishment_id: Uuid,
        purchase_id: Uuid,
    ) -> Result<Option<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let id: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM purchases WHERE id = $1 AND establishment_id = $2 FOR UPDATE",
        )
        .bind(purchase_id)
        .bind(establishment_id)
        .fetch_optional(executor)
        .await?;
        Ok(id)
    }
}

#[async_trait]
impl ScopedRepository<Purchase> for PurchaseRepository {
    async fn find(&self, establishment_id: Uuid, id: Uuid) -> Result<Option<Purchase>, AppError> {
        let purchase = sqlx::query_as::<_, Purchase>(&format!(
            "SELECT {PURCHASE_COLUMNS} FROM purchases WHERE id = $1 AND establishment_id = $2"
        ))
        .bind(id)
        .bind(establishment_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(purchase)
    }

    async fn list(&self, establishment_id: Uuid) -> Result<Vec<Purchase>, AppError> {
        let purchases = sqlx::query_as::<_, Purchase>(&format!(
            r#"
            SELECT {PURCHASE_COLUMNS}
            FROM purchases
            WHERE establishment_id = $1
            ORDER BY purchase_date DESC, created_at DESC
            "#
        ))
        .bind(establishment_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(purchases)
    }

    // Os itens caem junto (ON DELETE CASCADE)
    async fn delete(&self, establishment_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM purchases WHERE id = $1 AND establishment_id = $2")
            .bind(id)
            .bind(establishment_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl PurchaseStore for PurchaseRepository {
    async fn create_with_items(
        &self,
        new_purchase: NewPurchase,
        items: Vec<NewLineItem>,
    ) -> Result<PurchaseDetail, AppError> {
        // 1. Inicia a transação: compra + itens + total, ou nada
        let mut tx = self.pool.begin().await?;

        // 2. Cabeçalho da compra (total começa em zero)
        let purchase = sqlx::query_as::<_, Purchase>(&format!(
            r#"
            INSERT INTO purchases (
                establishment_id, responsible_user_id, name, category, description, purchase_date
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {PURCHASE_COLUMNS}
            "#
        ))
        .bind(new_purchase.establishment_id)
        .bind(new_purchase.responsible_user_id)
        .bind(&new_purchase.name)
        .bind(&new_purchase.category)
        .bind(&new_purchase.description)
        .bind(new_purchase.purchase_date)
        .fetch_one(&mut *tx)
        .await
        .map_err(translate_db_error)?;

        // 3. Itens
        let mut saved_items = Vec::with_capacity(items.len());
        for item in &items {
            saved_items.push(self.insert_item(&mut *tx, purchase.id, item).await?);
        }

        // 4. Total = soma dos itens
        let purchase = self
            .recalculate_total(&mut *tx, new_purchase.establishment_id, purchase.id)
            .await?;

        // 5. Commit
        tx.commit().await?;

        Ok(PurchaseDetail { purchase, items: saved_items })
    }

    async fn list_items(
        &self,
        establishment_id: Uuid,
        purchase_id: Uuid,
    ) -> Result<Vec<PurchaseLineItem>, AppError> {
        let items = sqlx::query_as::<_, PurchaseLineItem>(
            r#"
            SELECT i.id, i.purchase_id, i.product_name, i.quantity, i.unit_price,
                   i.line_total, i.category, i.note, i.created_at
            FROM purchase_line_items i
            INNER JOIN purchases p ON p.id = i.purchase_id
            WHERE i.purchase_id = $1 AND p.establishment_id = $2
            ORDER BY i.created_at ASC, i.id ASC
            "#,
        )
        .bind(purchase_id)
        .bind(establishment_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn add_item(
        &self,
        establishment_id: Uuid,
        purchase_id: Uuid,
        item: NewLineItem,
    ) -> Result<Option<PurchaseDetail>, AppError> {
        let mut tx = self.pool.begin().await?;

        if self.lock_purchase(&mut *tx, establishment_id, purchase_id).await?.is_none() {
            return Ok(None);
        }

        self.insert_item(&mut *tx, purchase_id, &item).await?;
        let purchase = self.recalculate_total(&mut *tx, establishment_id, purchase_id).await?;
        let items = self.items_of(&mut *tx, purchase_id).await?;

        tx.commit().await?;

        Ok(Some(PurchaseDetail { purchase, items }))
    }

    async fn remove_item(
        &self,
        establishment_id: Uuid,
        purchase_id: Uuid,
        item_id: Uuid,
    ) -> Result<Option<PurchaseDetail>, AppError> {
        let mut tx = self.pool.begin().await?;

        if self.lock_purchase(&mut *tx, establishment_id, purchase_id).await?.is_none() {
            return Ok(None);
        }

        let removed = sqlx::query("DELETE FROM purchase_line_items WHERE id = $1 AND purchase_id = $2")
            .bind(item_id)
            .bind(purchase_id)
            .execute(&mut *tx)
            .await?;

        if removed.rows_affected() == 0 {
            return Ok(None);
        }

        let purchase = self.recalculate_total(&mut *tx, establishment_id, purchase_id).await?;
        let items = self.items_of(&mut *tx, purchase_id).await?;

        tx.commit().await?;

        Ok(Some(PurchaseDetail { purchase, items }))
    }
}
