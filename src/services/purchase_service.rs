// src/services/purchase_service.rs

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{EstablishmentStore, PurchaseStore},
    ledger::{aggregate, checked_sum, paginate, round_money, Aggregate, Period},
    models::{
        purchases::{
            CreatePurchasePayload, LineItemPayload, NewPurchase, Purchase, PurchaseDetail,
            PurchaseListing,
        },
        tenancy::EstablishmentScope,
    },
};

fn purchase_not_found() -> AppError {
    AppError::NotFound("Compra não encontrada.".to_string())
}

#[derive(Clone)]
pub struct PurchaseService {
    purchases: Arc<dyn PurchaseStore>,
    establishments: Arc<dyn EstablishmentStore>,
}

impl PurchaseService {
    pub fn new(purchases: Arc<dyn PurchaseStore>, establishments: Arc<dyn EstablishmentStore>) -> Self {
        Self { purchases, establishments }
    }

    /// Cria a compra com os itens. O total nunca vem do cliente.
    pub async fn create_purchase(
        &self,
        scope: &EstablishmentScope,
        payload: CreatePurchasePayload,
    ) -> Result<PurchaseDetail, AppError> {
        payload.validate()?;

        // O responsável precisa fazer parte da equipe
        let link = self
            .establishments
            .find_link(payload.responsible_user_id, scope.establishment_id)
            .await?;
        if !link.is_some_and(|l| l.is_active) {
            return Err(AppError::Validation(
                "O responsável pela compra não é membro ativo do estabelecimento.".to_string(),
            ));
        }

        // Totais calculados antes de tocar no store: estouro para aqui
        let items = payload
            .line_items
            .into_iter()
            .map(LineItemPayload::into_new_line_item)
            .collect::<Result<Vec<_>, _>>()?;
        checked_sum(items.iter().map(|item| item.line_total))?;

        let detail = self
            .purchases
            .create_with_items(
                NewPurchase {
                    establishment_id: scope.establishment_id,
                    responsible_user_id: payload.responsible_user_id,
                    name: payload.name,
                    category: payload.category,
                    description: payload.description,
                    purchase_date: payload.date,
                },
                items,
            )
            .await?;

        tracing::info!(
            "🛒 Compra {} registrada (R$ {}, {} itens) no estabelecimento {}",
            detail.purchase.id,
            detail.purchase.total,
            detail.items.len(),
            scope.establishment_id
        );

        Ok(detail)
    }

    pub async fn get_purchase(&self, scope: &EstablishmentScope, id: Uuid) -> Result<PurchaseDetail, AppError> {
        let purchase = self
            .purchases
            .find(scope.establishment_id, id)
            .await?
            .ok_or_else(purchase_not_found)?;
        let items = self.purchases.list_items(scope.establishment_id, id).await?;

        Ok(PurchaseDetail { purchase, items })
    }

    /// Compras do período (ou todas), mais recentes primeiro.
    pub async fn period_purchases(
        &self,
        scope: &EstablishmentScope,
        period: Option<&Period>,
    ) -> Result<Aggregate<Purchase>, AppError> {
        let mut purchases = self.purchases.list(scope.establishment_id).await?;
        purchases.sort_by(|a, b| {
            b.purchase_date
                .cmp(&a.purchase_date)
                .then(b.created_at.cmp(&a.created_at))
        });

        match period {
            Some(period) => aggregate(&purchases, period, |p| Some(p.purchase_date), |p| p.total),
            None => Ok(Aggregate {
                count: purchases.len(),
                total: round_money(checked_sum(purchases.iter().map(|p| p.total))?),
                filtered: purchases,
            }),
        }
    }

    pub async fn list_purchases(
        &self,
        scope: &EstablishmentScope,
        period: Option<Period>,
        page: i64,
        page_size: usize,
    ) -> Result<PurchaseListing, AppError> {
        let result = self.period_purchases(scope, period.as_ref()).await?;

        Ok(PurchaseListing {
            page: paginate(&result.filtered, page, page_size),
            count: result.count,
            total: result.total,
        })
    }

    pub async fn add_item(
        &self,
        scope: &EstablishmentScope,
        purchase_id: Uuid,
        payload: LineItemPayload,
    ) -> Result<PurchaseDetail, AppError> {
        payload.validate()?;

        self.purchases
            .add_item(scope.establishment_id, purchase_id, payload.into_new_line_item()?)
            .await?
            .ok_or_else(purchase_not_found)
    }

    pub async fn remove_item(
        &self,
        scope: &EstablishmentScope,
        purchase_id: Uuid,
        item_id: Uuid,
    ) -> Result<PurchaseDetail, AppError> {
        self.purchases
            .remove_item(scope.establishment_id, purchase_id, item_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Compra ou item não encontrado.".to_string()))
    }

    pub async fn delete_purchase(&self, scope: &EstablishmentScope, id: Uuid) -> Result<(), AppError> {
        if !self.purchases.delete(scope.establishment_id, id).await? {
            return Err(purchase_not_found());
        }
        Ok(())
    }
}
