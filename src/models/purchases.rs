// src/models/purchases.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    ledger::checked_line_total,
    models::finance::{bounded_amount, bounded_quantity},
};

// --- Structs ---

/// Uma compra (gasto) do estabelecimento. O total é sempre a soma dos itens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub id: Uuid,

    pub establishment_id: Uuid,

    // Usuário responsável pela compra (membro do estabelecimento)
    pub responsible_user_id: Uuid,

    #[schema(example = "Material de limpeza")]
    pub name: String,

    #[schema(example = "limpeza")]
    pub category: String,

    pub description: Option<String>,

    #[schema(value_type = String, format = Date, example = "2025-11-03")]
    pub purchase_date: NaiveDate,

    #[schema(example = "87.50")]
    pub total: Decimal,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseLineItem {
    pub id: Uuid,
    pub purchase_id: Uuid,

    #[schema(example = "Detergente 500ml")]
    pub product_name: String,

    #[schema(example = "5")]
    pub quantity: Decimal,
    #[schema(example = "3.50")]
    pub unit_price: Decimal,

    // Sempre quantity * unit_price, calculado aqui, nunca vindo do cliente
    #[schema(example = "17.50")]
    pub line_total: Decimal,

    pub category: Option<String>,
    pub note: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// Compra com seus itens.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseDetail {
    #[serde(flatten)]
    pub purchase: Purchase,
    pub items: Vec<PurchaseLineItem>,
}

#[derive(Debug, Clone)]
pub struct NewPurchase {
    pub establishment_id: Uuid,
    pub responsible_user_id: Uuid,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub purchase_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewLineItem {
    pub product_name: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub line_total: Decimal,
    pub category: Option<String>,
    pub note: Option<String>,
}

/// Resposta da listagem de compras: página + total do filtro inteiro.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseListing {
    pub page: crate::ledger::Page<Purchase>,
    pub count: usize,
    pub total: Decimal,
}

// --- Payloads ---

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LineItemPayload {
    #[validate(length(min = 1, message = "O nome do produto é obrigatório."))]
    pub product_name: String,

    #[validate(custom(function = "bounded_quantity"))]
    pub quantity: Decimal,

    #[validate(custom(function = "bounded_amount"))]
    pub unit_price: Decimal,

    pub category: Option<String>,
    pub note: Option<String>,
}

impl LineItemPayload {
    /// O total da linha é recalculado aqui, em todo item adicionado.
    pub fn into_new_line_item(self) -> Result<NewLineItem, AppError> {
        Ok(NewLineItem {
            line_total: checked_line_total(self.quantity, self.unit_price)?,
            product_name: self.product_name,
            quantity: self.quantity,
            unit_price: self.unit_price,
            category: self.category,
            note: self.note,
        })
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePurchasePayload {
    pub establishment_id: Option<Uuid>,

    pub responsible_user_id: Uuid,

    #[validate(length(min = 1, message = "O nome da compra é obrigatório."))]
    pub name: String,

    #[validate(length(min = 1, message = "A categoria é obrigatória."))]
    pub category: String,

    #[schema(value_type = String, format = Date, example = "2025-11-03")]
    pub date: NaiveDate,

    pub description: Option<String>,

    #[validate(length(min = 1, message = "Informe ao menos um item."), nested)]
    pub line_items: Vec<LineItemPayload>,
}
