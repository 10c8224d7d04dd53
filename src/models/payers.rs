// src/models/payers.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Responsável financeiro (pai, mãe, empresa...). Não precisa ser usuário do sistema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payer {
    pub id: Uuid,

    pub establishment_id: Uuid,

    #[schema(example = "João da Silva")]
    pub name: String,

    pub email: Option<String>,
    pub phone: Option<String>,

    #[schema(example = "123.456.789-00")]
    pub tax_id: Option<String>,

    pub notes: Option<String>,

    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPayer {
    pub establishment_id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub tax_id: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePayerPayload {
    pub establishment_id: Option<Uuid>,

    #[validate(length(min = 1, message = "O nome do pagador é obrigatório."))]
    pub name: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    pub phone: Option<String>,
    pub tax_id: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePayerPayload {
    pub establishment_id: Option<Uuid>,

    #[validate(length(min = 1, message = "O nome do pagador é obrigatório."))]
    pub name: Option<String>,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    pub phone: Option<String>,
    pub tax_id: Option<String>,
    pub notes: Option<String>,
    pub is_active: Option<bool>,
}
