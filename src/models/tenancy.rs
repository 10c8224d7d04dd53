// src/models/tenancy.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// ---
// 1. Establishment (A "Escola")
// ---
// A raiz do tenant: pagadores, mensalidades e compras pertencem a ela.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Establishment {
    pub id: Uuid,

    // Quem criou (e virou dono)
    pub created_by: Uuid,

    #[schema(example = "Escola ABC")]
    pub name: String,

    #[schema(example = "12.345.678/0001-99")]
    pub tax_id: Option<String>,

    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,

    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewEstablishment {
    pub created_by: Uuid,
    pub name: String,
    pub tax_id: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

// ---
// 2. Papel do usuário dentro do estabelecimento
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "establishment_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EstablishmentRole {
    Owner,
    Admin,
    Collaborator,
    Teacher,
}

impl EstablishmentRole {
    /// Dono e administrador gerenciam a escola e sua equipe.
    pub fn can_manage(self) -> bool {
        matches!(self, EstablishmentRole::Owner | EstablishmentRole::Admin)
    }
}

// ---
// 3. UserEstablishmentLink (A "Ponte" Usuário-Estabelecimento)
// ---
// O par (user_id, establishment_id) é único.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserEstablishmentLink {
    pub id: Uuid,
    pub user_id: Uuid,
    pub establishment_id: Uuid,
    pub role: EstablishmentRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Estabelecimento em que a operação atual acontece, já autorizado.
/// Só o `TenantService` cria esse valor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EstablishmentScope {
    pub establishment_id: Uuid,
    pub user_id: Uuid,
    pub role: EstablishmentRole,
}

// Estabelecimento visto pelo usuário logado, com o papel dele
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserEstablishment {
    #[serde(flatten)]
    pub establishment: Establishment,
    pub role: EstablishmentRole,
}

// Membro da equipe, para a tela de gestão de acessos
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EstablishmentMember {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: EstablishmentRole,
    pub is_active: bool,
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEstablishmentPayload {
    #[validate(length(min = 1, message = "O nome do estabelecimento é obrigatório."))]
    #[schema(example = "Escola ABC")]
    pub name: String,

    #[validate(length(min = 1, message = "O CNPJ não pode ser vazio."))]
    pub tax_id: Option<String>,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEstablishmentPayload {
    #[validate(length(min = 1, message = "O nome do estabelecimento é obrigatório."))]
    pub name: Option<String>,

    #[validate(length(min = 1, message = "O CNPJ não pode ser vazio."))]
    pub tax_id: Option<String>,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InviteMemberPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "professor@escolaabc.com.br")]
    pub email: String,

    #[schema(example = "teacher")]
    pub role: EstablishmentRole,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMemberPayload {
    pub is_active: bool,
}
