// src/middleware/tenancy.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::tenancy::EstablishmentScope,
};

// O nome do nosso cabeçalho HTTP customizado
pub const ESTABLISHMENT_ID_HEADER: &str = "x-establishment-id";

/// Estabelecimento selecionado na sessão do cliente (cabeçalho opcional).
#[derive(Debug, Clone, Copy, Default)]
pub struct EstablishmentContext(pub Option<Uuid>);

impl EstablishmentContext {
    /// Resolve e autoriza o escopo da operação. O `establishmentId` explícito
    /// da requisição vence o cabeçalho.
    pub async fn scope(
        &self,
        app_state: &AppState,
        user: &AuthenticatedUser,
        explicit: Option<Uuid>,
    ) -> Result<EstablishmentScope, AppError> {
        app_state
            .tenant_service
            .resolve_scope(user.0.id, explicit, self.0)
            .await
    }
}

impl<S> FromRequestParts<S> for EstablishmentContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(ESTABLISHMENT_ID_HEADER) else {
            return Ok(EstablishmentContext(None));
        };

        let value_str = value.to_str().map_err(|_| {
            AppError::Validation("Cabeçalho x-establishment-id contém caracteres inválidos.".to_string())
        })?;

        let establishment_id = Uuid::parse_str(value_str.trim()).map_err(|_| {
            AppError::Validation("Cabeçalho x-establishment-id inválido (não é um UUID).".to_string())
        })?;

        Ok(EstablishmentContext(Some(establishment_id)))
    }
}
