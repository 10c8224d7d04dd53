// src/handlers/payers.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, tenancy::EstablishmentContext},
    models::{
        payers::{CreatePayerPayload, Payer, UpdatePayerPayload},
        query::ScopeQuery,
    },
};

// POST /api/payers
#[utoipa::path(
    post,
    path = "/api/payers",
    tag = "Payers",
    request_body = CreatePayerPayload,
    params(("x-establishment-id" = Option<Uuid>, Header, description = "Estabelecimento selecionado")),
    responses(
        (status = 201, description = "Pagador criado", body = Payer),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Sem acesso ao estabelecimento")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_payer(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ctx: EstablishmentContext,
    Json(payload): Json<CreatePayerPayload>,
) -> Result<impl IntoResponse, AppError> {
    let scope = ctx.scope(&app_state, &user, payload.establishment_id).await?;
    let payer = app_state.payer_service.create_payer(&scope, payload).await?;

    Ok((StatusCode::CREATED, Json(payer)))
}

// GET /api/payers
#[utoipa::path(
    get,
    path = "/api/payers",
    tag = "Payers",
    params(
        ScopeQuery,
        ("x-establishment-id" = Option<Uuid>, Header, description = "Estabelecimento selecionado")
    ),
    responses(
        (status = 200, description = "Pagadores do estabelecimento", body = Vec<Payer>),
        (status = 403, description = "Sem acesso ao estabelecimento")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_payers(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ctx: EstablishmentContext,
    Query(query): Query<ScopeQuery>,
) -> Result<impl IntoResponse, AppError> {
    let scope = ctx.scope(&app_state, &user, query.establishment_id).await?;
    let payers = app_state.payer_service.list_payers(&scope).await?;

    Ok((StatusCode::OK, Json(payers)))
}

// GET /api/payers/{id}
#[utoipa::path(
    get,
    path = "/api/payers/{id}",
    tag = "Payers",
    params(
        ("id" = Uuid, Path, description = "ID do pagador"),
        ScopeQuery,
        ("x-establishment-id" = Option<Uuid>, Header, description = "Estabelecimento selecionado")
    ),
    responses(
        (status = 200, description = "Pagador", body = Payer),
        (status = 404, description = "Pagador não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_payer(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ctx: EstablishmentContext,
    Path(id): Path<Uuid>,
    Query(query): Query<ScopeQuery>,
) -> Result<impl IntoResponse, AppError> {
    let scope = ctx.scope(&app_state, &user, query.establishment_id).await?;
    let payer = app_state.payer_service.get_payer(&scope, id).await?;

    Ok((StatusCode::OK, Json(payer)))
}

// PUT /api/payers/{id}
#[utoipa::path(
    put,
    path = "/api/payers/{id}",
    tag = "Payers",
    request_body = UpdatePayerPayload,
    params(
        ("id" = Uuid, Path, description = "ID do pagador"),
        ("x-establishment-id" = Option<Uuid>, Header, description = "Estabelecimento selecionado")
    ),
    responses(
        (status = 200, description = "Pagador atualizado", body = Payer),
        (status = 404, description = "Pagador não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_payer(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ctx: EstablishmentContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePayerPayload>,
) -> Result<impl IntoResponse, AppError> {
    let scope = ctx.scope(&app_state, &user, payload.establishment_id).await?;
    let payer = app_state.payer_service.update_payer(&scope, id, payload).await?;

    Ok((StatusCode::OK, Json(payer)))
}

// DELETE /api/payers/{id}
#[utoipa::path(
    delete,
    path = "/api/payers/{id}",
    tag = "Payers",
    params(
        ("id" = Uuid, Path, description = "ID do pagador"),
        ScopeQuery,
        ("x-establishment-id" = Option<Uuid>, Header, description = "Estabelecimento selecionado")
    ),
    responses(
        (status = 204, description = "Pagador removido"),
        (status = 404, description = "Pagador não encontrado"),
        (status = 409, description = "Pagador ainda tem mensalidades")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_payer(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ctx: EstablishmentContext,
    Path(id): Path<Uuid>,
    Query(query): Query<ScopeQuery>,
) -> Result<impl IntoResponse, AppError> {
    let scope = ctx.scope(&app_state, &user, query.establishment_id).await?;
    app_state.payer_service.delete_payer(&scope, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
