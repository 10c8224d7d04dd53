// src/handlers/charges.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, tenancy::EstablishmentContext},
    models::{
        finance::{
            ChargeListing, ChargeSummary, ChargeView, CreateChargePayload, MarkChargePaidPayload,
            UpdateChargePayload,
        },
        query::{ListQuery, ScopeQuery},
    },
};

// POST /api/charges
#[utoipa::path(
    post,
    path = "/api/charges",
    tag = "Charges",
    request_body = CreateChargePayload,
    params(("x-establishment-id" = Option<Uuid>, Header, description = "Estabelecimento selecionado")),
    responses(
        (status = 201, description = "Mensalidade criada", body = ChargeView),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Pagador não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_charge(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ctx: EstablishmentContext,
    Json(payload): Json<CreateChargePayload>,
) -> Result<impl IntoResponse, AppError> {
    let scope = ctx.scope(&app_state, &user, payload.establishment_id).await?;
    let charge = app_state
        .charge_service
        .create_charge(&scope, payload, Utc::now().date_naive())
        .await?;

    Ok((StatusCode::CREATED, Json(charge)))
}

// GET /api/charges
#[utoipa::path(
    get,
    path = "/api/charges",
    tag = "Charges",
    params(
        ListQuery,
        ("x-establishment-id" = Option<Uuid>, Header, description = "Estabelecimento selecionado")
    ),
    responses(
        (status = 200, description = "Página de mensalidades + totais do filtro", body = ChargeListing),
        (status = 400, description = "Período inválido"),
        (status = 403, description = "Sem acesso ao estabelecimento")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_charges(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ctx: EstablishmentContext,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let scope = ctx.scope(&app_state, &user, query.establishment_id).await?;
    let listing = app_state
        .charge_service
        .list_charges(
            &scope,
            query.period()?,
            query.date_field.unwrap_or_default(),
            query.page(),
            query.page_size(app_state.config.default_page_size),
            Utc::now().date_naive(),
        )
        .await?;

    Ok((StatusCode::OK, Json(listing)))
}

// GET /api/charges/summary
#[utoipa::path(
    get,
    path = "/api/charges/summary",
    tag = "Charges",
    params(
        ListQuery,
        ("x-establishment-id" = Option<Uuid>, Header, description = "Estabelecimento selecionado")
    ),
    responses(
        (status = 200, description = "Totais por status efetivo", body = ChargeSummary),
        (status = 400, description = "Período inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn charges_summary(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ctx: EstablishmentContext,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let scope = ctx.scope(&app_state, &user, query.establishment_id).await?;
    let summary = app_state
        .charge_service
        .summary(
            &scope,
            query.period()?,
            query.date_field.unwrap_or_default(),
            Utc::now().date_naive(),
        )
        .await?;

    Ok((StatusCode::OK, Json(summary)))
}

// GET /api/charges/{id}
#[utoipa::path(
    get,
    path = "/api/charges/{id}",
    tag = "Charges",
    params(
        ("id" = Uuid, Path, description = "ID da mensalidade"),
        ScopeQuery,
        ("x-establishment-id" = Option<Uuid>, Header, description = "Estabelecimento selecionado")
    ),
    responses(
        (status = 200, description = "Mensalidade", body = ChargeView),
        (status = 404, description = "Mensalidade não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_charge(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ctx: EstablishmentContext,
    Path(id): Path<Uuid>,
    Query(query): Query<ScopeQuery>,
) -> Result<impl IntoResponse, AppError> {
    let scope = ctx.scope(&app_state, &user, query.establishment_id).await?;
    let charge = app_state
        .charge_service
        .get_charge(&scope, id, Utc::now().date_naive())
        .await?;

    Ok((StatusCode::OK, Json(charge)))
}

// PUT /api/charges/{id}
#[utoipa::path(
    put,
    path = "/api/charges/{id}",
    tag = "Charges",
    request_body = UpdateChargePayload,
    params(
        ("id" = Uuid, Path, description = "ID da mensalidade"),
        ("x-establishment-id" = Option<Uuid>, Header, description = "Estabelecimento selecionado")
    ),
    responses(
        (status = 200, description = "Mensalidade atualizada", body = ChargeView),
        (status = 400, description = "Dados inválidos ou transição de status proibida"),
        (status = 404, description = "Mensalidade não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_charge(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ctx: EstablishmentContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateChargePayload>,
) -> Result<impl IntoResponse, AppError> {
    let scope = ctx.scope(&app_state, &user, payload.establishment_id).await?;
    let charge = app_state
        .charge_service
        .update_charge(&scope, id, payload, Utc::now().date_naive())
        .await?;

    Ok((StatusCode::OK, Json(charge)))
}

// POST /api/charges/{id}/pay
#[utoipa::path(
    post,
    path = "/api/charges/{id}/pay",
    tag = "Charges",
    request_body = MarkChargePaidPayload,
    params(
        ("id" = Uuid, Path, description = "ID da mensalidade"),
        ScopeQuery,
        ("x-establishment-id" = Option<Uuid>, Header, description = "Estabelecimento selecionado")
    ),
    responses(
        (status = 200, description = "Mensalidade marcada como paga", body = ChargeView),
        (status = 400, description = "Mensalidade já paga ou cancelada"),
        (status = 404, description = "Mensalidade não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn pay_charge(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ctx: EstablishmentContext,
    Path(id): Path<Uuid>,
    Query(query): Query<ScopeQuery>,
    payload: Option<Json<MarkChargePaidPayload>>,
) -> Result<impl IntoResponse, AppError> {
    let scope = ctx.scope(&app_state, &user, query.establishment_id).await?;
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    let charge = app_state
        .charge_service
        .mark_paid(&scope, id, payload, Utc::now().date_naive())
        .await?;

    Ok((StatusCode::OK, Json(charge)))
}

// POST /api/charges/{id}/cancel
#[utoipa::path(
    post,
    path = "/api/charges/{id}/cancel",
    tag = "Charges",
    params(
        ("id" = Uuid, Path, description = "ID da mensalidade"),
        ScopeQuery,
        ("x-establishment-id" = Option<Uuid>, Header, description = "Estabelecimento selecionado")
    ),
    responses(
        (status = 200, description = "Mensalidade cancelada", body = ChargeView),
        (status = 400, description = "Transição proibida"),
        (status = 404, description = "Mensalidade não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn cancel_charge(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ctx: EstablishmentContext,
    Path(id): Path<Uuid>,
    Query(query): Query<ScopeQuery>,
) -> Result<impl IntoResponse, AppError> {
    let scope = ctx.scope(&app_state, &user, query.establishment_id).await?;
    let charge = app_state
        .charge_service
        .cancel_charge(&scope, id, Utc::now().date_naive())
        .await?;

    Ok((StatusCode::OK, Json(charge)))
}

// DELETE /api/charges/{id}
#[utoipa::path(
    delete,
    path = "/api/charges/{id}",
    tag = "Charges",
    params(
        ("id" = Uuid, Path, description = "ID da mensalidade"),
        ScopeQuery,
        ("x-establishment-id" = Option<Uuid>, Header, description = "Estabelecimento selecionado")
    ),
    responses(
        (status = 204, description = "Mensalidade removida"),
        (status = 404, description = "Mensalidade não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_charge(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ctx: EstablishmentContext,
    Path(id): Path<Uuid>,
    Query(query): Query<ScopeQuery>,
) -> Result<impl IntoResponse, AppError> {
    let scope = ctx.scope(&app_state, &user, query.establishment_id).await?;
    app_state.charge_service.delete_charge(&scope, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
