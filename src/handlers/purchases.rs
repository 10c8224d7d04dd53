// src/handlers/purchases.rs

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
        purchases::{CreatePurchasePayload, LineItemPayload, PurchaseDetail, PurchaseListing},
        query::{ListQuery, ScopeQuery},
    },
};

// POST /api/purchases
#[utoipa::path(
    post,
    path = "/api/purchases",
    tag = "Purchases",
    request_body = CreatePurchasePayload,
    params(("x-establishment-id" = Option<Uuid>, Header, description = "Estabelecimento selecionado")),
    responses(
        (status = 201, description = "Compra registrada com os itens", body = PurchaseDetail),
        (status = 400, description = "Dados inválidos ou responsável fora da equipe"),
        (status = 403, description = "Sem acesso ao estabelecimento")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_purchase(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ctx: EstablishmentContext,
    Json(payload): Json<CreatePurchasePayload>,
) -> Result<impl IntoResponse, AppError> {
    let scope = ctx.scope(&app_state, &user, payload.establishment_id).await?;
    let detail = app_state.purchase_service.create_purchase(&scope, payload).await?;

    Ok((StatusCode::CREATED, Json(detail)))
}

// GET /api/purchases
#[utoipa::path(
    get,
    path = "/api/purchases",
    tag = "Purchases",
    params(
        ListQuery,
        ("x-establishment-id" = Option<Uuid>, Header, description = "Estabelecimento selecionado")
    ),
    responses(
        (status = 200, description = "Página de compras + total do filtro", body = PurchaseListing),
        (status = 400, description = "Período inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_purchases(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ctx: EstablishmentContext,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let scope = ctx.scope(&app_state, &user, query.establishment_id).await?;
    let listing = app_state
        .purchase_service
        .list_purchases(
            &scope,
            query.period()?,
            query.page(),
            query.page_size(app_state.config.default_page_size),
        )
        .await?;

    Ok((StatusCode::OK, Json(listing)))
}

// GET /api/purchases/{id}
#[utoipa::path(
    get,
    path = "/api/purchases/{id}",
    tag = "Purchases",
    params(
        ("id" = Uuid, Path, description = "ID da compra"),
        ScopeQuery,
        ("x-establishment-id" = Option<Uuid>, Header, description = "Estabelecimento selecionado")
    ),
    responses(
        (status = 200, description = "Compra com itens", body = PurchaseDetail),
        (status = 404, description = "Compra não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_purchase(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ctx: EstablishmentContext,
    Path(id): Path<Uuid>,
    Query(query): Query<ScopeQuery>,
) -> Result<impl IntoResponse, AppError> {
    let scope = ctx.scope(&app_state, &user, query.establishment_id).await?;
    let detail = app_state.purchase_service.get_purchase(&scope, id).await?;

    Ok((StatusCode::OK, Json(detail)))
}

// POST /api/purchases/{id}/items
#[utoipa::path(
    post,
    path = "/api/purchases/{id}/items",
    tag = "Purchases",
    request_body = LineItemPayload,
    params(
        ("id" = Uuid, Path, description = "ID da compra"),
        ScopeQuery,
        ("x-establishment-id" = Option<Uuid>, Header, description = "Estabelecimento selecionado")
    ),
    responses(
        (status = 201, description = "Item adicionado; total recalculado", body = PurchaseDetail),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Compra não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_item(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ctx: EstablishmentContext,
    Path(id): Path<Uuid>,
    Query(query): Query<ScopeQuery>,
    Json(payload): Json<LineItemPayload>,
) -> Result<impl IntoResponse, AppError> {
    let scope = ctx.scope(&app_state, &user, query.establishment_id).await?;
    let detail = app_state.purchase_service.add_item(&scope, id, payload).await?;

    Ok((StatusCode::CREATED, Json(detail)))
}

// DELETE /api/purchases/{id}/items/{item_id}
#[utoipa::path(
    delete,
    path = "/api/purchases/{id}/items/{item_id}",
    tag = "Purchases",
    params(
        ("id" = Uuid, Path, description = "ID da compra"),
        ("item_id" = Uuid, Path, description = "ID do item"),
        ScopeQuery,
        ("x-establishment-id" = Option<Uuid>, Header, description = "Estabelecimento selecionado")
    ),
    responses(
        (status = 200, description = "Item removido; total recalculado", body = PurchaseDetail),
        (status = 404, description = "Compra ou item não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn remove_item(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ctx: EstablishmentContext,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
    Query(query): Query<ScopeQuery>,
) -> Result<impl IntoResponse, AppError> {
    let scope = ctx.scope(&app_state, &user, query.establishment_id).await?;
    let detail = app_state.purchase_service.remove_item(&scope, id, item_id).await?;

    Ok((StatusCode::OK, Json(detail)))
}

// DELETE /api/purchases/{id}
#[utoipa::path(
    delete,
    path = "/api/purchases/{id}",
    tag = "Purchases",
    params(
        ("id" = Uuid, Path, description = "ID da compra"),
        ScopeQuery,
        ("x-establishment-id" = Option<Uuid>, Header, description = "Estabelecimento selecionado")
    ),
    responses(
        (status = 204, description = "Compra removida com os itens"),
        (status = 404, description = "Compra não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_purchase(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ctx: EstablishmentContext,
    Path(id): Path<Uuid>,
    Query(query): Query<ScopeQuery>,
) -> Result<impl IntoResponse, AppError> {
    let scope = ctx.scope(&app_state, &user, query.establishment_id).await?;
    app_state.purchase_service.delete_purchase(&scope, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
