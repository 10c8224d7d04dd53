// src/handlers/dashboard.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use uuid::Uuid; // Importante para o Swagger params

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, tenancy::EstablishmentContext},
    models::{dashboard::PeriodOverview, query::ListQuery},
};

// GET /api/dashboard/summary
#[utoipa::path(
    get,
    path = "/api/dashboard/summary",
    tag = "Dashboard",
    params(
        ListQuery,
        ("x-establishment-id" = Option<Uuid>, Header, description = "Estabelecimento selecionado")
    ),
    responses(
        (status = 200, description = "Resumo do mês: mensalidades, compras e saldo", body = PeriodOverview),
        (status = 400, description = "Período inválido"),
        (status = 401, description = "Não autorizado"),
        (status = 403, description = "Sem acesso ao estabelecimento")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ctx: EstablishmentContext,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let scope = ctx.scope(&app_state, &user, query.establishment_id).await?;
    let overview = app_state
        .dashboard_service
        .overview(&scope, query.period()?, Utc::now().date_naive())
        .await?;

    Ok((StatusCode::OK, Json(overview)))
}
