// src/handlers/tenancy.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::tenancy::{
        CreateEstablishmentPayload, Establishment, EstablishmentMember, InviteMemberPayload,
        UpdateEstablishmentPayload, UpdateMemberPayload, UserEstablishment, UserEstablishmentLink,
    },
};

// POST /api/establishments
#[utoipa::path(
    post,
    path = "/api/establishments",
    tag = "Establishments",
    request_body = CreateEstablishmentPayload,
    responses(
        (status = 201, description = "Estabelecimento criado; o usuário vira dono", body = UserEstablishment),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "CNPJ já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_establishment(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateEstablishmentPayload>,
) -> Result<impl IntoResponse, AppError> {
    // Operação transacional: cria o estabelecimento E o vínculo de dono
    let (establishment, link) = app_state
        .tenant_service
        .create_establishment_with_owner(user.0.id, payload)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(UserEstablishment {
            establishment,
            role: link.role,
        }),
    ))
}

// GET /api/establishments
#[utoipa::path(
    get,
    path = "/api/establishments",
    tag = "Establishments",
    responses(
        (status = 200, description = "Estabelecimentos em que o usuário tem vínculo ativo", body = Vec<UserEstablishment>),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_my_establishments(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let establishments = app_state.tenant_service.list_user_establishments(user.0.id).await?;

    Ok((StatusCode::OK, Json(establishments)))
}

// PUT /api/establishments/{id}
#[utoipa::path(
    put,
    path = "/api/establishments/{id}",
    tag = "Establishments",
    request_body = UpdateEstablishmentPayload,
    params(("id" = Uuid, Path, description = "ID do estabelecimento")),
    responses(
        (status = 200, description = "Estabelecimento atualizado", body = Establishment),
        (status = 403, description = "Sem vínculo ou sem papel de gestão")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_establishment(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEstablishmentPayload>,
) -> Result<impl IntoResponse, AppError> {
    // O dono ainda edita (e reativa) um estabelecimento inativo
    let scope = app_state.tenant_service.authorize_settings(user.0.id, id).await?;
    let establishment = app_state.tenant_service.update_establishment(&scope, payload).await?;

    Ok((StatusCode::OK, Json(establishment)))
}

// GET /api/establishments/{id}/members
#[utoipa::path(
    get,
    path = "/api/establishments/{id}/members",
    tag = "Establishments",
    params(("id" = Uuid, Path, description = "ID do estabelecimento")),
    responses(
        (status = 200, description = "Equipe do estabelecimento", body = Vec<EstablishmentMember>),
        (status = 403, description = "Sem vínculo ativo")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_members(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let scope = app_state.tenant_service.authorize(user.0.id, id).await?;
    let members = app_state.tenant_service.list_members(&scope).await?;

    Ok((StatusCode::OK, Json(members)))
}

// POST /api/establishments/{id}/members
#[utoipa::path(
    post,
    path = "/api/establishments/{id}/members",
    tag = "Establishments",
    request_body = InviteMemberPayload,
    params(("id" = Uuid, Path, description = "ID do estabelecimento")),
    responses(
        (status = 201, description = "Membro adicionado", body = UserEstablishmentLink),
        (status = 403, description = "Sem papel de gestão"),
        (status = 404, description = "Usuário convidado não existe"),
        (status = 409, description = "Usuário já faz parte da equipe")
    ),
    security(("api_jwt" = []))
)]
pub async fn invite_member(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<InviteMemberPayload>,
) -> Result<impl IntoResponse, AppError> {
    let scope = app_state.tenant_service.authorize(user.0.id, id).await?;
    let link = app_state.tenant_service.invite_member(&scope, payload).await?;

    Ok((StatusCode::CREATED, Json(link)))
}

// PUT /api/establishments/{id}/members/{user_id}
#[utoipa::path(
    put,
    path = "/api/establishments/{id}/members/{user_id}",
    tag = "Establishments",
    request_body = UpdateMemberPayload,
    params(
        ("id" = Uuid, Path, description = "ID do estabelecimento"),
        ("user_id" = Uuid, Path, description = "ID do usuário membro")
    ),
    responses(
        (status = 200, description = "Vínculo atualizado", body = UserEstablishmentLink),
        (status = 403, description = "Sem papel de gestão, ou tentativa de alterar o dono"),
        (status = 404, description = "Membro não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_member(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path((id, member_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateMemberPayload>,
) -> Result<impl IntoResponse, AppError> {
    let scope = app_state.tenant_service.authorize(user.0.id, id).await?;
    let link = app_state
        .tenant_service
        .set_member_active(&scope, member_id, payload.is_active)
        .await?;

    Ok((StatusCode::OK, Json(link)))
}
