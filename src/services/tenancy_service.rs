// src/services/tenancy_service.rs

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{EstablishmentStore, UserStore},
    models::tenancy::{
        CreateEstablishmentPayload, Establishment, EstablishmentMember, EstablishmentRole,
        EstablishmentScope, InviteMemberPayload, NewEstablishment, UpdateEstablishmentPayload,
        UserEstablishment, UserEstablishmentLink,
    },
};

#[derive(Clone)]
pub struct TenantService {
    establishments: Arc<dyn EstablishmentStore>,
    users: Arc<dyn UserStore>,
}

impl TenantService {
    /// Cria uma nova instância do serviço de tenancy.
    pub fn new(establishments: Arc<dyn EstablishmentStore>, users: Arc<dyn UserStore>) -> Self {
        Self { establishments, users }
    }

    /// LÓGICA DE NEGÓCIO: Cria um novo Estabelecimento e, atomicamente,
    /// vincula o utilizador que o criou como dono.
    pub async fn create_establishment_with_owner(
        &self,
        owner_id: Uuid,
        payload: CreateEstablishmentPayload,
    ) -> Result<(Establishment, UserEstablishmentLink), AppError> {
        payload.validate()?;

        let (establishment, link) = self
            .establishments
            .create_with_owner(NewEstablishment {
                created_by: owner_id,
                name: payload.name,
                tax_id: payload.tax_id,
                email: payload.email,
                phone: payload.phone,
                address: payload.address,
            })
            .await?;

        tracing::info!(
            "🏫 Estabelecimento '{}' ({}) criado pelo usuário {}",
            establishment.name,
            establishment.id,
            owner_id
        );

        Ok((establishment, link))
    }

    pub async fn list_user_establishments(&self, user_id: Uuid) -> Result<Vec<UserEstablishment>, AppError> {
        self.establishments.list_for_user(user_id).await
    }

    /// A regra de escopo: só passa quem tem vínculo ATIVO com um
    /// estabelecimento também ativo.
    pub async fn authorize(&self, user_id: Uuid, establishment_id: Uuid) -> Result<EstablishmentScope, AppError> {
        let scope = self.authorize_link(user_id, establishment_id).await?;
        self.ensure_establishment_active(&scope).await?;
        Ok(scope)
    }

    /// Igual a `authorize`, exceto que o dono alcança o próprio estabelecimento
    /// mesmo inativo. É o único caminho para reativá-lo.
    pub async fn authorize_settings(
        &self,
        user_id: Uuid,
        establishment_id: Uuid,
    ) -> Result<EstablishmentScope, AppError> {
        let scope = self.authorize_link(user_id, establishment_id).await?;
        if scope.role != EstablishmentRole::Owner {
            self.ensure_establishment_active(&scope).await?;
        }
        Ok(scope)
    }

    async fn authorize_link(&self, user_id: Uuid, establishment_id: Uuid) -> Result<EstablishmentScope, AppError> {
        let link = self.establishments.find_link(user_id, establishment_id).await?;

        match link {
            Some(link) if link.is_active => Ok(EstablishmentScope {
                establishment_id,
                user_id,
                role: link.role,
            }),
            _ => {
                tracing::warn!(
                    "⛔ Usuário {} tentou acessar o estabelecimento {} sem vínculo ativo",
                    user_id,
                    establishment_id
                );
                Err(AppError::Forbidden(
                    "Você não tem acesso a este estabelecimento.".to_string(),
                ))
            }
        }
    }

    async fn ensure_establishment_active(&self, scope: &EstablishmentScope) -> Result<(), AppError> {
        let active = self
            .establishments
            .find(scope.establishment_id)
            .await?
            .is_some_and(|e| e.is_active);

        if active {
            return Ok(());
        }

        tracing::warn!(
            "⛔ Usuário {} tentou acessar o estabelecimento inativo {}",
            scope.user_id,
            scope.establishment_id
        );
        Err(AppError::Forbidden("Este estabelecimento está inativo.".to_string()))
    }

    /// Decide o estabelecimento da operação: o parâmetro explícito vence o
    /// estabelecimento selecionado na sessão. Depois aplica `authorize`.
    pub async fn resolve_scope(
        &self,
        user_id: Uuid,
        explicit: Option<Uuid>,
        selected: Option<Uuid>,
    ) -> Result<EstablishmentScope, AppError> {
        let establishment_id = explicit.or(selected).ok_or_else(|| {
            AppError::Validation(
                "Nenhum estabelecimento selecionado. Envie establishmentId ou o cabeçalho x-establishment-id."
                    .to_string(),
            )
        })?;

        self.authorize(user_id, establishment_id).await
    }

    fn require_manager(scope: &EstablishmentScope) -> Result<(), AppError> {
        if scope.role.can_manage() {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Apenas o dono ou um administrador pode fazer isso.".to_string(),
            ))
        }
    }

    pub async fn update_establishment(
        &self,
        scope: &EstablishmentScope,
        payload: UpdateEstablishmentPayload,
    ) -> Result<Establishment, AppError> {
        payload.validate()?;
        Self::require_manager(scope)?;

        let mut establishment = self
            .establishments
            .find(scope.establishment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Estabelecimento não encontrado.".to_string()))?;

        if let Some(name) = payload.name {
            establishment.name = name;
        }
        if let Some(tax_id) = payload.tax_id {
            establishment.tax_id = Some(tax_id);
        }
        if let Some(email) = payload.email {
            establishment.email = Some(email);
        }
        if let Some(phone) = payload.phone {
            establishment.phone = Some(phone);
        }
        if let Some(address) = payload.address {
            establishment.address = Some(address);
        }
        if let Some(is_active) = payload.is_active {
            establishment.is_active = is_active;
        }

        self.establishments
            .update(&establishment)
            .await?
            .ok_or_else(|| AppError::NotFound("Estabelecimento não encontrado.".to_string()))
    }

    /// Convida um usuário já cadastrado para a equipe.
    pub async fn invite_member(
        &self,
        scope: &EstablishmentScope,
        payload: InviteMemberPayload,
    ) -> Result<UserEstablishmentLink, AppError> {
        payload.validate()?;
        Self::require_manager(scope)?;

        // Só existe um dono: o criador
        if payload.role == EstablishmentRole::Owner {
            return Err(AppError::Validation(
                "O papel de dono não pode ser concedido por convite.".to_string(),
            ));
        }

        let user = self
            .users
            .find_by_email(&payload.email.trim().to_lowercase())
            .await?
            .ok_or(AppError::UserNotFound)?;

        let link = self
            .establishments
            .create_link(user.id, scope.establishment_id, payload.role)
            .await?;

        tracing::info!(
            "🤝 Usuário {} adicionado ao estabelecimento {} como {:?}",
            user.id,
            scope.establishment_id,
            payload.role
        );

        Ok(link)
    }

    pub async fn list_members(&self, scope: &EstablishmentScope) -> Result<Vec<EstablishmentMember>, AppError> {
        self.establishments.list_members(scope.establishment_id).await
    }

    /// Ativa/desativa o vínculo de um membro. O vínculo do dono é intocável.
    pub async fn set_member_active(
        &self,
        scope: &EstablishmentScope,
        member_id: Uuid,
        is_active: bool,
    ) -> Result<UserEstablishmentLink, AppError> {
        Self::require_manager(scope)?;

        let link = self
            .establishments
            .find_link(member_id, scope.establishment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Membro não encontrado.".to_string()))?;

        if link.role == EstablishmentRole::Owner {
            return Err(AppError::Forbidden(
                "O vínculo do dono não pode ser alterado.".to_string(),
            ));
        }

        self.establishments
            .set_link_active(member_id, scope.establishment_id, is_active)
            .await?
            .ok_or_else(|| AppError::NotFound("Membro não encontrado.".to_string()))
    }
}
