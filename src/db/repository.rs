// src/db/repository.rs
//
// Contratos de persistência. Cada entidade de negócio tem um "store" que
// compõe o repositório genérico `ScopedRepository<T>` (busca, lista e remoção
// sempre filtradas pelo estabelecimento) com as operações próprias dela.
// Existem duas implementações: Postgres (sqlx) e memória.

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        auth::{NewUser, User},
        finance::{Charge, NewCharge},
        payers::{NewPayer, Payer},
        purchases::{NewLineItem, NewPurchase, Purchase, PurchaseDetail, PurchaseLineItem},
        tenancy::{
            Establishment, EstablishmentMember, EstablishmentRole, NewEstablishment,
            UserEstablishment, UserEstablishmentLink,
        },
    },
};

/// CRUD genérico com escopo de estabelecimento.
///
/// Um registro de outro estabelecimento simplesmente não existe para quem
/// consulta: `find` devolve `None` e `delete` devolve `false`.
#[async_trait]
pub trait ScopedRepository<T>: Send + Sync
where
    T: Send + Sync + 'static,
{
    async fn find(&self, establishment_id: Uuid, id: Uuid) -> Result<Option<T>, AppError>;

    async fn list(&self, establishment_id: Uuid) -> Result<Vec<T>, AppError>;

    async fn delete(&self, establishment_id: Uuid, id: Uuid) -> Result<bool, AppError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// E-mail duplicado vira `AppError::EmailAlreadyExists`.
    async fn create_user(&self, new_user: NewUser) -> Result<User, AppError>;

    async fn update_profile(
        &self,
        id: Uuid,
        name: &str,
        phone: Option<&str>,
    ) -> Result<Option<User>, AppError>;

    /// Desativação lógica: o usuário nunca é apagado.
    async fn set_active(&self, id: Uuid, is_active: bool) -> Result<Option<User>, AppError>;
}

#[async_trait]
pub trait EstablishmentStore: Send + Sync {
    /// Cria o estabelecimento e o vínculo de dono numa única transação.
    async fn create_with_owner(
        &self,
        new_establishment: NewEstablishment,
    ) -> Result<(Establishment, UserEstablishmentLink), AppError>;

    async fn find(&self, id: Uuid) -> Result<Option<Establishment>, AppError>;

    async fn update(&self, establishment: &Establishment) -> Result<Option<Establishment>, AppError>;

    /// Estabelecimentos em que o usuário tem vínculo ativo.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<UserEstablishment>, AppError>;

    async fn find_link(
        &self,
        user_id: Uuid,
        establishment_id: Uuid,
    ) -> Result<Option<UserEstablishmentLink>, AppError>;

    /// Par (usuário, estabelecimento) duplicado vira `Conflict`.
    async fn create_link(
        &self,
        user_id: Uuid,
        establishment_id: Uuid,
        role: EstablishmentRole,
    ) -> Result<UserEstablishmentLink, AppError>;

    async fn set_link_active(
        &self,
        user_id: Uuid,
        establishment_id: Uuid,
        is_active: bool,
    ) -> Result<Option<UserEstablishmentLink>, AppError>;

    async fn list_members(&self, establishment_id: Uuid) -> Result<Vec<EstablishmentMember>, AppError>;
}

#[async_trait]
pub trait PayerStore: ScopedRepository<Payer> {
    async fn create_payer(&self, new_payer: NewPayer) -> Result<Payer, AppError>;

    async fn update_payer(&self, payer: &Payer) -> Result<Option<Payer>, AppError>;

    /// Quantas cobranças ainda apontam para o pagador.
    async fn count_charges(&self, establishment_id: Uuid, payer_id: Uuid) -> Result<i64, AppError>;
}

#[async_trait]
pub trait ChargeStore: ScopedRepository<Charge> {
    async fn create_charge(&self, new_charge: NewCharge) -> Result<Charge, AppError>;

    async fn update_charge(&self, charge: &Charge) -> Result<Option<Charge>, AppError>;
}

#[async_trait]
pub trait PurchaseStore: ScopedRepository<Purchase> {
    /// Grava a compra e os itens numa transação; o total é a soma dos itens.
    async fn create_with_items(
        &self,
        new_purchase: NewPurchase,
        items: Vec<NewLineItem>,
    ) -> Result<PurchaseDetail, AppError>;

    async fn list_items(
        &self,
        establishment_id: Uuid,
        purchase_id: Uuid,
    ) -> Result<Vec<PurchaseLineItem>, AppError>;

    /// Insere o item e recalcula o total da compra na mesma transação.
    async fn add_item(
        &self,
        establishment_id: Uuid,
        purchase_id: Uuid,
        item: NewLineItem,
    ) -> Result<Option<PurchaseDetail>, AppError>;

    /// Remove o item e recalcula o total. `None` se compra ou item não existem.
    async fn remove_item(
        &self,
        establishment_id: Uuid,
        purchase_id: Uuid,
        item_id: Uuid,
    ) -> Result<Option<PurchaseDetail>, AppError>;
}
