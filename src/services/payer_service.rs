// src/services/payer_service.rs

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::PayerStore,
    models::{
        payers::{CreatePayerPayload, NewPayer, Payer, UpdatePayerPayload},
        tenancy::EstablishmentScope,
    },
};

fn payer_not_found() -> AppError {
    AppError::NotFound("Pagador não encontrado.".to_string())
}

#[derive(Clone)]
pub struct PayerService {
    payers: Arc<dyn PayerStore>,
}

impl PayerService {
    pub fn new(payers: Arc<dyn PayerStore>) -> Self {
        Self { payers }
    }

    pub async fn create_payer(
        &self,
        scope: &EstablishmentScope,
        payload: CreatePayerPayload,
    ) -> Result<Payer, AppError> {
        payload.validate()?;

        self.payers
            .create_payer(NewPayer {
                establishment_id: scope.establishment_id,
                name: payload.name,
                email: payload.email,
                phone: payload.phone,
                tax_id: payload.tax_id,
                notes: payload.notes,
            })
            .await
    }

    pub async fn list_payers(&self, scope: &EstablishmentScope) -> Result<Vec<Payer>, AppError> {
        self.payers.list(scope.establishment_id).await
    }

    pub async fn get_payer(&self, scope: &EstablishmentScope, id: Uuid) -> Result<Payer, AppError> {
        self.payers
            .find(scope.establishment_id, id)
            .await?
            .ok_or_else(payer_not_found)
    }

    pub async fn update_payer(
        &self,
        scope: &EstablishmentScope,
        id: Uuid,
        payload: UpdatePayerPayload,
    ) -> Result<Payer, AppError> {
        payload.validate()?;

        let mut payer = self.get_payer(scope, id).await?;

        if let Some(name) = payload.name {
            payer.name = name;
        }
        if let Some(email) = payload.email {
            payer.email = Some(email);
        }
        if let Some(phone) = payload.phone {
            payer.phone = Some(phone);
        }
        if let Some(tax_id) = payload.tax_id {
            payer.tax_id = Some(tax_id);
        }
        if let Some(notes) = payload.notes {
            payer.notes = Some(notes);
        }
        if let Some(is_active) = payload.is_active {
            payer.is_active = is_active;
        }

        self.payers.update_payer(&payer).await?.ok_or_else(payer_not_found)
    }

    /// Pagador com cobranças não pode ser apagado (desative-o).
    pub async fn delete_payer(&self, scope: &EstablishmentScope, id: Uuid) -> Result<(), AppError> {
        self.get_payer(scope, id).await?;

        if self.payers.count_charges(scope.establishment_id, id).await? > 0 {
            return Err(AppError::Conflict(
                "O pagador possui mensalidades e não pode ser excluído. Desative-o.".to_string(),
            ));
        }

        if !self.payers.delete(scope.establishment_id, id).await? {
            return Err(payer_not_found());
        }
        Ok(())
    }
}
