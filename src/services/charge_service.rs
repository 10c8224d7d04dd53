// src/services/charge_service.rs

use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{ChargeStore, PayerStore},
    ledger::{aggregate, check_transition, derive_effective_status, paginate, summarize_charges, Period},
    models::{
        finance::{
            Charge, ChargeDateField, ChargeListing, ChargeStatus, ChargeSummary, ChargeView,
            CreateChargePayload, MarkChargePaidPayload, NewCharge, UpdateChargePayload,
        },
        tenancy::EstablishmentScope,
    },
};

fn charge_not_found() -> AppError {
    AppError::NotFound("Mensalidade não encontrada.".to_string())
}

fn view(charge: Charge, as_of: NaiveDate) -> ChargeView {
    ChargeView {
        effective_status: derive_effective_status(&charge, as_of),
        charge,
    }
}

/// Decide o status inicial de uma cobrança nova.
///
/// Sem status explícito, uma data de pagamento implica `paid`. `paid` sem data
/// usa `today`. Data de pagamento com outro status explícito é contraditório.
fn initial_status(
    status: Option<ChargeStatus>,
    payment_date: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<(ChargeStatus, Option<NaiveDate>), AppError> {
    match (status, payment_date) {
        (None, None) => Ok((ChargeStatus::Pending, None)),
        (None, Some(date)) => Ok((ChargeStatus::Paid, Some(date))),
        (Some(ChargeStatus::Paid), date) => Ok((ChargeStatus::Paid, Some(date.unwrap_or(today)))),
        (Some(status), None) => Ok((status, None)),
        (Some(status), Some(_)) => Err(AppError::Validation(format!(
            "Data de pagamento informada para uma mensalidade com status {}.",
            status.as_str()
        ))),
    }
}

#[derive(Clone)]
pub struct ChargeService {
    charges: Arc<dyn ChargeStore>,
    payers: Arc<dyn PayerStore>,
}

impl ChargeService {
    pub fn new(charges: Arc<dyn ChargeStore>, payers: Arc<dyn PayerStore>) -> Self {
        Self { charges, payers }
    }

    /// O pagador tem que ser do mesmo estabelecimento.
    async fn ensure_payer(&self, scope: &EstablishmentScope, payer_id: Uuid) -> Result<(), AppError> {
        self.payers
            .find(scope.establishment_id, payer_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound("Pagador não encontrado.".to_string()))
    }

    async fn load(&self, scope: &EstablishmentScope, id: Uuid) -> Result<Charge, AppError> {
        self.charges
            .find(scope.establishment_id, id)
            .await?
            .ok_or_else(charge_not_found)
    }

    pub async fn create_charge(
        &self,
        scope: &EstablishmentScope,
        payload: CreateChargePayload,
        today: NaiveDate,
    ) -> Result<ChargeView, AppError> {
        payload.validate()?;
        self.ensure_payer(scope, payload.payer_id).await?;

        let (status, payment_date) = initial_status(payload.status, payload.payment_date, today)?;

        let charge = self
            .charges
            .create_charge(NewCharge {
                establishment_id: scope.establishment_id,
                payer_id: payload.payer_id,
                amount: payload.amount,
                due_date: payload.due_date,
                payment_date,
                status,
                description: payload.description,
            })
            .await?;

        tracing::info!(
            "💰 Mensalidade {} criada (R$ {}) no estabelecimento {}",
            charge.id,
            charge.amount,
            scope.establishment_id
        );

        Ok(view(charge, today))
    }

    pub async fn get_charge(
        &self,
        scope: &EstablishmentScope,
        id: Uuid,
        today: NaiveDate,
    ) -> Result<ChargeView, AppError> {
        Ok(view(self.load(scope, id).await?, today))
    }

    /// Cobranças do estabelecimento (opcionalmente só as do período), já
    /// ordenadas por vencimento.
    async fn filtered(
        &self,
        scope: &EstablishmentScope,
        period: Option<&Period>,
        date_field: ChargeDateField,
    ) -> Result<Vec<Charge>, AppError> {
        let mut charges = self.charges.list(scope.establishment_id).await?;
        charges.sort_by(|a, b| a.due_date.cmp(&b.due_date).then(a.created_at.cmp(&b.created_at)));

        Ok(match period {
            Some(period) => aggregate(&charges, period, |c| date_field.date_of(c), |c| c.amount)?.filtered,
            None => charges,
        })
    }

    pub async fn list_charges(
        &self,
        scope: &EstablishmentScope,
        period: Option<Period>,
        date_field: ChargeDateField,
        page: i64,
        page_size: usize,
        today: NaiveDate,
    ) -> Result<ChargeListing, AppError> {
        let charges = self.filtered(scope, period.as_ref(), date_field).await?;
        let summary = summarize_charges(&charges, today)?;

        let views: Vec<ChargeView> = charges.into_iter().map(|c| view(c, today)).collect();

        Ok(ChargeListing {
            page: paginate(&views, page, page_size),
            summary,
        })
    }

    pub async fn summary(
        &self,
        scope: &EstablishmentScope,
        period: Option<Period>,
        date_field: ChargeDateField,
        today: NaiveDate,
    ) -> Result<ChargeSummary, AppError> {
        let charges = self.filtered(scope, period.as_ref(), date_field).await?;
        summarize_charges(&charges, today)
    }

    /// Edição genérica. O status só muda se vier `status` ou `paymentDate`.
    pub async fn update_charge(
        &self,
        scope: &EstablishmentScope,
        id: Uuid,
        payload: UpdateChargePayload,
        today: NaiveDate,
    ) -> Result<ChargeView, AppError> {
        payload.validate()?;

        let mut charge = self.load(scope, id).await?;

        if let Some(payer_id) = payload.payer_id {
            if payer_id != charge.payer_id {
                self.ensure_payer(scope, payer_id).await?;
                charge.payer_id = payer_id;
            }
        }
        if let Some(amount) = payload.amount {
            charge.amount = amount;
        }
        if let Some(due_date) = payload.due_date {
            charge.due_date = due_date;
        }
        if let Some(description) = payload.description {
            charge.description = Some(description);
        }

        let next_status = match (payload.status, payload.payment_date) {
            (Some(status), _) => Some(status),
            (None, Some(_)) => Some(ChargeStatus::Paid),
            (None, None) => None,
        };

        if let Some(next) = next_status {
            check_transition(charge.status, next)?;

            match next {
                ChargeStatus::Paid => {
                    charge.payment_date = payload.payment_date.or(charge.payment_date).or(Some(today));
                }
                _ if payload.payment_date.is_some() => {
                    return Err(AppError::Validation(format!(
                        "Data de pagamento informada para uma mensalidade com status {}.",
                        next.as_str()
                    )));
                }
                // Estorno: sai de paga, perde a data
                _ => charge.payment_date = None,
            }
            charge.status = next;
        }

        let updated = self.charges.update_charge(&charge).await?.ok_or_else(charge_not_found)?;
        Ok(view(updated, today))
    }

    pub async fn mark_paid(
        &self,
        scope: &EstablishmentScope,
        id: Uuid,
        payload: MarkChargePaidPayload,
        today: NaiveDate,
    ) -> Result<ChargeView, AppError> {
        let mut charge = self.load(scope, id).await?;

        if charge.status == ChargeStatus::Paid {
            return Err(AppError::Validation("A mensalidade já está paga.".to_string()));
        }
        check_transition(charge.status, ChargeStatus::Paid)?;

        charge.status = ChargeStatus::Paid;
        charge.payment_date = Some(payload.payment_date.unwrap_or(today));

        let updated = self.charges.update_charge(&charge).await?.ok_or_else(charge_not_found)?;

        tracing::info!("✅ Mensalidade {} paga em {:?}", updated.id, updated.payment_date);

        Ok(view(updated, today))
    }

    pub async fn cancel_charge(
        &self,
        scope: &EstablishmentScope,
        id: Uuid,
        today: NaiveDate,
    ) -> Result<ChargeView, AppError> {
        let mut charge = self.load(scope, id).await?;

        if charge.status == ChargeStatus::Cancelled {
            return Err(AppError::Validation("A mensalidade já está cancelada.".to_string()));
        }
        check_transition(charge.status, ChargeStatus::Cancelled)?;

        charge.status = ChargeStatus::Cancelled;

        let updated = self.charges.update_charge(&charge).await?.ok_or_else(charge_not_found)?;
        Ok(view(updated, today))
    }

    pub async fn delete_charge(&self, scope: &EstablishmentScope, id: Uuid) -> Result<(), AppError> {
        if !self.charges.delete(scope.establishment_id, id).await? {
            return Err(charge_not_found());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn payment_date_without_status_means_paid() {
        let today = d(2025, 11, 15);
        assert_eq!(
            initial_status(None, Some(d(2025, 11, 8)), today).unwrap(),
            (ChargeStatus::Paid, Some(d(2025, 11, 8)))
        );
        assert_eq!(initial_status(None, None, today).unwrap(), (ChargeStatus::Pending, None));
    }

    #[test]
    fn paid_without_date_uses_today() {
        let today = d(2025, 11, 15);
        assert_eq!(
            initial_status(Some(ChargeStatus::Paid), None, today).unwrap(),
            (ChargeStatus::Paid, Some(today))
        );
    }

    #[test]
    fn payment_date_with_open_status_is_rejected() {
        let result = initial_status(Some(ChargeStatus::Pending), Some(d(2025, 11, 8)), d(2025, 11, 15));
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
