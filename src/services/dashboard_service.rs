// src/services/dashboard_service.rs

use chrono::{Datelike, NaiveDate};

use crate::{
    common::error::AppError,
    ledger::{checked_difference, round_money, Period},
    models::{dashboard::PeriodOverview, finance::ChargeDateField, tenancy::EstablishmentScope},
    services::{charge_service::ChargeService, purchase_service::PurchaseService},
};

/// Junta mensalidades e compras do mês num resumo só.
#[derive(Clone)]
pub struct DashboardService {
    charges: ChargeService,
    purchases: PurchaseService,
}

impl DashboardService {
    pub fn new(charges: ChargeService, purchases: PurchaseService) -> Self {
        Self { charges, purchases }
    }

    /// Sem período explícito, usa o mês de `today`.
    pub async fn overview(
        &self,
        scope: &EstablishmentScope,
        period: Option<Period>,
        today: NaiveDate,
    ) -> Result<PeriodOverview, AppError> {
        let period = match period {
            Some(period) => period,
            None => Period::new(today.month(), today.year())?,
        };

        let charges = self
            .charges
            .summary(scope, Some(period), ChargeDateField::DueDate, today)
            .await?;
        let purchases = self.purchases.period_purchases(scope, Some(&period)).await?;

        Ok(PeriodOverview {
            month: period.month(),
            year: period.year(),
            balance: round_money(checked_difference(charges.paid_total, purchases.total)?),
            charges,
            purchases_count: purchases.count,
            purchases_total: purchases.total,
        })
    }
}
