// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::finance::ChargeSummary;

// Visão geral do mês (os cards do topo da tela)
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PeriodOverview {
    #[schema(example = 11)]
    pub month: u32,
    #[schema(example = 2025)]
    pub year: i32,

    pub charges: ChargeSummary, // Mensalidades do mês, por status efetivo

    pub purchases_count: usize,
    pub purchases_total: Decimal, // Gastos do mês

    pub balance: Decimal, // Recebido - gasto
}
