// src/models/query.rs

use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{common::error::AppError, ledger::Period, models::finance::ChargeDateField};

/// Filtros comuns das listagens: estabelecimento, período e página.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct ListQuery {
    /// Sobrepõe o estabelecimento selecionado no cabeçalho x-establishment-id.
    pub establishment_id: Option<Uuid>,
    /// 1 a 12. Só filtra se vier junto com `year`.
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub page: Option<i64>,
    pub page_size: Option<usize>,
    /// Só para cobranças: `dueDate` (padrão) ou `paymentDate`.
    #[param(inline)]
    pub date_field: Option<ChargeDateField>,
}

impl ListQuery {
    pub fn period(&self) -> Result<Option<Period>, AppError> {
        Period::from_query(self.month, self.year)
    }

    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1)
    }

    pub fn page_size(&self, default: usize) -> usize {
        self.page_size.unwrap_or(default)
    }
}

/// Só o estabelecimento (rotas de detalhe/escrita).
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct ScopeQuery {
    pub establishment_id: Option<Uuid>,
}
