// src/models/finance.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

// --- Enums (Mapeando o Postgres) ---

/// Status de uma mensalidade. Grafia única, em inglês, no banco e no JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "charge_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ChargeStatus {
    Pending,   // Em aberto
    Paid,      // Paga
    Overdue,   // Atrasada
    Cancelled, // Cancelada
}

/// Qual data da cobrança decide o período nas listagens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum ChargeDateField {
    #[default]
    DueDate,
    PaymentDate,
}

impl ChargeDateField {
    pub fn date_of(self, charge: &Charge) -> Option<NaiveDate> {
        match self {
            ChargeDateField::DueDate => Some(charge.due_date),
            ChargeDateField::PaymentDate => charge.payment_date,
        }
    }
}

// --- Structs ---

/// Mensalidade (ou cobrança avulsa) devida por um pagador ao estabelecimento.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Charge {
    pub id: Uuid,

    pub establishment_id: Uuid,
    pub payer_id: Uuid,

    #[schema(example = "450.00")]
    pub amount: Decimal,

    #[schema(value_type = String, format = Date, example = "2025-11-10")]
    pub due_date: NaiveDate,
    #[schema(value_type = Option<String>, format = Date, example = "2025-11-08")]
    pub payment_date: Option<NaiveDate>,

    // Status gravado. O status "de verdade" para exibição vem de
    // `ledger::derive_effective_status`.
    pub status: ChargeStatus,

    #[schema(example = "Mensalidade Novembro - 5º ano")]
    pub description: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Cobrança acompanhada do status derivado na data de consulta.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChargeView {
    #[serde(flatten)]
    pub charge: Charge,
    pub effective_status: ChargeStatus,
}

/// Dados prontos para inserir (já validados pelo serviço).
#[derive(Debug, Clone)]
pub struct NewCharge {
    pub establishment_id: Uuid,
    pub payer_id: Uuid,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub payment_date: Option<NaiveDate>,
    pub status: ChargeStatus,
    pub description: Option<String>,
}

/// Totais de cobranças de um período, agrupados pelo status efetivo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChargeSummary {
    pub count: usize,
    #[schema(example = "1350.00")]
    pub total: Decimal,
    pub pending_total: Decimal,
    pub paid_total: Decimal,
    pub overdue_total: Decimal,
    pub cancelled_total: Decimal,
    /// Pendentes + atrasadas. Canceladas nunca entram aqui.
    pub owed_total: Decimal,
}

/// Resposta da listagem: a página pedida + os totais do filtro inteiro.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChargeListing {
    pub page: crate::ledger::Page<ChargeView>,
    pub summary: ChargeSummary,
}

// --- Payloads ---

fn positive(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        let mut err = ValidationError::new("positive");
        err.message = Some("O valor deve ser maior que zero.".into());
        return Err(err);
    }
    Ok(())
}

/// Teto de qualquer valor em reais (mensalidade ou preço unitário).
pub const MAX_AMOUNT: i64 = 1_000_000_000;
/// Teto da quantidade de um item de compra.
pub const MAX_QUANTITY: i64 = 1_000_000;

fn at_most(value: &Decimal, max: i64, code: &'static str, message: &'static str) -> Result<(), ValidationError> {
    if *value > Decimal::from(max) {
        let mut err = ValidationError::new(code);
        err.message = Some(message.into());
        return Err(err);
    }
    Ok(())
}

/// Maior que zero e dentro do teto.
pub(crate) fn bounded_amount(value: &Decimal) -> Result<(), ValidationError> {
    positive(value)?;
    at_most(value, MAX_AMOUNT, "max_amount", "O valor excede o limite permitido.")
}

pub(crate) fn bounded_quantity(value: &Decimal) -> Result<(), ValidationError> {
    positive(value)?;
    at_most(value, MAX_QUANTITY, "max_quantity", "A quantidade excede o limite permitido.")
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateChargePayload {
    /// Opcional: quando ausente, vale o estabelecimento selecionado (x-establishment-id).
    pub establishment_id: Option<Uuid>,

    pub payer_id: Uuid,

    #[validate(custom(function = "bounded_amount"))]
    #[schema(example = "450.00")]
    pub amount: Decimal,

    #[schema(value_type = String, format = Date, example = "2025-11-10")]
    pub due_date: NaiveDate,

    #[schema(value_type = Option<String>, format = Date)]
    pub payment_date: Option<NaiveDate>,

    pub status: Option<ChargeStatus>,

    #[validate(length(max = 500, message = "A descrição deve ter no máximo 500 caracteres."))]
    pub description: Option<String>,
}

/// Edição genérica: só o que vier preenchido é alterado.
/// O status só muda se `status` (ou `paymentDate`) vier no payload.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateChargePayload {
    pub establishment_id: Option<Uuid>,

    pub payer_id: Option<Uuid>,

    #[validate(custom(function = "bounded_amount"))]
    pub amount: Option<Decimal>,

    #[schema(value_type = Option<String>, format = Date)]
    pub due_date: Option<NaiveDate>,

    #[schema(value_type = Option<String>, format = Date)]
    pub payment_date: Option<NaiveDate>,

    pub status: Option<ChargeStatus>,

    #[validate(length(max = 500, message = "A descrição deve ter no máximo 500 caracteres."))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkChargePaidPayload {
    /// Data do pagamento. Sem valor, usa a data de hoje.
    #[schema(value_type = Option<String>, format = Date)]
    pub payment_date: Option<NaiveDate>,
}
