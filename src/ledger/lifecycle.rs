// src/ledger/lifecycle.rs

use chrono::NaiveDate;
use crate::{
    common::error::AppError,
    ledger::period::{checked_sum, round_money},
    models::finance::{Charge, ChargeStatus, ChargeSummary},
};

/// Status efetivo de uma cobrança numa data.
///
/// Pendente com vencimento já passado conta como atrasada. Nada é gravado:
/// o status armazenado continua `pending`, só a leitura muda.
pub fn derive_effective_status(charge: &Charge, as_of: NaiveDate) -> ChargeStatus {
    match charge.status {
        ChargeStatus::Pending if charge.due_date < as_of => ChargeStatus::Overdue,
        status => status,
    }
}

impl ChargeStatus {
    /// Transições permitidas por ação explícita do usuário.
    ///
    /// Manter o mesmo status sempre passa (edição de campos).
    /// `cancelled` é terminal. `paid` só volta para `pending`/`overdue`
    /// por edição explícita, nunca para `cancelled`.
    pub fn can_transition_to(self, next: ChargeStatus) -> bool {
        use ChargeStatus::*;
        match (self, next) {
            (from, to) if from == to => true,
            (Cancelled, _) => false,
            (Pending | Overdue, _) => true,
            (Paid, Pending | Overdue) => true,
            (Paid, _) => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChargeStatus::Pending => "pending",
            ChargeStatus::Paid => "paid",
            ChargeStatus::Overdue => "overdue",
            ChargeStatus::Cancelled => "cancelled",
        }
    }
}

pub fn check_transition(from: ChargeStatus, to: ChargeStatus) -> Result<(), AppError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "Transição de status inválida: {} → {}.",
            from.as_str(),
            to.as_str()
        )))
    }
}

/// Agrupa as cobranças (já filtradas pelo período) pelo status efetivo e soma.
pub fn summarize_charges(charges: &[Charge], as_of: NaiveDate) -> Result<ChargeSummary, AppError> {
    let by_status = |wanted: ChargeStatus| {
        checked_sum(
            charges
                .iter()
                .filter(|c| derive_effective_status(c, as_of) == wanted)
                .map(|c| c.amount),
        )
    };

    let total = checked_sum(charges.iter().map(|c| c.amount))?;
    let pending = by_status(ChargeStatus::Pending)?;
    let paid = by_status(ChargeStatus::Paid)?;
    let overdue = by_status(ChargeStatus::Overdue)?;
    let cancelled = by_status(ChargeStatus::Cancelled)?;
    let owed = checked_sum([pending, overdue])?;

    Ok(ChargeSummary {
        count: charges.len(),
        total: round_money(total),
        pending_total: round_money(pending),
        paid_total: round_money(paid),
        overdue_total: round_money(overdue),
        cancelled_total: round_money(cancelled),
        owed_total: round_money(owed),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use uuid::Uuid;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn charge(amount: &str, due: NaiveDate, status: ChargeStatus) -> Charge {
        Charge {
            id: Uuid::new_v4(),
            establishment_id: Uuid::nil(),
            payer_id: Uuid::nil(),
            amount: Decimal::from_str(amount).unwrap(),
            due_date: due,
            payment_date: None,
            status,
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn pending_past_due_reads_as_overdue() {
        let c = charge("100", d(2025, 11, 10), ChargeStatus::Pending);

        assert_eq!(derive_effective_status(&c, d(2025, 11, 10)), ChargeStatus::Pending);
        assert_eq!(derive_effective_status(&c, d(2025, 11, 11)), ChargeStatus::Overdue);
        // O valor gravado não muda
        assert_eq!(c.status, ChargeStatus::Pending);
    }

    #[test]
    fn paid_and_cancelled_are_never_derived_as_overdue() {
        let paid = charge("100", d(2025, 1, 1), ChargeStatus::Paid);
        let cancelled = charge("100", d(2025, 1, 1), ChargeStatus::Cancelled);
        let today = d(2026, 1, 1);

        assert_eq!(derive_effective_status(&paid, today), ChargeStatus::Paid);
        assert_eq!(derive_effective_status(&cancelled, today), ChargeStatus::Cancelled);
    }

    #[test]
    fn cancelled_is_terminal() {
        for next in [ChargeStatus::Pending, ChargeStatus::Paid, ChargeStatus::Overdue] {
            assert!(!ChargeStatus::Cancelled.can_transition_to(next));
        }
        assert!(check_transition(ChargeStatus::Cancelled, ChargeStatus::Paid).is_err());
    }

    #[test]
    fn keeping_the_same_status_is_always_allowed() {
        for status in [
            ChargeStatus::Pending,
            ChargeStatus::Paid,
            ChargeStatus::Overdue,
            ChargeStatus::Cancelled,
        ] {
            assert!(check_transition(status, status).is_ok());
        }
    }

    #[test]
    fn paid_can_be_reverted_but_not_cancelled() {
        assert!(ChargeStatus::Paid.can_transition_to(ChargeStatus::Pending));
        assert!(!ChargeStatus::Paid.can_transition_to(ChargeStatus::Cancelled));
    }

    #[test]
    fn open_charges_can_be_paid_or_cancelled() {
        for from in [ChargeStatus::Pending, ChargeStatus::Overdue] {
            assert!(from.can_transition_to(ChargeStatus::Paid));
            assert!(from.can_transition_to(ChargeStatus::Cancelled));
        }
    }

    #[test]
    fn summary_groups_by_effective_status() {
        let as_of = d(2025, 11, 15);
        let charges = vec![
            charge("100.00", d(2025, 11, 20), ChargeStatus::Pending),
            charge("200.00", d(2025, 11, 5), ChargeStatus::Pending), // atrasada
            charge("300.00", d(2025, 11, 5), ChargeStatus::Paid),
            charge("400.00", d(2025, 11, 5), ChargeStatus::Cancelled),
        ];

        let summary = summarize_charges(&charges, as_of).unwrap();

        assert_eq!(summary.count, 4);
        assert_eq!(summary.total, Decimal::from(1000));
        assert_eq!(summary.pending_total, Decimal::from(100));
        assert_eq!(summary.overdue_total, Decimal::from(200));
        assert_eq!(summary.paid_total, Decimal::from(300));
        assert_eq!(summary.cancelled_total, Decimal::from(400));
        assert_eq!(summary.owed_total, Decimal::from(300));
    }

    #[test]
    fn summary_of_nothing_is_zero() {
        let summary = summarize_charges(&[], d(2025, 1, 1)).unwrap();
        assert_eq!(summary, ChargeSummary::default());
    }

    #[test]
    fn summary_overflow_is_a_validation_error() {
        let as_of = d(2025, 11, 15);
        let charges = vec![
            charge("50000000000000000000000000000", d(2025, 11, 20), ChargeStatus::Pending),
            charge("50000000000000000000000000000", d(2025, 11, 20), ChargeStatus::Pending),
        ];

        assert!(matches!(summarize_charges(&charges, as_of), Err(AppError::Validation(_))));
    }
}
