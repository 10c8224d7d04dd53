// src/ledger/period.rs

use chrono::{Months, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::common::error::AppError;

/// Um mês de competência (mês, ano), já validado.
/// Guarda o primeiro e o último dia para os filtros não recalcularem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    month: u32,
    year: i32,
    first_day: NaiveDate,
    last_day: NaiveDate,
}

impl Period {
    pub fn new(month: u32, year: i32) -> Result<Self, AppError> {
        if !(1..=12).contains(&month) {
            return Err(AppError::Validation(format!(
                "Mês inválido: {}. Use um valor entre 1 e 12.",
                month
            )));
        }

        let first_day = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| AppError::Validation(format!("Ano inválido: {}.", year)))?;

        // Último dia = véspera do primeiro dia do mês seguinte
        let last_day = first_day
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .ok_or_else(|| AppError::Validation(format!("Ano inválido: {}.", year)))?;

        Ok(Self { month, year, first_day, last_day })
    }

    /// Monta o período a partir dos parâmetros opcionais de uma consulta.
    /// Sem mês e sem ano: nenhum filtro. Só um dos dois: erro de validação.
    pub fn from_query(month: Option<u32>, year: Option<i32>) -> Result<Option<Self>, AppError> {
        match (month, year) {
            (Some(month), Some(year)) => Self::new(month, year).map(Some),
            (None, None) => Ok(None),
            _ => Err(AppError::Validation(
                "Informe mês e ano juntos para filtrar por período.".to_string(),
            )),
        }
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    pub fn last_day(&self) -> NaiveDate {
        self.last_day
    }

    /// Intervalo fechado: o primeiro e o último dia contam.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first_day && date <= self.last_day
    }
}

/// Resultado da agregação de um período.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate<T> {
    pub filtered: Vec<T>,
    pub total: Decimal,
    pub count: usize,
}

/// Arredonda valores monetários para duas casas (meio para longe do zero).
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn money_overflow() -> AppError {
    AppError::Validation("Valor monetário fora do limite suportado.".to_string())
}

/// Soma valores monetários. Estouro do `Decimal` vira erro de validação.
pub fn checked_sum<I>(values: I) -> Result<Decimal, AppError>
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, value| acc.checked_add(value).ok_or_else(money_overflow))
}

/// Total de uma linha (quantidade × preço unitário), sem estourar.
pub fn checked_line_total(quantity: Decimal, unit_price: Decimal) -> Result<Decimal, AppError> {
    quantity.checked_mul(unit_price).ok_or_else(money_overflow)
}

/// Diferença entre dois totais, sem estourar.
pub fn checked_difference(left: Decimal, right: Decimal) -> Result<Decimal, AppError> {
    left.checked_sub(right).ok_or_else(money_overflow)
}

/// Filtra os registros cuja data (escolhida por `date_of`) cai dentro do período
/// e soma o valor escolhido por `amount_of`.
///
/// Registros sem data (ex.: cobrança ainda não paga, filtrando por pagamento)
/// ficam de fora. A soma é feita em `Decimal`, sem arredondar no meio do caminho;
/// só o total final é arredondado.
pub fn aggregate<T, D, A>(
    records: &[T],
    period: &Period,
    date_of: D,
    amount_of: A,
) -> Result<Aggregate<T>, AppError>
where
    T: Clone,
    D: Fn(&T) -> Option<NaiveDate>,
    A: Fn(&T) -> Decimal,
{
    let filtered: Vec<T> = records
        .iter()
        .filter(|record| date_of(*record).is_some_and(|date| period.contains(date)))
        .cloned()
        .collect();

    let total = checked_sum(filtered.iter().map(&amount_of))?;

    Ok(Aggregate {
        count: filtered.len(),
        total: round_money(total),
        filtered,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[derive(Debug, Clone, PartialEq)]
    struct Entry {
        date: Option<NaiveDate>,
        amount: Decimal,
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn entry(date: Option<NaiveDate>, amount: &str) -> Entry {
        Entry { date, amount: dec(amount) }
    }

    #[test]
    fn period_bounds_handle_leap_years_and_december() {
        let feb = Period::new(2, 2024).unwrap();
        assert_eq!(feb.first_day(), d(2024, 2, 1));
        assert_eq!(feb.last_day(), d(2024, 2, 29));

        let dec_period = Period::new(12, 2025).unwrap();
        assert_eq!(dec_period.last_day(), d(2025, 12, 31));
    }

    #[test]
    fn invalid_month_is_a_validation_error() {
        assert!(matches!(Period::new(0, 2025), Err(AppError::Validation(_))));
        assert!(matches!(Period::new(13, 2025), Err(AppError::Validation(_))));
    }

    #[test]
    fn from_query_requires_both_parts() {
        assert_eq!(Period::from_query(None, None).unwrap(), None);
        assert!(Period::from_query(Some(11), Some(2025)).unwrap().is_some());
        assert!(Period::from_query(Some(11), None).is_err());
        assert!(Period::from_query(None, Some(2025)).is_err());
    }

    #[test]
    fn aggregate_keeps_only_dates_inside_the_month() {
        let records = vec![
            entry(Some(d(2025, 10, 31)), "10.00"),
            entry(Some(d(2025, 11, 1)), "20.00"),
            entry(Some(d(2025, 11, 30)), "30.00"),
            entry(Some(d(2025, 12, 1)), "40.00"),
            entry(None, "50.00"),
        ];
        let period = Period::new(11, 2025).unwrap();

        let result = aggregate(&records, &period, |e| e.date, |e| e.amount).unwrap();

        assert_eq!(result.count, 2);
        assert_eq!(result.total, dec("50.00"));
        assert_eq!(result.filtered, vec![records[1].clone(), records[2].clone()]);
    }

    #[test]
    fn aggregate_of_empty_list_is_zero() {
        let period = Period::new(1, 2026).unwrap();
        let result = aggregate(&Vec::<Entry>::new(), &period, |e| e.date, |e| e.amount).unwrap();

        assert_eq!(result.count, 0);
        assert_eq!(result.total, Decimal::ZERO);
        assert!(result.filtered.is_empty());
    }

    #[test]
    fn aggregate_has_no_float_drift() {
        let period = Period::new(3, 2025).unwrap();
        let records: Vec<Entry> = (0..10).map(|_| entry(Some(d(2025, 3, 5)), "0.10")).collect();

        let result = aggregate(&records, &period, |e| e.date, |e| e.amount).unwrap();
        assert_eq!(result.total, dec("1.00"));
    }

    #[test]
    fn aggregate_is_idempotent_and_leaves_input_untouched() {
        let period = Period::new(3, 2025).unwrap();
        let records = vec![entry(Some(d(2025, 3, 5)), "12.345"), entry(Some(d(2025, 3, 6)), "0.005")];
        let before = records.clone();

        let first = aggregate(&records, &period, |e| e.date, |e| e.amount).unwrap();
        let second = aggregate(&records, &period, |e| e.date, |e| e.amount).unwrap();

        assert_eq!(first, second);
        assert_eq!(records, before);
        assert_eq!(first.total, dec("12.35"));
    }

    #[test]
    fn aggregate_reports_overflow_instead_of_panicking() {
        let period = Period::new(3, 2025).unwrap();
        let records = vec![entry(Some(d(2025, 3, 5)), "50000000000000000000000000000"); 2];

        let result = aggregate(&records, &period, |e| e.date, |e| e.amount);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn line_total_overflow_is_a_validation_error() {
        let big = dec("50000000000000000000000000000");
        assert!(matches!(checked_line_total(big, dec("2")), Err(AppError::Validation(_))));
        assert_eq!(checked_line_total(dec("5"), dec("3.50")).unwrap(), dec("17.50"));
    }
}
