// src/ledger/mod.rs
//
// Núcleo puro do razão: status das cobranças, agregação por período e
// paginação. Nada aqui acessa banco nem relógio.

pub mod lifecycle;
pub mod pagination;
pub mod period;

pub use lifecycle::{check_transition, derive_effective_status, summarize_charges};
pub use pagination::{paginate, Page, Paginator};
pub use period::{
    aggregate, checked_difference, checked_line_total, checked_sum, round_money, Aggregate, Period,
};
