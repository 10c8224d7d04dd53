pub mod auth;
pub mod dashboard;
pub mod finance;
pub mod payers;
pub mod purchases;
pub mod query;
pub mod tenancy;
