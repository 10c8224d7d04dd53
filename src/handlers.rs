pub mod auth;
pub mod charges;
pub mod dashboard;
pub mod payers;
pub mod purchases;
pub mod tenancy;
