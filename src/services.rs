pub mod auth;
pub mod charge_service;
pub mod dashboard_service;
pub mod payer_service;
pub mod purchase_service;
pub mod tenancy_service;
