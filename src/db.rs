pub mod repository;
pub use repository::{
    ChargeStore, EstablishmentStore, PayerStore, PurchaseStore, ScopedRepository, UserStore,
};
pub mod user_repo;
pub use user_repo::UserRepository;
pub mod tenancy_repo;
pub use tenancy_repo::EstablishmentRepository;
pub mod payer_repo;
pub use payer_repo::PayerRepository;
pub mod finance_repo;
pub use finance_repo::ChargeRepository;
pub mod purchase_repo;
pub use purchase_repo::PurchaseRepository;
pub mod memory;
pub use memory::MemoryStore;

use std::sync::Arc;

use sqlx::PgPool;

/// Conjunto de stores injetado nos serviços.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserStore>,
    pub establishments: Arc<dyn EstablishmentStore>,
    pub payers: Arc<dyn PayerStore>,
    pub charges: Arc<dyn ChargeStore>,
    pub purchases: Arc<dyn PurchaseStore>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(UserRepository::new(pool.clone())),
            establishments: Arc::new(EstablishmentRepository::new(pool.clone())),
            payers: Arc::new(PayerRepository::new(pool.clone())),
            charges: Arc::new(ChargeRepository::new(pool.clone())),
            purchases: Arc::new(PurchaseRepository::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        let store = MemoryStore::new();
        Self {
            users: Arc::new(store.clone()),
            establishments: Arc::new(store.clone()),
            payers: Arc::new(store.clone()),
            charges: Arc::new(store.clone()),
            purchases: Arc::new(store),
        }
    }
}
