// src/config.rs

use std::{env, str::FromStr, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::Repositories,
    services::{
        auth::AuthService, charge_service::ChargeService, dashboard_service::DashboardService,
        payer_service::PayerService, purchase_service::PurchaseService,
        tenancy_service::TenantService,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => anyhow::bail!("STORAGE_BACKEND inválido: '{}' (use postgres ou memory)", other),
        }
    }
}

/// Configuração lida do ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub storage: StorageBackend,
    pub default_page_size: usize,
    pub jwt_ttl_days: i64,
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{} inválida ('{}'): {}", name, raw, e)),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let storage = parse_var("STORAGE_BACKEND", StorageBackend::Postgres)?;

        // Só o Postgres precisa de URL
        let database_url = env::var("DATABASE_URL").ok();
        if storage == StorageBackend::Postgres && database_url.is_none() {
            anyhow::bail!("DATABASE_URL deve ser definida");
        }

        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            storage,
            default_page_size: parse_var("DEFAULT_PAGE_SIZE", 10usize)?.max(1),
            jwt_ttl_days: parse_var("JWT_TTL_DAYS", 7i64)?,
        })
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub db_pool: Option<PgPool>,

    pub auth_service: AuthService,
    pub tenant_service: TenantService,
    pub payer_service: PayerService,
    pub charge_service: ChargeService,
    pub purchase_service: PurchaseService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        match config.storage {
            StorageBackend::Postgres => {
                let database_url = config
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL deve ser definida")?;

                let db_pool = PgPoolOptions::new()
                    .max_connections(5)
                    .acquire_timeout(Duration::from_secs(3))
                    .connect(database_url)
                    .await
                    .context("Falha ao conectar ao banco de dados")?;

                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

                let repos = Repositories::postgres(db_pool.clone());
                Ok(Self::build(config, Some(db_pool), repos))
            }
            StorageBackend::Memory => {
                tracing::warn!("⚠️ Usando armazenamento em memória: os dados somem ao reiniciar.");
                Ok(Self::build(config, None, Repositories::in_memory()))
            }
        }
    }

    /// Estado com o store em memória, sem banco. Usado nos testes.
    pub fn in_memory(config: Config) -> Self {
        Self::build(config, None, Repositories::in_memory())
    }

    // --- Monta o gráfico de dependências ---
    fn build(config: Config, db_pool: Option<PgPool>, repos: Repositories) -> Self {
        let auth_service = AuthService::new(
            repos.users.clone(),
            config.jwt_secret.clone(),
            config.jwt_ttl_days,
        );
        let tenant_service = TenantService::new(repos.establishments.clone(), repos.users.clone());
        let payer_service = PayerService::new(repos.payers.clone());
        let charge_service = ChargeService::new(repos.charges.clone(), repos.payers.clone());
        let purchase_service = PurchaseService::new(repos.purchases.clone(), repos.establishments.clone());
        let dashboard_service = DashboardService::new(charge_service.clone(), purchase_service.clone());

        Self {
            config,
            db_pool,
            auth_service,
            tenant_service,
            payer_service,
            charge_service,
            purchase_service,
            dashboard_service,
        }
    }

    /// Troca o custo do bcrypt (testes).
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.auth_service = self.auth_service.with_bcrypt_cost(cost);
        self
    }
}
