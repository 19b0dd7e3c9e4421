//! Application state shared by every handler.
//!
//! Operations are split by concern:
//! - `payroll` - workers and payroll periods
//! - `payments` - checkout, registration and confirmation
//! - `documents` - receipts, invoices and reports

mod documents;
mod payments;
mod payroll;

pub use documents::month_range;

use anyhow::Context;
use moka::future::Cache;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{AppConfig, LedgerBackend};
use crate::documents::{DocumentRenderer, DocumentStore};
use crate::gateway::{DisabledGateway, PaymentGateway, StripeConfig, StripeGateway};
use crate::ledger::{InMemoryLedger, PayrollLedger, PgLedger};
use crate::worker::models::Worker;

pub const WORKER_CACHE_KEY: &str = "trabajadores";

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<dyn PayrollLedger>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub documents: DocumentStore,
    pub renderer: DocumentRenderer,
    pub worker_cache: Cache<String, Vec<Worker>>,
    pub frontend_url: String,
}

impl AppState {
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let ledger: Arc<dyn PayrollLedger> = match &config.ledger {
            LedgerBackend::Postgres {
                database_url,
                max_connections,
            } => {
                let pool = sqlx::postgres::PgPoolOptions::new()
                    .max_connections(*max_connections)
                    .acquire_timeout(Duration::from_secs(30))
                    .idle_timeout(Duration::from_secs(900))
                    .max_lifetime(Duration::from_secs(1800))
                    .connect(database_url)
                    .await
                    .context("failed to connect to DATABASE_URL")?;
                Arc::new(PgLedger::new(pool))
            }
            LedgerBackend::Memory => {
                log::warn!("Using in-memory ledger; data is lost on restart");
                Arc::new(InMemoryLedger::new())
            }
        };

        let gateway: Arc<dyn PaymentGateway> = match &config.stripe_secret_key {
            Some(key) => {
                let http_client = reqwest::Client::builder()
                    .pool_idle_timeout(Duration::from_secs(900))
                    .timeout(Duration::from_secs(30))
                    .user_agent("nomina-service/0.3")
                    .build()
                    .context("failed to create HTTP client")?;
                let stripe = StripeConfig {
                    secret_key: key.clone(),
                    api_base: config.stripe_api_base.clone(),
                };
                Arc::new(StripeGateway::new(stripe, http_client))
            }
            None => {
                log::warn!("STRIPE_SECRET_KEY not set; card payments are disabled");
                Arc::new(DisabledGateway)
            }
        };

        Ok(Self::new_with_parts(
            ledger,
            gateway,
            config.documents_dir.clone(),
            config.frontend_url.clone(),
        ))
    }

    pub fn new_with_parts(
        ledger: Arc<dyn PayrollLedger>,
        gateway: Arc<dyn PaymentGateway>,
        documents_dir: impl Into<PathBuf>,
        frontend_url: impl Into<String>,
    ) -> Self {
        let worker_cache = Cache::builder()
            .time_to_live(Duration::from_secs(10 * 60))
            .max_capacity(10)
            .build();

        Self {
            ledger,
            gateway,
            documents: DocumentStore::new(documents_dir),
            renderer: DocumentRenderer::default(),
            worker_cache,
            frontend_url: frontend_url.into(),
        }
    }
}
