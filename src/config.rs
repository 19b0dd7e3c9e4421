//! Environment-driven configuration.

use std::env;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerBackend {
    Postgres { database_url: String, max_connections: u32 },
    Memory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub ledger: LedgerBackend,
    pub documents_dir: PathBuf,
    pub stripe_secret_key: Option<String>,
    pub stripe_api_base: String,
    pub frontend_url: String,
    pub gateway_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let port = match var("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value: raw,
            })?,
            None => 3005,
        };

        let memory = var("LEDGER_BACKEND")
            .map(|backend| backend.eq_ignore_ascii_case("memory"))
            .unwrap_or(false);
        let ledger = if memory {
            LedgerBackend::Memory
        } else {
            let database_url = var("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
            let max_connections = match var("DB_MAX_CONNECTIONS") {
                Some(raw) => raw.trim().parse::<u32>().map_err(|_| ConfigError::Invalid {
                    name: "DB_MAX_CONNECTIONS",
                    value: raw,
                })?,
                None => 10,
            };
            LedgerBackend::Postgres {
                database_url,
                max_connections,
            }
        };

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            ledger,
            documents_dir: var("DOCUMENTS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            stripe_secret_key: var("STRIPE_SECRET_KEY"),
            stripe_api_base: var("STRIPE_API_BASE")
                .unwrap_or_else(|| "https://api.stripe.com".to_string()),
            frontend_url: var("FRONTEND_URL")
                .unwrap_or_else(|| "http://localhost:5173".to_string())
                .trim_end_matches('/')
                .to_string(),
            gateway_url: var("GATEWAY_URL"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults_with_memory_ledger() {
        let cfg = config(&[("LEDGER_BACKEND", "memory")]).unwrap();
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 3005);
        assert_eq!(cfg.ledger, LedgerBackend::Memory);
        assert_eq!(cfg.frontend_url, "http://localhost:5173");
        assert!(cfg.stripe_secret_key.is_none());
    }

    #[test]
    fn test_database_url_required_for_postgres() {
        assert!(matches!(config(&[]), Err(ConfigError::Missing("DATABASE_URL"))));
        let cfg = config(&[("DATABASE_URL", "postgres://localhost/nomina")]).unwrap();
        assert!(matches!(
            cfg.ledger,
            LedgerBackend::Postgres { max_connections: 10, .. }
        ));
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        let result = config(&[("LEDGER_BACKEND", "memory"), ("PORT", "http")]);
        assert!(matches!(result, Err(ConfigError::Invalid { name: "PORT", .. })));
    }
}
