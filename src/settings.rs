// Environment-driven configuration for the welcome service

//! # Settings
//!
//! All runtime options come from environment variables (optionally loaded
//! from a `.env` file by the binaries). Every option has a default, so the
//! service starts with no configuration at all.
//!
//! | Variable | Default |
//! |---|---|
//! | `PORT` | `4000` |
//! | `HOST` | `0.0.0.0` |
//! | `MONGO_URI` | `mongodb://localhost:27017/test` |
//! | `RETRY_DELAY_SECS` | `5` |
//! | `MONGO_CONNECT_TIMEOUT_SECS` | `5` |
//! | `STORE_BACKEND` | `mongo` (`mongo` or `memory`) |
//! | `SEED_NAME` | `Big Bill Brown` |
//! | `SEED_POLICY` | `always` (`always`, `if_empty`, `disabled`) |
//! | `CORS_ENABLED` | `true` |
//!
//! ## Rust Learning Notes:
//!
//! ### The `config` Crate
//! `config::Config::builder()` layers sources on top of defaults. The
//! `Environment` source lowercases variable names, so `MONGO_URI` lands in
//! the `mongo_uri` field when the result is deserialized with serde.

use std::collections::HashMap;
use std::time::Duration;

use config::{Config, Environment};
use serde::Deserialize;

use crate::engine::seed::{SeedConfig, SeedPolicy, DEFAULT_SEED_NAME};
use crate::engine::supervisor::{SupervisorConfig, DEFAULT_MONGO_URI};
use crate::server::http::WelcomeServerConfig;
use crate::Result;

/// Which document store the server attaches to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    Mongo,
    /// Process-local store, lost on restart
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub mongo_uri: String,
    pub retry_delay_secs: u64,
    pub mongo_connect_timeout_secs: u64,
    pub store_backend: StoreBackend,
    pub seed_name: String,
    pub seed_policy: SeedPolicy,
    pub cors_enabled: bool,
}

impl AppConfig {
    /// Load from the process environment
    pub fn from_env() -> Result<Self> {
        Self::load(Environment::default())
    }

    /// Load from an explicit variable map instead of the process environment
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self> {
        Self::load(Environment::default().source(Some(vars)))
    }

    fn load(environment: Environment) -> Result<Self> {
        let settings = Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 4000_i64)?
            .set_default("mongo_uri", DEFAULT_MONGO_URI)?
            .set_default("retry_delay_secs", 5_i64)?
            .set_default("mongo_connect_timeout_secs", 5_i64)?
            .set_default("store_backend", "mongo")?
            .set_default("seed_name", DEFAULT_SEED_NAME)?
            .set_default("seed_policy", "always")?
            .set_default("cors_enabled", true)?
            .add_source(environment.try_parsing(true))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.mongo_connect_timeout_secs)
    }

    pub fn supervisor_config(&self) -> SupervisorConfig {
        SupervisorConfig {
            uri: self.mongo_uri.clone(),
            retry_delay: self.retry_delay(),
            seed: SeedConfig {
                name: self.seed_name.clone(),
                policy: self.seed_policy,
            },
        }
    }

    pub fn server_config(&self) -> WelcomeServerConfig {
        WelcomeServerConfig {
            host: self.host.clone(),
            port: self.port,
            cors_enabled: self.cors_enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WelcomeError;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_apply_when_unset() {
        let config = AppConfig::from_vars(HashMap::new()).unwrap();

        assert_eq!(config.port, 4000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.mongo_uri, "mongodb://localhost:27017/test");
        assert_eq!(config.retry_delay(), Duration::from_secs(5));
        assert_eq!(config.store_backend, StoreBackend::Mongo);
        assert_eq!(config.seed_name, "Big Bill Brown");
        assert_eq!(config.seed_policy, SeedPolicy::Always);
        assert!(config.cors_enabled);
    }

    #[test]
    fn test_environment_overrides_defaults() {
        let config = AppConfig::from_vars(vars(&[
            ("PORT", "8080"),
            ("MONGO_URI", "mongodb://mongo:27017/app"),
            ("RETRY_DELAY_SECS", "1"),
            ("STORE_BACKEND", "memory"),
            ("SEED_POLICY", "if_empty"),
            ("CORS_ENABLED", "false"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.mongo_uri, "mongodb://mongo:27017/app");
        assert_eq!(config.store_backend, StoreBackend::Memory);

        let supervisor = config.supervisor_config();
        assert_eq!(supervisor.retry_delay, Duration::from_secs(1));
        assert_eq!(supervisor.seed.policy, SeedPolicy::IfEmpty);
        assert!(!config.server_config().cors_enabled);
    }

    #[test]
    fn test_invalid_port_is_a_config_error() {
        let result = AppConfig::from_vars(vars(&[("PORT", "not-a-port")]));
        assert!(matches!(result, Err(WelcomeError::Config(_))));
    }
}
