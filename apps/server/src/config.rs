//! Server configuration.
//!
//! Configuration is an explicit object loaded once at startup and injected
//! into the router state; core operations never read process-wide state.
//! Values come from environment variables with development fallbacks.

use serde::{Deserialize, Serialize};
use std::env;

use estok_core::StockPolicy;

/// Recognized configuration options for the Estok server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind host (`ESTOK_HOST`, default 127.0.0.1).
    pub host: String,

    /// Bind port (`ESTOK_PORT`, default 5000).
    pub port: u16,

    /// Path to the SQLite database file (`ESTOK_DATABASE_PATH`,
    /// default ./estok.db).
    pub database_path: String,

    /// Optional API key handed to external collaborators
    /// (`ESTOK_API_KEY`). Carried in the configuration surface; request
    /// authentication itself is outside this backend.
    pub api_key: Option<String>,

    /// Whether EXIT/SALE movements may drive stock negative
    /// (`ESTOK_ALLOW_NEGATIVE_STOCK`, default true - the historical
    /// floor-free behavior).
    pub allow_negative_stock: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ServerConfig {
            host: env::var("ESTOK_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),

            port: env::var("ESTOK_PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("ESTOK_PORT".to_string()))?,

            database_path: env::var("ESTOK_DATABASE_PATH")
                .unwrap_or_else(|_| "./estok.db".to_string()),

            api_key: env::var("ESTOK_API_KEY").ok(),

            allow_negative_stock: env::var("ESTOK_ALLOW_NEGATIVE_STOCK")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("ESTOK_ALLOW_NEGATIVE_STOCK".to_string()))?,
        };

        if config.host.trim().is_empty() {
            return Err(ConfigError::InvalidValue("ESTOK_HOST".to_string()));
        }

        Ok(config)
    }

    /// The stock policy derived from this configuration.
    pub fn stock_policy(&self) -> StockPolicy {
        StockPolicy {
            allow_negative_stock: self.allow_negative_stock,
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_policy_from_config() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 5000,
            database_path: ":memory:".to_string(),
            api_key: None,
            allow_negative_stock: false,
        };
        assert!(!config.stock_policy().allow_negative_stock);
    }
}
