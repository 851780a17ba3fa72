//! API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//! A `.env` file in the working directory is read first by `main`.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use shelfkeep_db::DbConfig;

/// API server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Interface to bind (default: 0.0.0.0)
    pub host: String,

    /// HTTP port (default: 5000)
    pub port: u16,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size (default: 5)
    pub db_max_connections: u32,

    /// Origin allowed by CORS, i.e. the dashboard's URL
    pub cors_origin: String,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup` instead of the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let config = ApiConfig {
            host: var("SHELFKEEP_HOST", "0.0.0.0"),

            port: var("SHELFKEEP_PORT", "5000")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SHELFKEEP_PORT".to_string()))?,

            database_path: PathBuf::from(var("SHELFKEEP_DB_PATH", "./data/shelfkeep.db")),

            db_max_connections: var("SHELFKEEP_DB_MAX_CONNECTIONS", "5")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SHELFKEEP_DB_MAX_CONNECTIONS".to_string()))?,

            cors_origin: var("SHELFKEEP_CORS_ORIGIN", "http://localhost:5173"),
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "SHELFKEEP_DB_MAX_CONNECTIONS".to_string(),
            ));
        }

        Ok(config)
    }

    /// Address the server listens on.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue("SHELFKEEP_HOST".to_string()))
    }

    /// Database settings for [`shelfkeep_db::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path.clone()).max_connections(self.db_max_connections)
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
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ApiConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.cors_origin, "http://localhost:5173");
        assert_eq!(config.socket_addr().unwrap().to_string(), "0.0.0.0:5000");
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("SHELFKEEP_HOST", "127.0.0.1"),
            ("SHELFKEEP_PORT", "8080"),
            ("SHELFKEEP_DB_PATH", "/var/lib/shelfkeep/shop.db"),
        ])
        .unwrap();

        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:8080");
        assert_eq!(
            config.db_config().database_path,
            PathBuf::from("/var/lib/shelfkeep/shop.db")
        );
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("SHELFKEEP_PORT", "http")]),
            Err(ConfigError::InvalidValue(v)) if v == "SHELFKEEP_PORT"
        ));
        assert!(load(&[("SHELFKEEP_DB_MAX_CONNECTIONS", "0")]).is_err());
        assert!(load(&[("SHELFKEEP_HOST", "not a host")])
            .unwrap()
            .socket_addr()
            .is_err());
    }
}
