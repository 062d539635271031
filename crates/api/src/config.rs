//! Process configuration, read from environment variables.

use thiserror::Error;

use catalog_observability::LogFormat;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub database: String,
    pub collection: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// Process-local store; contents are lost on restart.
    Memory,
    MongoDb { uri: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {key} value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0} must be set when STORE_BACKEND=mongodb")]
    Missing(&'static str),
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match lookup("PORT") {
            Some(raw) => raw.parse().map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
                key: "PORT",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => 8080,
        };

        let log_format = match lookup("LOG_FORMAT") {
            Some(raw) => raw.parse().map_err(|e: catalog_observability::ParseLogFormatError| {
                ConfigError::Invalid {
                    key: "LOG_FORMAT",
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?,
            None => LogFormat::default(),
        };

        let backend = match lookup("STORE_BACKEND").as_deref().map(str::trim) {
            None | Some("memory") => StoreBackend::Memory,
            Some("mongodb") => StoreBackend::MongoDb {
                uri: lookup("MONGODB_URI").ok_or(ConfigError::Missing("MONGODB_URI"))?,
            },
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "STORE_BACKEND",
                    value: other.to_string(),
                    reason: "expected 'memory' or 'mongodb'".to_string(),
                });
            }
        };

        Ok(Self {
            server: ServerConfig { host, port },
            store: StoreConfig {
                backend,
                database: lookup("MONGODB_DATABASE").unwrap_or_else(|| "store".to_string()),
                collection: lookup("MONGODB_COLLECTION").unwrap_or_else(|| "products".to_string()),
            },
            log_format,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_to_in_memory_store_on_port_8080() {
        let cfg = config(&[]).unwrap();

        assert_eq!(cfg.server_address(), "0.0.0.0:8080");
        assert_eq!(cfg.store.backend, StoreBackend::Memory);
        assert_eq!(cfg.store.database, "store");
        assert_eq!(cfg.store.collection, "products");
        assert_eq!(cfg.log_format, LogFormat::Json);
    }

    #[test]
    fn reads_mongodb_settings() {
        let cfg = config(&[
            ("STORE_BACKEND", "mongodb"),
            ("MONGODB_URI", "mongodb://localhost:27017"),
            ("MONGODB_DATABASE", "catalog"),
            ("LOG_FORMAT", "pretty"),
            ("PORT", "9000"),
        ])
        .unwrap();

        assert_eq!(
            cfg.store.backend,
            StoreBackend::MongoDb {
                uri: "mongodb://localhost:27017".to_string()
            }
        );
        assert_eq!(cfg.store.database, "catalog");
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.log_format, LogFormat::Pretty);
    }

    #[test]
    fn mongodb_backend_requires_uri() {
        assert_eq!(
            config(&[("STORE_BACKEND", "mongodb")]),
            Err(ConfigError::Missing("MONGODB_URI"))
        );
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            config(&[("PORT", "eighty")]),
            Err(ConfigError::Invalid { key: "PORT", .. })
        ));
        assert!(matches!(
            config(&[("STORE_BACKEND", "postgres")]),
            Err(ConfigError::Invalid { key: "STORE_BACKEND", .. })
        ));
        assert!(matches!(
            config(&[("LOG_FORMAT", "xml")]),
            Err(ConfigError::Invalid { key: "LOG_FORMAT", .. })
        ));
    }
}
