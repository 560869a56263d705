//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Values are read with the `ADVISORLY_`
//! prefix and nested sections use `__` as the separator, e.g.
//! `ADVISORLY_DATABASE__URL`.

mod database;
mod error;
mod gateway;
mod server;

pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use gateway::GatewayConfig;
pub use server::ServerConfig;

use serde::Deserialize;

/// Root application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Payment gateway configuration (Toss Payments)
    pub gateway: GatewayConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Loads a `.env` file first when present (development convenience),
    /// then reads `ADVISORLY_`-prefixed environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        // Ignore a missing .env; production sets real environment variables.
        let _ = dotenvy::dotenv();

        let config = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("ADVISORLY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validates cross-field constraints the type system cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.is_empty() {
            return Err(ConfigError::Invalid {
                field: "database.url",
                reason: "must not be empty".to_string(),
            });
        }
        if self.gateway.secret_key.is_empty() {
            return Err(ConfigError::Invalid {
                field: "gateway.secret_key",
                reason: "must not be empty".to_string(),
            });
        }
        if self.gateway.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "gateway.timeout_secs",
                reason: "must be at least 1 second".to_string(),
            });
        }
        Ok(())
    }
}
