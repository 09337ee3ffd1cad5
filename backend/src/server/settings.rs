//! Service settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `USER_SERVICE_*` environment variables and an
//! optional configuration file. The connection string falls back to the
//! conventional `DATABASE_URL` variable.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use user_service::outbound::persistence::PoolConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Errors raised while resolving settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("database URL missing: set --database-url, USER_SERVICE_DATABASE_URL or DATABASE_URL")]
    MissingDatabaseUrl,
    #[error("{source_name} must not be empty")]
    EmptyDatabaseUrl { source_name: &'static str },
    #[error("invalid bind address {value:?}: {message}")]
    InvalidBindAddr { value: String, message: String },
}

/// Configuration values for the HTTP service and its database pool.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "USER_SERVICE")]
pub struct ServiceSettings {
    /// PostgreSQL connection string. Overrides `DATABASE_URL`.
    pub database_url: Option<String>,
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// Maximum number of pooled connections.
    pub pool_max_size: Option<u32>,
    /// Idle connections the pool keeps open.
    pub pool_min_idle: Option<u32>,
    /// Seconds to wait for a pooled connection.
    pub pool_connection_timeout_secs: Option<u64>,
    /// Seconds probes report 503 before the listener closes on shutdown.
    pub shutdown_grace_secs: Option<u64>,
    /// Apply embedded migrations before serving.
    #[ortho_config(default = true)]
    pub run_migrations: bool,
}

impl ServiceSettings {
    /// Resolve the connection string from settings or `DATABASE_URL`.
    pub fn database_url(&self) -> Result<String, SettingsError> {
        resolve_database_url(self.database_url.clone())
    }

    /// Parse the configured bind address, falling back to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| SettingsError::InvalidBindAddr {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    /// Delay between failing the probes and stopping the server.
    pub fn shutdown_grace(&self) -> Duration {
        self.shutdown_grace_secs
            .map_or(DEFAULT_SHUTDOWN_GRACE, Duration::from_secs)
    }

    /// Build the pool configuration, keeping pool defaults for unset values.
    pub fn pool_config(&self, database_url: String) -> PoolConfig {
        let mut config = PoolConfig::new(database_url);
        if let Some(max_size) = self.pool_max_size {
            config = config.with_max_size(max_size);
        }
        if let Some(min_idle) = self.pool_min_idle {
            config = config.with_min_idle(Some(min_idle));
        }
        if let Some(secs) = self.pool_connection_timeout_secs {
            config = config.with_connection_timeout(Duration::from_secs(secs));
        }
        config
    }
}

fn resolve_database_url(explicit: Option<String>) -> Result<String, SettingsError> {
    if let Some(value) = explicit {
        if value.trim().is_empty() {
            return Err(SettingsError::EmptyDatabaseUrl {
                source_name: "USER_SERVICE_DATABASE_URL",
            });
        }
        return Ok(value);
    }

    let from_env = env::var("DATABASE_URL").map_err(|_| SettingsError::MissingDatabaseUrl)?;
    if from_env.trim().is_empty() {
        return Err(SettingsError::EmptyDatabaseUrl {
            source_name: "DATABASE_URL",
        });
    }
    Ok(from_env)
}
