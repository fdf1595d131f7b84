//! Configuration for the Driver API service.

use ferry_db::PoolOptions;
use std::time::Duration;

/// Driver API configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (health, readiness, metrics)
    pub http_port: u16,
    /// gRPC server port
    pub grpc_port: u16,
    /// Database URL
    pub database_url: String,
    /// Connection pool sizing
    pub pool: PoolOptions,
    /// Create missing tables at startup
    pub init_schema: bool,
    /// Deadline for a single gRPC call, including its database work
    pub request_timeout: Duration,
    /// Metrics enabled
    pub metrics_enabled: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Database
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let max_connections: u32 = std::env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("DB_MAX_CONNECTIONS"))?;

        let acquire_timeout_secs: u64 = std::env::var("DB_ACQUIRE_TIMEOUT_SECS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("DB_ACQUIRE_TIMEOUT_SECS"))?;

        let init_schema = std::env::var("DB_INIT_SCHEMA")
            .unwrap_or_else(|_| "false".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("DB_INIT_SCHEMA"))?;

        // Server ports
        let http_port = std::env::var("HTTP_PORT")
            .unwrap_or_else(|_| "8083".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("HTTP_PORT"))?;

        let grpc_port = std::env::var("GRPC_PORT")
            .unwrap_or_else(|_| "50053".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("GRPC_PORT"))?;

        // Request timeout (default 30 seconds)
        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("REQUEST_TIMEOUT_SECS"))?;

        if max_connections == 0 {
            return Err(ConfigError::Invalid("DB_MAX_CONNECTIONS"));
        }

        // Metrics
        let metrics_enabled = std::env::var("METRICS_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .unwrap_or(true);

        Ok(Self {
            http_port,
            grpc_port,
            database_url,
            pool: PoolOptions {
                max_connections,
                acquire_timeout: Duration::from_secs(acquire_timeout_secs),
            },
            init_schema,
            request_timeout: Duration::from_secs(request_timeout_secs),
            metrics_enabled,
        })
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
