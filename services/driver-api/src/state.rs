//! Application state for the Driver API service.

use ferry_db::pg::{PgDriverRepository, Repositories};
use ferry_driver_core::DriverManager;
use std::sync::Arc;

use crate::config::Config;

/// Driver manager with the concrete repository type
pub type DriverManagerImpl = DriverManager<PgDriverRepository>;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Driver lifecycle operations
    pub drivers: Arc<DriverManagerImpl>,
    /// Configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state
    pub fn new(repos: Repositories, config: Config) -> Self {
        Self {
            drivers: Arc::new(DriverManager::new(Arc::new(repos.drivers))),
            config: Arc::new(config),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
