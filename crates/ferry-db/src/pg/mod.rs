//! PostgreSQL repository implementations

mod driver;

pub use driver::PgDriverRepository;

use crate::DbPool;

/// All repositories bundled together
#[derive(Clone)]
pub struct Repositories {
    pub drivers: PgDriverRepository,
}

impl Repositories {
    /// Create all repositories from a database pool
    pub fn new(pool: DbPool) -> Self {
        Self {
            drivers: PgDriverRepository::new(pool),
        }
    }
}
