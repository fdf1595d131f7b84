//! Ferry DB - Database abstractions
//!
//! SQLx-based database layer for Ferry services.
//!
//! # Example
//!
//! ```rust,ignore
//! use ferry_db::{create_pool, Repositories};
//!
//! let pool = create_pool("postgres://localhost/ferry").await?;
//! let repos = Repositories::new(pool);
//!
//! let driver = repos.drivers.find_by_id(&"d1".into()).await?;
//! ```

pub mod error;
#[cfg(feature = "test-utils")]
pub mod memory;
pub mod models;
pub mod pg;
pub mod pool;
pub mod repo;

pub use error::{DbError, DbResult};
pub use models::*;
pub use pg::Repositories;
pub use pool::{create_pool, create_pool_with_options, DbPool, PoolOptions};
pub use repo::*;
