//! Database errors

use thiserror::Error;

/// Database errors
#[derive(Error, Debug)]
pub enum DbError {
    /// SQLx error
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Value does not fit the column type
    #[error("value out of range for column {0}")]
    OutOfRange(&'static str),
}

/// Result alias for repository calls
pub type DbResult<T> = Result<T, DbError>;
