//! Common error types

use thiserror::Error;

/// Errors raised while parsing domain values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypesError {
    /// Identifier was empty or whitespace
    #[error("empty identifier")]
    EmptyId,
}
