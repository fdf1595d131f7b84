//! Driver errors

use thiserror::Error;

/// Driver operation errors
#[derive(Error, Debug)]
pub enum DriverError {
    /// Lookup found no driver with this id
    #[error("driver not found")]
    NotFound,

    /// Any other persistence failure
    #[error("storage failure: {0}")]
    Storage(String),
}

impl DriverError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::Storage(_) => 500,
        }
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound => "DRIVER_NOT_FOUND",
            Self::Storage(_) => "STORAGE_FAILURE",
        }
    }
}

/// Repositories report absence as `None`, so every database error is a
/// storage failure.
impl From<ferry_db::DbError> for DriverError {
    fn from(err: ferry_db::DbError) -> Self {
        tracing::error!("Database error: {}", err);
        Self::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_codes() {
        assert_eq!(DriverError::NotFound.status_code(), 404);
        assert_eq!(DriverError::NotFound.error_code(), "DRIVER_NOT_FOUND");
    }

    #[test]
    fn test_db_errors_become_storage() {
        let err = DriverError::from(ferry_db::DbError::OutOfRange("available_seats"));
        assert!(matches!(err, DriverError::Storage(_)));
        assert_eq!(err.error_code(), "STORAGE_FAILURE");
        assert_eq!(err.status_code(), 500);
    }
}
