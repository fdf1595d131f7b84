//! Derived read results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A driver's current operational status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResult {
    pub status: String,
}

impl StatusResult {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
        }
    }
}

/// One completed trip joined with its review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripHistoryEntry {
    /// Pickup location
    pub location: String,
    pub destination: String,
    pub trip_date: DateTime<Utc>,
    /// Passenger review comment
    pub review: String,
    /// Star rating
    pub star: i64,
}
