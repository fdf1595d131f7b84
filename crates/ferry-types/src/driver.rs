//! Driver types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, TypesError};

/// Unique driver identifier.
///
/// Drivers share their primary key with the owning account, so a driver id
/// is always also a valid [`AccountId`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DriverId(pub String);

impl DriverId {
    /// Parse a driver ID, rejecting empty input
    pub fn parse(s: &str) -> Result<Self, TypesError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(TypesError::EmptyId);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The account this driver record belongs to
    pub fn account_id(&self) -> AccountId {
        AccountId(self.0.clone())
    }
}

impl std::fmt::Display for DriverId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DriverId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for DriverId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A driver's operational profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverDetails {
    /// Driver ID (same value as the account ID)
    pub id: DriverId,
    pub name: String,
    pub phone_number: String,
    /// Assigned route, `None` when unassigned
    pub route_id: Option<i64>,
    pub license_number: String,
    /// SIM (driving permit) identifier
    pub sim: String,
    /// Free-text operational state, e.g. `available`, `busy`, `offline`
    pub status: String,
    /// Whether the driver passed eligibility checks
    pub verified: bool,
    pub available_seats: u32,
    pub profile_picture: String,
    /// Last heartbeat, `None` until the first one arrives
    pub last_seen: Option<DateTime<Utc>>,
}

impl DriverDetails {
    /// Create an otherwise empty record for the given driver
    pub fn new(id: impl Into<DriverId>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// The account this record is linked to
    pub fn account_id(&self) -> AccountId {
        self.id.account_id()
    }
}

/// Selector for listing drivers by verification state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverFilter {
    /// Every driver
    #[default]
    All,
    /// Only drivers with `verified = true`
    Verified,
    /// Only drivers with `verified = false`
    Unverified,
}

impl DriverFilter {
    /// Build a filter from an optional verified flag
    pub const fn from_verified(verified: Option<bool>) -> Self {
        match verified {
            None => Self::All,
            Some(true) => Self::Verified,
            Some(false) => Self::Unverified,
        }
    }

    /// The verified value rows must have, `None` for no constraint
    pub const fn verified(&self) -> Option<bool> {
        match self {
            Self::All => None,
            Self::Verified => Some(true),
            Self::Unverified => Some(false),
        }
    }

    /// Check whether a record with the given flag passes this filter
    pub const fn matches(&self, verified: bool) -> bool {
        match self.verified() {
            None => true,
            Some(wanted) => wanted == verified,
        }
    }
}

impl std::fmt::Display for DriverFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Verified => write!(f, "verified"),
            Self::Unverified => write!(f, "unverified"),
        }
    }
}
