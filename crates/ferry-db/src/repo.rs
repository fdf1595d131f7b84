//! Repository traits
//!
//! Define async repository interfaces for database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ferry_types::{DriverDetails, DriverFilter, DriverId, TripHistoryEntry};

use crate::error::DbResult;
use crate::models::DriverRow;

/// Driver repository trait
///
/// Update methods succeed without touching anything when no row matches the
/// id; callers that need existence must look the driver up first.
#[async_trait]
pub trait DriverRepository: Send + Sync {
    /// Check that the store answers a trivial query
    async fn ping(&self) -> DbResult<()>;

    /// Find a driver by ID
    async fn find_by_id(&self, id: &DriverId) -> DbResult<Option<DriverRow>>;

    /// List drivers matching a verification filter, in store order
    async fn list(&self, filter: DriverFilter) -> DbResult<Vec<DriverRow>>;

    /// List drivers whose last heartbeat falls in `[from, to]`
    async fn list_seen_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<DriverRow>>;

    /// Create a new driver
    async fn create(&self, driver: &DriverDetails) -> DbResult<DriverRow>;

    /// Apply a sparse update, returning the number of rows touched
    async fn update(&self, update: &UpdateDriver) -> DbResult<u64>;

    /// Read only the status column
    async fn find_status(&self, id: &DriverId) -> DbResult<Option<String>>;

    /// Update driver status
    async fn update_status(&self, id: &DriverId, status: &str) -> DbResult<()>;

    /// Update last seen timestamp
    async fn update_last_seen(&self, id: &DriverId, seen_at: DateTime<Utc>) -> DbResult<()>;

    /// Delete a driver
    async fn delete(&self, id: &DriverId) -> DbResult<()>;

    /// Trips driven by this driver, joined with their reviews
    async fn find_trip_history(&self, id: &DriverId) -> DbResult<Vec<TripHistoryEntry>>;
}

/// Sparse driver update input. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateDriver {
    pub id: DriverId,
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub route_id: Option<i64>,
    pub license_number: Option<String>,
    pub sim: Option<String>,
    pub status: Option<String>,
    pub verified: Option<bool>,
    pub available_seats: Option<u32>,
    pub profile_picture: Option<String>,
}

impl UpdateDriver {
    /// Build an update from a full record, skipping zero-valued fields.
    ///
    /// Empty strings, a missing route, zero seats and `verified = false` are
    /// all treated as "not supplied".
    pub fn from_sparse(details: &DriverDetails) -> Self {
        fn non_empty(value: &str) -> Option<String> {
            (!value.is_empty()).then(|| value.to_string())
        }

        Self {
            id: details.id.clone(),
            name: non_empty(&details.name),
            phone_number: non_empty(&details.phone_number),
            route_id: details.route_id,
            license_number: non_empty(&details.license_number),
            sim: non_empty(&details.sim),
            status: non_empty(&details.status),
            verified: details.verified.then_some(true),
            available_seats: (details.available_seats != 0).then_some(details.available_seats),
            profile_picture: non_empty(&details.profile_picture),
        }
    }

    /// Whether the update would write no columns
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone_number.is_none()
            && self.route_id.is_none()
            && self.license_number.is_none()
            && self.sim.is_none()
            && self.status.is_none()
            && self.verified.is_none()
            && self.available_seats.is_none()
            && self.profile_picture.is_none()
    }

    /// Apply this update to an in-memory record
    pub fn apply_to(&self, details: &mut DriverDetails) {
        if let Some(name) = &self.name {
            details.name.clone_from(name);
        }
        if let Some(phone_number) = &self.phone_number {
            details.phone_number.clone_from(phone_number);
        }
        if let Some(route_id) = self.route_id {
            details.route_id = Some(route_id);
        }
        if let Some(license_number) = &self.license_number {
            details.license_number.clone_from(license_number);
        }
        if let Some(sim) = &self.sim {
            details.sim.clone_from(sim);
        }
        if let Some(status) = &self.status {
            details.status.clone_from(status);
        }
        if let Some(verified) = self.verified {
            details.verified = verified;
        }
        if let Some(seats) = self.available_seats {
            details.available_seats = seats;
        }
        if let Some(profile_picture) = &self.profile_picture {
            details.profile_picture.clone_from(profile_picture);
        }
    }
}
