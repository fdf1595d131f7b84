//! Driver manager - records, verification, status, presence and trip history

use chrono::{DateTime, Utc};
use ferry_db::{DriverRepository, UpdateDriver};
use ferry_types::{
    presence_cutoff, DriverDetails, DriverFilter, DriverId, StatusResult, TripHistoryEntry,
};
use std::sync::Arc;

use crate::DriverError;

/// Driver lifecycle operations
///
/// Stateless per call: every method is a single repository round trip (or a
/// lookup followed by one), with no retries and no caching.
///
/// Lookups (`get_driver_details`, `get_status`) fail with
/// [`DriverError::NotFound`] on an unknown id. Mutations (`edit_driver_details`,
/// `set_verified`, `set_status`, `record_heartbeat`, `delete_driver`) succeed
/// without effect on an unknown id.
pub struct DriverManager<R: DriverRepository> {
    repo: Arc<R>,
}

impl<R: DriverRepository> DriverManager<R> {
    /// Create a new driver manager
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Check that the driver store is reachable
    pub async fn check_storage(&self) -> Result<(), DriverError> {
        Ok(self.repo.ping().await?)
    }

    // =========================================================================
    // Records
    // =========================================================================

    /// Persist a new driver record
    pub async fn create_driver(
        &self,
        details: DriverDetails,
    ) -> Result<DriverDetails, DriverError> {
        let row = self.repo.create(&details).await?;
        tracing::info!(driver_id = %details.id, "Driver created");
        Ok(row.into())
    }

    /// Get a driver by id
    pub async fn get_driver_details(&self, id: &DriverId) -> Result<DriverDetails, DriverError> {
        self.repo
            .find_by_id(id)
            .await?
            .map(Into::into)
            .ok_or(DriverError::NotFound)
    }

    /// List drivers by verification state
    pub async fn list_drivers(
        &self,
        filter: DriverFilter,
    ) -> Result<Vec<DriverDetails>, DriverError> {
        let rows = self.repo.list(filter).await?;
        tracing::debug!(%filter, count = rows.len(), "Listed drivers");
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Apply the non-zero fields of `details` to the stored record.
    ///
    /// Returns the supplied record as-is.
    pub async fn edit_driver_details(
        &self,
        details: DriverDetails,
    ) -> Result<DriverDetails, DriverError> {
        let touched = self.repo.update(&UpdateDriver::from_sparse(&details)).await?;
        if touched == 0 {
            tracing::debug!(driver_id = %details.id, "Edit matched no driver");
        }
        Ok(details)
    }

    /// Remove a driver record. Removing an unknown id succeeds.
    pub async fn delete_driver(&self, id: &DriverId) -> Result<(), DriverError> {
        self.repo.delete(id).await?;
        tracing::info!(driver_id = %id, "Driver deleted");
        Ok(())
    }

    // =========================================================================
    // Verification
    // =========================================================================

    /// Write the verified flag, plus any other non-zero fields of `details`.
    ///
    /// Unlike [`Self::edit_driver_details`] the flag is written even when
    /// false, so verification can be revoked.
    pub async fn set_verified(&self, details: DriverDetails) -> Result<DriverDetails, DriverError> {
        let update = UpdateDriver {
            verified: Some(details.verified),
            ..UpdateDriver::from_sparse(&details)
        };
        self.repo.update(&update).await?;
        tracing::info!(
            driver_id = %details.id,
            verified = details.verified,
            "Driver verification set"
        );
        Ok(details)
    }

    // =========================================================================
    // Status
    // =========================================================================

    /// Read only the status of a driver
    pub async fn get_status(&self, id: &DriverId) -> Result<StatusResult, DriverError> {
        self.repo
            .find_status(id)
            .await?
            .map(StatusResult::new)
            .ok_or(DriverError::NotFound)
    }

    /// Write only the status of a driver
    pub async fn set_status(
        &self,
        status: &str,
        id: &DriverId,
    ) -> Result<StatusResult, DriverError> {
        self.repo.update_status(id, status).await?;
        Ok(StatusResult::new(status))
    }

    // =========================================================================
    // Presence
    // =========================================================================

    /// Drivers with a heartbeat inside the presence window ending at `now`
    pub async fn list_recently_active_drivers(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<DriverDetails>, DriverError> {
        let rows = self.repo.list_seen_between(presence_cutoff(now), now).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Record a heartbeat at `now`
    pub async fn record_heartbeat(
        &self,
        id: &DriverId,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, DriverError> {
        self.repo.update_last_seen(id, now).await?;
        Ok(now)
    }

    // =========================================================================
    // History
    // =========================================================================

    /// Completed trips of a driver with their reviews, oldest first
    pub async fn get_trip_history(
        &self,
        id: &DriverId,
    ) -> Result<Vec<TripHistoryEntry>, DriverError> {
        Ok(self.repo.find_trip_history(id).await?)
    }
}

impl<R: DriverRepository> std::fmt::Debug for DriverManager<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverManager").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use ferry_db::memory::InMemoryDriverRepository;

    fn manager() -> (DriverManager<InMemoryDriverRepository>, Arc<InMemoryDriverRepository>) {
        let repo = Arc::new(InMemoryDriverRepository::new());
        (DriverManager::new(Arc::clone(&repo)), repo)
    }

    #[tokio::test]
    async fn test_set_verified_can_revoke() {
        let (drivers, _) = manager();
        drivers
            .create_driver(DriverDetails {
                verified: true,
                ..DriverDetails::new("d1")
            })
            .await
            .unwrap();

        drivers
            .set_verified(DriverDetails {
                verified: false,
                ..DriverDetails::new("d1")
            })
            .await
            .unwrap();

        let stored = drivers.get_driver_details(&"d1".into()).await.unwrap();
        assert!(!stored.verified);
    }

    #[tokio::test]
    async fn test_edit_cannot_clear_verified() {
        let (drivers, _) = manager();
        drivers
            .create_driver(DriverDetails {
                verified: true,
                ..DriverDetails::new("d1")
            })
            .await
            .unwrap();

        drivers
            .edit_driver_details(DriverDetails {
                name: "Bob".to_string(),
                ..DriverDetails::new("d1")
            })
            .await
            .unwrap();

        let stored = drivers.get_driver_details(&"d1".into()).await.unwrap();
        assert!(stored.verified);
        assert_eq!(stored.name, "Bob");
    }

    #[tokio::test]
    async fn test_heartbeat_returns_recorded_time() {
        let (drivers, _) = manager();
        drivers.create_driver(DriverDetails::new("d1")).await.unwrap();

        let now = Utc::now();
        let seen = drivers.record_heartbeat(&"d1".into(), now).await.unwrap();
        assert_eq!(seen, now);

        let stored = drivers.get_driver_details(&"d1".into()).await.unwrap();
        assert_eq!(stored.last_seen, Some(now));
    }

    #[tokio::test]
    async fn test_never_seen_driver_is_not_active() {
        let (drivers, _) = manager();
        drivers.create_driver(DriverDetails::new("d1")).await.unwrap();

        let active = drivers
            .list_recently_active_drivers(Utc::now() + Duration::seconds(1))
            .await
            .unwrap();
        assert!(active.is_empty());
    }

    #[tokio::test]
    async fn test_check_storage_follows_availability() {
        let (drivers, repo) = manager();
        assert!(drivers.check_storage().await.is_ok());

        repo.set_unavailable(true);
        assert!(matches!(
            drivers.check_storage().await,
            Err(DriverError::Storage(_))
        ));
    }

    #[tokio::test]
    async fn test_storage_failure_is_classified() {
        let (drivers, repo) = manager();
        repo.set_unavailable(true);

        let err = drivers.get_driver_details(&"d1".into()).await.unwrap_err();
        assert!(matches!(err, DriverError::Storage(_)));
    }
}
