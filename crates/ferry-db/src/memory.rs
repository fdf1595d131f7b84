//! In-memory repository for tests
//!
//! Mirrors the PostgreSQL repository's observable behaviour closely enough
//! for service-level tests: insertion-ordered listing, duplicate id
//! rejection, no-op updates on unknown ids.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use ferry_types::{DriverDetails, DriverFilter, DriverId, TripHistoryEntry};

use crate::error::{DbError, DbResult};
use crate::models::DriverRow;
use crate::repo::{DriverRepository, UpdateDriver};

#[derive(Debug, Clone)]
struct StoredDriver {
    seq: u64,
    details: DriverDetails,
}

/// In-memory driver repository
#[derive(Default, Clone)]
pub struct InMemoryDriverRepository {
    drivers: Arc<DashMap<DriverId, StoredDriver>>,
    /// Trips keyed by driver, each tagged with an insertion sequence
    trips: Arc<DashMap<DriverId, Vec<(u64, TripHistoryEntry)>>>,
    next_seq: Arc<AtomicU64>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryDriverRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a completed, reviewed trip for a driver
    pub fn insert_trip(&self, driver_id: &DriverId, entry: TripHistoryEntry) {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        self.trips
            .entry(driver_id.clone())
            .or_default()
            .push((seq, entry));
    }

    /// Make every call fail as if the database were unreachable
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of stored drivers
    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }

    fn check_available(&self) -> DbResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DbError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    fn sorted_rows(&self, keep: impl Fn(&DriverDetails) -> bool) -> Vec<(u64, DriverRow)> {
        let mut rows: Vec<(u64, DriverRow)> = self
            .drivers
            .iter()
            .filter(|entry| keep(&entry.value().details))
            .map(|entry| (entry.value().seq, to_row(&entry.value().details)))
            .collect();
        rows.sort_by_key(|(seq, _)| *seq);
        rows
    }
}

fn to_row(details: &DriverDetails) -> DriverRow {
    DriverRow {
        id: details.id.0.clone(),
        name: details.name.clone(),
        phone_number: details.phone_number.clone(),
        route_id: details.route_id,
        license_number: details.license_number.clone(),
        sim: details.sim.clone(),
        status: details.status.clone(),
        verified: details.verified,
        available_seats: i32::try_from(details.available_seats).unwrap_or(i32::MAX),
        profile_picture: details.profile_picture.clone(),
        last_seen: details.last_seen,
    }
}

#[async_trait]
impl DriverRepository for InMemoryDriverRepository {
    async fn ping(&self) -> DbResult<()> {
        self.check_available()
    }

    async fn find_by_id(&self, id: &DriverId) -> DbResult<Option<DriverRow>> {
        self.check_available()?;
        Ok(self.drivers.get(id).map(|r| to_row(&r.value().details)))
    }

    async fn list(&self, filter: DriverFilter) -> DbResult<Vec<DriverRow>> {
        self.check_available()?;
        Ok(self
            .sorted_rows(|d| filter.matches(d.verified))
            .into_iter()
            .map(|(_, row)| row)
            .collect())
    }

    async fn list_seen_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<DriverRow>> {
        self.check_available()?;
        let mut rows: Vec<DriverRow> = self
            .sorted_rows(|d| d.last_seen.is_some_and(|seen| seen >= from && seen <= to))
            .into_iter()
            .map(|(_, row)| row)
            .collect();
        rows.sort_by(|a, b| b.last_seen.cmp(&a.last_seen).then_with(|| a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn create(&self, driver: &DriverDetails) -> DbResult<DriverRow> {
        self.check_available()?;
        if i32::try_from(driver.available_seats).is_err() {
            return Err(DbError::OutOfRange("available_seats"));
        }

        match self.drivers.entry(driver.id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(DbError::Sqlx(
                sqlx::Error::Protocol(format!(
                    "duplicate key value violates unique constraint \"driver_details_pkey\" ({})",
                    driver.id
                )),
            )),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
                slot.insert(StoredDriver {
                    seq,
                    details: driver.clone(),
                });
                Ok(to_row(driver))
            }
        }
    }

    async fn update(&self, update: &UpdateDriver) -> DbResult<u64> {
        self.check_available()?;
        if update.is_empty() {
            return Ok(0);
        }
        match self.drivers.get_mut(&update.id) {
            Some(mut stored) => {
                update.apply_to(&mut stored.details);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn find_status(&self, id: &DriverId) -> DbResult<Option<String>> {
        self.check_available()?;
        Ok(self.drivers.get(id).map(|r| r.value().details.status.clone()))
    }

    async fn update_status(&self, id: &DriverId, status: &str) -> DbResult<()> {
        self.check_available()?;
        if let Some(mut stored) = self.drivers.get_mut(id) {
            stored.details.status = status.to_string();
        }
        Ok(())
    }

    async fn update_last_seen(&self, id: &DriverId, seen_at: DateTime<Utc>) -> DbResult<()> {
        self.check_available()?;
        if let Some(mut stored) = self.drivers.get_mut(id) {
            stored.details.last_seen = Some(seen_at);
        }
        Ok(())
    }

    async fn delete(&self, id: &DriverId) -> DbResult<()> {
        self.check_available()?;
        self.drivers.remove(id);
        self.trips.remove(id);
        Ok(())
    }

    async fn find_trip_history(&self, id: &DriverId) -> DbResult<Vec<TripHistoryEntry>> {
        self.check_available()?;
        let mut entries = self
            .trips
            .get(id)
            .map(|r| r.value().clone())
            .unwrap_or_default();
        // Same order as the trips table: date, then trip id
        entries.sort_by_key(|(seq, entry)| (entry.trip_date, *seq));
        Ok(entries.into_iter().map(|(_, entry)| entry).collect())
    }
}
