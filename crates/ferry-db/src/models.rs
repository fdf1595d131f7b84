//! Database row models
//!
//! These types map directly to database rows using SQLx's FromRow derive.

use chrono::{DateTime, Utc};
use ferry_types::{DriverDetails, DriverId};
use sqlx::FromRow;

/// Driver details row from the database
#[derive(Debug, Clone, FromRow)]
pub struct DriverRow {
    pub id: String,
    pub name: String,
    pub phone_number: String,
    pub route_id: Option<i64>,
    pub license_number: String,
    pub sim: String,
    pub status: String,
    pub verified: bool,
    pub available_seats: i32,
    pub profile_picture: String,
    pub last_seen: Option<DateTime<Utc>>,
}

impl From<DriverRow> for DriverDetails {
    fn from(row: DriverRow) -> Self {
        Self {
            id: DriverId(row.id),
            name: row.name,
            phone_number: row.phone_number,
            route_id: row.route_id,
            license_number: row.license_number,
            sim: row.sim,
            status: row.status,
            verified: row.verified,
            // The column carries a CHECK (available_seats >= 0)
            available_seats: u32::try_from(row.available_seats).unwrap_or_default(),
            profile_picture: row.profile_picture,
            last_seen: row.last_seen,
        }
    }
}
