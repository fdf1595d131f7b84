//! PostgreSQL driver repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ferry_types::{DriverDetails, DriverFilter, DriverId, TripHistoryEntry};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

use crate::error::{DbError, DbResult};
use crate::models::DriverRow;
use crate::repo::{DriverRepository, UpdateDriver};

const DRIVER_COLUMNS: &str = "id, name, phone_number, route_id, license_number, sim, status, \
     verified, available_seats, profile_picture, last_seen";

/// PostgreSQL driver repository
#[derive(Clone)]
pub struct PgDriverRepository {
    pool: PgPool,
}

impl PgDriverRepository {
    /// Create a new driver repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the driver tables and the tables joined by trip history.
    ///
    /// Idempotent. Accounts, routes, reviews and trips are owned by other
    /// services; this only guarantees they exist for local setups.
    pub async fn init_schema(&self) -> DbResult<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS accounts (
                id VARCHAR(36) PRIMARY KEY,
                email VARCHAR(255) NOT NULL UNIQUE,
                password TEXT NOT NULL,
                role TEXT NOT NULL CHECK (role IN ('admin', 'user', 'driver')),
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS routes (
                id BIGSERIAL PRIMARY KEY,
                route_name VARCHAR(255) NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS driver_details (
                id VARCHAR(36) PRIMARY KEY REFERENCES accounts(id) ON DELETE CASCADE,
                name VARCHAR(255) NOT NULL DEFAULT '',
                phone_number VARCHAR(255) NOT NULL DEFAULT '',
                route_id BIGINT REFERENCES routes(id),
                license_number VARCHAR(255) NOT NULL DEFAULT '',
                sim VARCHAR(255) NOT NULL DEFAULT '',
                status VARCHAR(255) NOT NULL DEFAULT '',
                verified BOOLEAN NOT NULL DEFAULT false,
                available_seats INTEGER NOT NULL DEFAULT 0 CHECK (available_seats >= 0),
                profile_picture TEXT NOT NULL DEFAULT '',
                last_seen TIMESTAMPTZ,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_driver_details_last_seen ON driver_details(last_seen)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS reviews (
                id BIGSERIAL PRIMARY KEY,
                user_id VARCHAR(36) NOT NULL,
                driver_id VARCHAR(36) NOT NULL REFERENCES driver_details(id) ON DELETE CASCADE,
                comment VARCHAR(255) NOT NULL DEFAULT '',
                star INTEGER NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS trips (
                id BIGSERIAL PRIMARY KEY,
                driver_id VARCHAR(36) NOT NULL,
                location VARCHAR(255) NOT NULL,
                destination VARCHAR(255) NOT NULL,
                trip_date TIMESTAMPTZ NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_trips_driver_id ON trips(driver_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

fn seats_to_column(seats: u32) -> DbResult<i32> {
    i32::try_from(seats).map_err(|_| DbError::OutOfRange("available_seats"))
}

/// `UPDATE` touching only the supplied columns, `None` when nothing is supplied
fn build_update(update: &UpdateDriver) -> DbResult<Option<QueryBuilder<'static, Postgres>>> {
    if update.is_empty() {
        return Ok(None);
    }

    let mut builder = QueryBuilder::<Postgres>::new("UPDATE driver_details SET ");
    let mut columns = builder.separated(", ");

    if let Some(name) = &update.name {
        columns.push("name = ").push_bind_unseparated(name.clone());
    }
    if let Some(phone_number) = &update.phone_number {
        columns
            .push("phone_number = ")
            .push_bind_unseparated(phone_number.clone());
    }
    if let Some(route_id) = update.route_id {
        columns.push("route_id = ").push_bind_unseparated(route_id);
    }
    if let Some(license_number) = &update.license_number {
        columns
            .push("license_number = ")
            .push_bind_unseparated(license_number.clone());
    }
    if let Some(sim) = &update.sim {
        columns.push("sim = ").push_bind_unseparated(sim.clone());
    }
    if let Some(status) = &update.status {
        columns.push("status = ").push_bind_unseparated(status.clone());
    }
    if let Some(verified) = update.verified {
        columns.push("verified = ").push_bind_unseparated(verified);
    }
    if let Some(seats) = update.available_seats {
        columns
            .push("available_seats = ")
            .push_bind_unseparated(seats_to_column(seats)?);
    }
    if let Some(profile_picture) = &update.profile_picture {
        columns
            .push("profile_picture = ")
            .push_bind_unseparated(profile_picture.clone());
    }

    builder
        .push(" WHERE id = ")
        .push_bind(update.id.as_str().to_string());

    Ok(Some(builder))
}

fn decode_trip_row(row: &PgRow) -> Result<TripHistoryEntry, sqlx::Error> {
    Ok(TripHistoryEntry {
        location: row.try_get("location")?,
        destination: row.try_get("destination")?,
        trip_date: row.try_get("trip_date")?,
        review: row.try_get("review")?,
        star: i64::from(row.try_get::<i32, _>("star")?),
    })
}

#[async_trait]
impl DriverRepository for PgDriverRepository {
    async fn ping(&self) -> DbResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &DriverId) -> DbResult<Option<DriverRow>> {
        let driver = sqlx::query_as::<_, DriverRow>(&format!(
            "SELECT {DRIVER_COLUMNS} FROM driver_details WHERE id = $1"
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(driver)
    }

    async fn list(&self, filter: DriverFilter) -> DbResult<Vec<DriverRow>> {
        let drivers = match filter.verified() {
            Some(verified) => {
                sqlx::query_as::<_, DriverRow>(&format!(
                    "SELECT {DRIVER_COLUMNS} FROM driver_details
                     WHERE verified = $1
                     ORDER BY created_at, id"
                ))
                .bind(verified)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, DriverRow>(&format!(
                    "SELECT {DRIVER_COLUMNS} FROM driver_details ORDER BY created_at, id"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(drivers)
    }

    async fn list_seen_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<DriverRow>> {
        let drivers = sqlx::query_as::<_, DriverRow>(&format!(
            "SELECT {DRIVER_COLUMNS} FROM driver_details
             WHERE last_seen >= $1 AND last_seen <= $2
             ORDER BY last_seen DESC, id"
        ))
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(drivers)
    }

    async fn create(&self, driver: &DriverDetails) -> DbResult<DriverRow> {
        let row = sqlx::query_as::<_, DriverRow>(&format!(
            "INSERT INTO driver_details (id, name, phone_number, route_id, license_number,
                                         sim, status, verified, available_seats,
                                         profile_picture, last_seen)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {DRIVER_COLUMNS}"
        ))
        .bind(driver.id.as_str())
        .bind(&driver.name)
        .bind(&driver.phone_number)
        .bind(driver.route_id)
        .bind(&driver.license_number)
        .bind(&driver.sim)
        .bind(&driver.status)
        .bind(driver.verified)
        .bind(seats_to_column(driver.available_seats)?)
        .bind(&driver.profile_picture)
        .bind(driver.last_seen)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update(&self, update: &UpdateDriver) -> DbResult<u64> {
        let Some(mut builder) = build_update(update)? else {
            return Ok(0);
        };

        let result = builder.build().execute(&self.pool).await?;

        Ok(result.rows_affected())
    }

    async fn find_status(&self, id: &DriverId) -> DbResult<Option<String>> {
        let status: Option<String> =
            sqlx::query_scalar("SELECT status FROM driver_details WHERE id = $1")
                .bind(id.as_str())
                .fetch_optional(&self.pool)
                .await?;

        Ok(status)
    }

    async fn update_status(&self, id: &DriverId, status: &str) -> DbResult<()> {
        sqlx::query("UPDATE driver_details SET status = $1 WHERE id = $2")
            .bind(status)
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn update_last_seen(&self, id: &DriverId, seen_at: DateTime<Utc>) -> DbResult<()> {
        sqlx::query("UPDATE driver_details SET last_seen = $1 WHERE id = $2")
            .bind(seen_at)
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete(&self, id: &DriverId) -> DbResult<()> {
        sqlx::query("DELETE FROM driver_details WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn find_trip_history(&self, id: &DriverId) -> DbResult<Vec<TripHistoryEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT trips.location, trips.destination, trips.trip_date,
                   reviews.comment AS review, reviews.star
            FROM trips
            JOIN reviews ON trips.id = reviews.id
            WHERE trips.driver_id = $1
            ORDER BY trips.trip_date, trips.id
            "#,
        )
        .bind(id.as_str())
        .fetch_all(&self.pool)
        .await?;

        // A row that fails to decode is dropped rather than failing the whole history
        let entries = rows
            .iter()
            .filter_map(|row| match decode_trip_row(row) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!(driver_id = %id, error = %e, "Skipping undecodable trip row");
                    None
                }
            })
            .collect();

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sql_for(update: &UpdateDriver) -> Option<String> {
        build_update(update)
            .unwrap()
            .map(|builder| builder.sql().to_string())
    }

    #[test]
    fn test_update_sets_only_supplied_columns() {
        let update = UpdateDriver {
            id: DriverId::from("d1"),
            status: Some("busy".to_string()),
            available_seats: Some(3),
            ..Default::default()
        };

        assert_eq!(
            sql_for(&update).as_deref(),
            Some("UPDATE driver_details SET status = $1, available_seats = $2 WHERE id = $3")
        );
    }

    #[test]
    fn test_verified_false_is_written_when_supplied() {
        let update = UpdateDriver {
            id: DriverId::from("d1"),
            verified: Some(false),
            ..Default::default()
        };

        assert_eq!(
            sql_for(&update).as_deref(),
            Some("UPDATE driver_details SET verified = $1 WHERE id = $2")
        );
    }

    #[test]
    fn test_empty_update_builds_no_statement() {
        let update = UpdateDriver {
            id: DriverId::from("d1"),
            ..Default::default()
        };

        assert_eq!(sql_for(&update), None);
    }

    #[test]
    fn test_seats_beyond_column_range_are_rejected() {
        let update = UpdateDriver {
            id: DriverId::from("d1"),
            available_seats: Some(u32::MAX),
            ..Default::default()
        };

        assert!(matches!(
            build_update(&update),
            Err(DbError::OutOfRange("available_seats"))
        ));
    }
}
