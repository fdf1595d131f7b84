//! Driver lifecycle tests
//!
//! Exercise the manager against the in-memory repository:
//! - Create/read roundtrip and not-found lookups
//! - Status isolation and verification gate
//! - Presence window and trip history
//! - Mutation-on-missing-id success

mod common;

use chrono::{Duration, TimeZone, Utc};
use common::{test_driver, test_manager};
use ferry_driver_core::DriverError;
use ferry_types::{DriverDetails, DriverFilter, DriverId, TripHistoryEntry};

// ============================================================================
// Records
// ============================================================================

#[tokio::test]
async fn test_create_then_get_returns_same_record() {
    let (drivers, _) = test_manager();
    let driver = test_driver("d1");

    let created = drivers.create_driver(driver.clone()).await.unwrap();
    assert_eq!(created, driver);

    let fetched = drivers.get_driver_details(&driver.id).await.unwrap();
    assert_eq!(fetched, driver);
}

#[tokio::test]
async fn test_get_unknown_driver_is_not_found() {
    let (drivers, _) = test_manager();

    let err = drivers
        .get_driver_details(&DriverId::from("missing"))
        .await
        .unwrap_err();
    assert!(matches!(err, DriverError::NotFound));
}

#[tokio::test]
async fn test_duplicate_create_is_storage_failure() {
    let (drivers, _) = test_manager();
    drivers.create_driver(test_driver("d1")).await.unwrap();

    let err = drivers.create_driver(test_driver("d1")).await.unwrap_err();
    assert!(matches!(err, DriverError::Storage(_)));
}

#[tokio::test]
async fn test_edit_applies_only_supplied_fields() {
    let (drivers, _) = test_manager();
    drivers.create_driver(test_driver("d1")).await.unwrap();

    drivers
        .edit_driver_details(DriverDetails {
            phone_number: "+62-811-1111-1111".to_string(),
            available_seats: 6,
            ..DriverDetails::new("d1")
        })
        .await
        .unwrap();

    let stored = drivers.get_driver_details(&"d1".into()).await.unwrap();
    assert_eq!(stored.phone_number, "+62-811-1111-1111");
    assert_eq!(stored.available_seats, 6);
    assert_eq!(stored.name, "Driver d1");
    assert_eq!(stored.license_number, "LIC-d1");
    assert_eq!(stored.route_id, Some(7));
}

#[tokio::test]
async fn test_edit_unknown_driver_succeeds_without_effect() {
    let (drivers, repo) = test_manager();

    let edited = drivers
        .edit_driver_details(DriverDetails {
            name: "Ghost".to_string(),
            ..DriverDetails::new("ghost")
        })
        .await
        .unwrap();

    assert_eq!(edited.name, "Ghost");
    assert!(repo.is_empty());
}

#[tokio::test]
async fn test_delete_twice_succeeds() {
    let (drivers, _) = test_manager();
    drivers.create_driver(test_driver("d1")).await.unwrap();

    drivers.delete_driver(&"d1".into()).await.unwrap();
    drivers.delete_driver(&"d1".into()).await.unwrap();

    let err = drivers.get_driver_details(&"d1".into()).await.unwrap_err();
    assert!(matches!(err, DriverError::NotFound));
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_list_filters_by_verification() {
    let (drivers, _) = test_manager();
    for (id, verified) in [("d1", true), ("d2", false), ("d3", true)] {
        drivers
            .create_driver(DriverDetails {
                verified,
                ..test_driver(id)
            })
            .await
            .unwrap();
    }

    let verified = drivers.list_drivers(DriverFilter::Verified).await.unwrap();
    let unverified = drivers.list_drivers(DriverFilter::Unverified).await.unwrap();
    let all = drivers.list_drivers(DriverFilter::All).await.unwrap();

    let ids = |list: &[DriverDetails]| list.iter().map(|d| d.id.0.clone()).collect::<Vec<_>>();
    assert_eq!(ids(&verified), vec!["d1", "d3"]);
    assert_eq!(ids(&unverified), vec!["d2"]);
    assert_eq!(ids(&all), vec!["d1", "d2", "d3"]);
}

#[tokio::test]
async fn test_list_empty_store_is_empty_not_error() {
    let (drivers, _) = test_manager();

    assert!(drivers.list_drivers(DriverFilter::All).await.unwrap().is_empty());
}

// ============================================================================
// Status & Verification
// ============================================================================

#[tokio::test]
async fn test_set_status_leaves_other_fields() {
    let (drivers, _) = test_manager();
    let driver = test_driver("d1");
    drivers.create_driver(driver.clone()).await.unwrap();

    let result = drivers.set_status("busy", &driver.id).await.unwrap();
    assert_eq!(result.status, "busy");
    assert_eq!(drivers.get_status(&driver.id).await.unwrap().status, "busy");

    let stored = drivers.get_driver_details(&driver.id).await.unwrap();
    assert_eq!(
        stored,
        DriverDetails {
            status: "busy".to_string(),
            ..driver
        }
    );
}

#[tokio::test]
async fn test_set_status_unknown_driver_succeeds() {
    let (drivers, _) = test_manager();

    let result = drivers.set_status("busy", &"ghost".into()).await.unwrap();
    assert_eq!(result.status, "busy");
}

#[tokio::test]
async fn test_get_status_unknown_driver_is_not_found() {
    let (drivers, _) = test_manager();

    let err = drivers.get_status(&"ghost".into()).await.unwrap_err();
    assert!(matches!(err, DriverError::NotFound));
}

#[tokio::test]
async fn test_set_verified_preserves_seats() {
    let (drivers, _) = test_manager();
    drivers
        .create_driver(DriverDetails {
            name: "Alice".to_string(),
            available_seats: 4,
            verified: false,
            ..DriverDetails::new("d1")
        })
        .await
        .unwrap();

    drivers
        .set_verified(DriverDetails {
            verified: true,
            ..DriverDetails::new("d1")
        })
        .await
        .unwrap();

    let stored = drivers.get_driver_details(&"d1".into()).await.unwrap();
    assert!(stored.verified);
    assert_eq!(stored.available_seats, 4);
    assert_eq!(stored.name, "Alice");
}

// ============================================================================
// Presence
// ============================================================================

#[tokio::test]
async fn test_recent_heartbeat_is_active_and_stale_is_not() {
    let (drivers, _) = test_manager();
    drivers.create_driver(test_driver("fresh")).await.unwrap();
    drivers.create_driver(test_driver("stale")).await.unwrap();

    let now = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
    drivers
        .record_heartbeat(&"fresh".into(), now - Duration::minutes(2))
        .await
        .unwrap();
    drivers
        .record_heartbeat(&"stale".into(), now - Duration::minutes(6))
        .await
        .unwrap();

    let active = drivers.list_recently_active_drivers(now).await.unwrap();
    let ids: Vec<_> = active.iter().map(|d| d.id.0.as_str()).collect();
    assert_eq!(ids, vec!["fresh"]);
}

#[tokio::test]
async fn test_heartbeat_after_now_is_not_active() {
    let (drivers, _) = test_manager();
    drivers.create_driver(test_driver("on-time")).await.unwrap();
    drivers.create_driver(test_driver("late")).await.unwrap();

    let now = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
    drivers.record_heartbeat(&"on-time".into(), now).await.unwrap();
    drivers
        .record_heartbeat(&"late".into(), now + Duration::hours(1))
        .await
        .unwrap();

    let active = drivers.list_recently_active_drivers(now).await.unwrap();
    let ids: Vec<_> = active.iter().map(|d| d.id.0.as_str()).collect();
    assert_eq!(ids, vec!["on-time"]);
}

#[tokio::test]
async fn test_heartbeat_unknown_driver_succeeds() {
    let (drivers, repo) = test_manager();

    drivers
        .record_heartbeat(&"ghost".into(), Utc::now())
        .await
        .unwrap();
    assert!(repo.is_empty());
}

// ============================================================================
// Trip History
// ============================================================================

#[tokio::test]
async fn test_trip_history_empty_for_driver_without_trips() {
    let (drivers, _) = test_manager();
    drivers.create_driver(test_driver("d1")).await.unwrap();

    let history = drivers.get_trip_history(&"d1".into()).await.unwrap();
    assert!(history.is_empty());
}

#[tokio::test]
async fn test_trip_history_is_oldest_first() {
    let (drivers, repo) = test_manager();
    let id = DriverId::from("d1");
    drivers.create_driver(test_driver("d1")).await.unwrap();

    let later = TripHistoryEntry {
        location: "Terminal Kampung Rambutan".to_string(),
        destination: "Pasar Minggu".to_string(),
        trip_date: Utc.with_ymd_and_hms(2026, 2, 2, 9, 0, 0).unwrap(),
        review: "Smooth ride".to_string(),
        star: 5,
    };
    let earlier = TripHistoryEntry {
        location: "Depok".to_string(),
        destination: "Lenteng Agung".to_string(),
        trip_date: Utc.with_ymd_and_hms(2026, 2, 1, 17, 30, 0).unwrap(),
        review: "Late pickup".to_string(),
        star: 3,
    };
    repo.insert_trip(&id, later.clone());
    repo.insert_trip(&id, earlier.clone());
    repo.insert_trip(
        &DriverId::from("d2"),
        TripHistoryEntry {
            star: 1,
            ..earlier.clone()
        },
    );

    let history = drivers.get_trip_history(&id).await.unwrap();
    assert_eq!(history, vec![earlier, later]);
}
