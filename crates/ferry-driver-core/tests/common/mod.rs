//! Common test utilities for ferry-driver-core integration tests

use std::sync::Arc;

use ferry_db::memory::InMemoryDriverRepository;
use ferry_driver_core::DriverManager;
use ferry_types::DriverDetails;

/// Manager over a fresh in-memory repository, plus the repository itself
#[allow(dead_code)]
pub fn test_manager() -> (
    DriverManager<InMemoryDriverRepository>,
    Arc<InMemoryDriverRepository>,
) {
    let repo = Arc::new(InMemoryDriverRepository::new());
    (DriverManager::new(Arc::clone(&repo)), repo)
}

/// A fully populated driver record
#[allow(dead_code)]
pub fn test_driver(id: &str) -> DriverDetails {
    DriverDetails {
        name: format!("Driver {id}"),
        phone_number: "+62-812-0000-0000".to_string(),
        route_id: Some(7),
        license_number: format!("LIC-{id}"),
        sim: format!("SIM-{id}"),
        status: "available".to_string(),
        verified: false,
        available_seats: 4,
        profile_picture: format!("https://cdn.example.com/drivers/{id}.jpg"),
        ..DriverDetails::new(id)
    }
}
