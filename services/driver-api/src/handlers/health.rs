//! Liveness and readiness probes

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use ferry_db::DriverRepository;
use ferry_driver_core::DriverManager;
use serde::Serialize;

use crate::state::AppState;

const SERVICE_NAME: &str = "driver-api";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub service: &'static str,
    pub version: &'static str,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub service: &'static str,
    pub storage: &'static str,
}

/// Liveness: the process is up, storage is not consulted
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        status: "alive",
    })
}

/// Readiness: the driver store answers
pub async fn ready(State(state): State<AppState>) -> Result<Json<ReadyResponse>, StatusCode> {
    readiness(state.drivers.as_ref()).await.map(Json)
}

async fn readiness<R: DriverRepository>(
    drivers: &DriverManager<R>,
) -> Result<ReadyResponse, StatusCode> {
    // The storage error itself is logged when it is classified
    drivers
        .check_storage()
        .await
        .map_err(|_| StatusCode::SERVICE_UNAVAILABLE)?;

    Ok(ReadyResponse {
        service: SERVICE_NAME,
        storage: "reachable",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferry_db::memory::InMemoryDriverRepository;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_health_names_the_service() {
        let Json(body) = health().await;
        assert_eq!(body.service, "driver-api");
        assert_eq!(body.status, "alive");
    }

    #[tokio::test]
    async fn test_ready_when_store_answers() {
        let drivers = DriverManager::new(Arc::new(InMemoryDriverRepository::new()));
        let body = readiness(&drivers).await.unwrap();
        assert_eq!(body.storage, "reachable");
    }

    #[tokio::test]
    async fn test_not_ready_when_store_is_down() {
        let repo = Arc::new(InMemoryDriverRepository::new());
        repo.set_unavailable(true);
        let drivers = DriverManager::new(Arc::clone(&repo));

        let status = readiness(&drivers).await.unwrap_err();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
