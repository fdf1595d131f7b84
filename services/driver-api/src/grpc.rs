//! gRPC DriverService implementation
//!
//! Thin adapter over [`DriverManager`]: validates request ids, converts
//! between wire and domain records, maps errors to status codes and records
//! per-method latency.

use chrono::{DateTime, Utc};
use ferry_db::DriverRepository;
use ferry_driver_core::DriverManager;
use ferry_proto::driver_service::driver_service_server::DriverService as DriverServiceTrait;
use ferry_proto::{
    health_check_response::ServingStatus, CreateDriverRequest, DeleteDriverResponse, Driver,
    DriverByIdRequest, Drivers, EditDriverRequest, GetActiveDriversRequest, GetDriversRequest,
    HealthCheckRequest, HealthCheckResponse, HeartbeatResponse, SetStatusRequest, StatusResponse,
    TripHistory, TripHistoryEntry as ProtoTripEntry,
};
use ferry_types::{DriverDetails, DriverFilter, DriverId, TripHistoryEntry};
use std::sync::Arc;
use std::time::Instant;
use tonic::{Request, Response, Status};
use tracing::instrument;

use crate::error::driver_error_to_status;

/// gRPC driver service implementation
pub struct GrpcDriverService<R: DriverRepository> {
    drivers: Arc<DriverManager<R>>,
}

impl<R: DriverRepository> GrpcDriverService<R> {
    pub fn new(drivers: Arc<DriverManager<R>>) -> Self {
        Self { drivers }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

#[allow(clippy::result_large_err)]
fn parse_driver_id(id: &str) -> Result<DriverId, Status> {
    DriverId::parse(id).map_err(|_| Status::invalid_argument("Driver id cannot be empty"))
}

#[allow(clippy::result_large_err)]
fn seats_from_proto(seats: i32) -> Result<u32, Status> {
    u32::try_from(seats)
        .map_err(|_| Status::invalid_argument("available_seats cannot be negative"))
}

fn timestamp_to_proto(at: DateTime<Utc>) -> prost_types::Timestamp {
    prost_types::Timestamp {
        seconds: at.timestamp(),
        nanos: i32::try_from(at.timestamp_subsec_nanos()).unwrap_or(0),
    }
}

fn driver_to_proto(driver: DriverDetails) -> Driver {
    Driver {
        id: driver.id.0,
        name: driver.name,
        phone_number: driver.phone_number,
        route_id: driver.route_id,
        license_number: driver.license_number,
        sim: driver.sim,
        status: driver.status,
        verified: driver.verified,
        available_seats: i32::try_from(driver.available_seats).unwrap_or(i32::MAX),
        profile_picture: driver.profile_picture,
        last_seen: driver.last_seen.map(timestamp_to_proto),
    }
}

fn drivers_to_proto(drivers: Vec<DriverDetails>) -> Drivers {
    Drivers {
        drivers: drivers.into_iter().map(driver_to_proto).collect(),
    }
}

fn trip_to_proto(entry: TripHistoryEntry) -> ProtoTripEntry {
    ProtoTripEntry {
        location: entry.location,
        destination: entry.destination,
        trip_date: Some(timestamp_to_proto(entry.trip_date)),
        review: entry.review,
        star: entry.star,
    }
}

#[allow(clippy::result_large_err)]
fn create_request_to_details(req: CreateDriverRequest) -> Result<DriverDetails, Status> {
    Ok(DriverDetails {
        id: parse_driver_id(&req.id)?,
        name: req.name,
        phone_number: req.phone_number,
        route_id: req.route_id,
        license_number: req.license_number,
        sim: req.sim,
        status: req.status,
        verified: req.verified,
        available_seats: seats_from_proto(req.available_seats)?,
        profile_picture: req.profile_picture,
        last_seen: None,
    })
}

#[allow(clippy::result_large_err)]
fn edit_request_to_details(req: EditDriverRequest) -> Result<DriverDetails, Status> {
    Ok(DriverDetails {
        id: parse_driver_id(&req.id)?,
        name: req.name,
        phone_number: req.phone_number,
        route_id: req.route_id,
        license_number: req.license_number,
        sim: req.sim,
        status: req.status,
        verified: false,
        available_seats: seats_from_proto(req.available_seats)?,
        profile_picture: req.profile_picture,
        last_seen: None,
    })
}

/// Record gRPC request duration with result label
#[inline]
fn record_grpc_duration(method: &'static str, start: Instant, success: bool) {
    let result = if success { "ok" } else { "err" };
    metrics::histogram!(
        "grpc_request_duration_seconds",
        "method" => method,
        "result" => result
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record the duration of a finished call and map its error
#[allow(clippy::result_large_err)]
fn finish<T>(
    method: &'static str,
    start: Instant,
    result: Result<T, ferry_driver_core::DriverError>,
) -> Result<T, Status> {
    record_grpc_duration(method, start, result.is_ok());
    result.map_err(driver_error_to_status)
}

// ============================================================================
// gRPC Service Implementation
// ============================================================================

#[tonic::async_trait]
impl<R: DriverRepository + 'static> DriverServiceTrait for GrpcDriverService<R> {
    // -------------------------------------------------------------------------
    // Records
    // -------------------------------------------------------------------------

    #[instrument(skip(self, request), fields(driver_id))]
    async fn create_driver(
        &self,
        request: Request<CreateDriverRequest>,
    ) -> Result<Response<Driver>, Status> {
        let start = Instant::now();
        let details = create_request_to_details(request.into_inner())?;
        tracing::Span::current().record("driver_id", details.id.as_str());

        let created = finish(
            "create_driver",
            start,
            self.drivers.create_driver(details).await,
        )?;

        Ok(Response::new(driver_to_proto(created)))
    }

    #[instrument(skip(self, request), fields(verified))]
    async fn get_drivers(
        &self,
        request: Request<GetDriversRequest>,
    ) -> Result<Response<Drivers>, Status> {
        let start = Instant::now();
        let filter = DriverFilter::from_verified(request.into_inner().verified);
        tracing::Span::current().record("verified", tracing::field::display(filter));

        let drivers = finish("get_drivers", start, self.drivers.list_drivers(filter).await)?;

        Ok(Response::new(drivers_to_proto(drivers)))
    }

    #[instrument(skip(self, request), fields(driver_id))]
    async fn get_driver_details(
        &self,
        request: Request<DriverByIdRequest>,
    ) -> Result<Response<Driver>, Status> {
        let start = Instant::now();
        let id = parse_driver_id(&request.into_inner().id)?;
        tracing::Span::current().record("driver_id", id.as_str());

        let driver = finish(
            "get_driver_details",
            start,
            self.drivers.get_driver_details(&id).await,
        )?;

        Ok(Response::new(driver_to_proto(driver)))
    }

    /// Mark a driver verified and return the stored record
    #[instrument(skip(self, request), fields(driver_id))]
    async fn set_status_verified(
        &self,
        request: Request<DriverByIdRequest>,
    ) -> Result<Response<Driver>, Status> {
        let start = Instant::now();
        let id = parse_driver_id(&request.into_inner().id)?;
        tracing::Span::current().record("driver_id", id.as_str());

        let result = async {
            self.drivers
                .set_verified(DriverDetails {
                    verified: true,
                    ..DriverDetails::new(id.clone())
                })
                .await?;
            self.drivers.get_driver_details(&id).await
        }
        .await;
        let driver = finish("set_status_verified", start, result)?;

        metrics::counter!("driver_verifications_total").increment(1);

        Ok(Response::new(driver_to_proto(driver)))
    }

    #[instrument(skip(self, request), fields(driver_id))]
    async fn edit_driver(
        &self,
        request: Request<EditDriverRequest>,
    ) -> Result<Response<Driver>, Status> {
        let start = Instant::now();
        let details = edit_request_to_details(request.into_inner())?;
        tracing::Span::current().record("driver_id", details.id.as_str());

        let edited = finish(
            "edit_driver",
            start,
            self.drivers.edit_driver_details(details).await,
        )?;

        Ok(Response::new(driver_to_proto(edited)))
    }

    #[instrument(skip(self, request), fields(driver_id))]
    async fn delete_driver(
        &self,
        request: Request<DriverByIdRequest>,
    ) -> Result<Response<DeleteDriverResponse>, Status> {
        let start = Instant::now();
        let id = parse_driver_id(&request.into_inner().id)?;
        tracing::Span::current().record("driver_id", id.as_str());

        finish("delete_driver", start, self.drivers.delete_driver(&id).await)?;

        Ok(Response::new(DeleteDriverResponse { success: true }))
    }

    // -------------------------------------------------------------------------
    // Status
    // -------------------------------------------------------------------------

    #[instrument(skip(self, request), fields(driver_id))]
    async fn get_status(
        &self,
        request: Request<DriverByIdRequest>,
    ) -> Result<Response<StatusResponse>, Status> {
        let start = Instant::now();
        let id = parse_driver_id(&request.into_inner().id)?;
        tracing::Span::current().record("driver_id", id.as_str());

        let result = finish("get_status", start, self.drivers.get_status(&id).await)?;

        Ok(Response::new(StatusResponse {
            status: result.status,
        }))
    }

    #[instrument(skip(self, request), fields(driver_id))]
    async fn set_status(
        &self,
        request: Request<SetStatusRequest>,
    ) -> Result<Response<StatusResponse>, Status> {
        let start = Instant::now();
        let req = request.into_inner();
        let id = parse_driver_id(&req.id)?;
        tracing::Span::current().record("driver_id", id.as_str());

        let result = finish(
            "set_status",
            start,
            self.drivers.set_status(&req.status, &id).await,
        )?;

        Ok(Response::new(StatusResponse {
            status: result.status,
        }))
    }

    // -------------------------------------------------------------------------
    // Presence
    // -------------------------------------------------------------------------

    #[instrument(skip(self, request), fields(driver_id))]
    async fn record_heartbeat(
        &self,
        request: Request<DriverByIdRequest>,
    ) -> Result<Response<HeartbeatResponse>, Status> {
        let start = Instant::now();
        let id = parse_driver_id(&request.into_inner().id)?;
        tracing::Span::current().record("driver_id", id.as_str());

        let seen_at = finish(
            "record_heartbeat",
            start,
            self.drivers.record_heartbeat(&id, Utc::now()).await,
        )?;

        metrics::counter!("driver_heartbeats_total").increment(1);

        Ok(Response::new(HeartbeatResponse {
            last_seen: Some(timestamp_to_proto(seen_at)),
        }))
    }

    #[instrument(skip(self, _request))]
    async fn get_active_drivers(
        &self,
        _request: Request<GetActiveDriversRequest>,
    ) -> Result<Response<Drivers>, Status> {
        let start = Instant::now();

        let drivers = finish(
            "get_active_drivers",
            start,
            self.drivers.list_recently_active_drivers(Utc::now()).await,
        )?;

        Ok(Response::new(drivers_to_proto(drivers)))
    }

    // -------------------------------------------------------------------------
    // History
    // -------------------------------------------------------------------------

    #[instrument(skip(self, request), fields(driver_id))]
    async fn get_trip_history(
        &self,
        request: Request<DriverByIdRequest>,
    ) -> Result<Response<TripHistory>, Status> {
        let start = Instant::now();
        let id = parse_driver_id(&request.into_inner().id)?;
        tracing::Span::current().record("driver_id", id.as_str());

        let entries = finish(
            "get_trip_history",
            start,
            self.drivers.get_trip_history(&id).await,
        )?;

        Ok(Response::new(TripHistory {
            entries: entries.into_iter().map(trip_to_proto).collect(),
        }))
    }

    // -------------------------------------------------------------------------
    // Health
    // -------------------------------------------------------------------------

    async fn health_check(
        &self,
        _request: Request<HealthCheckRequest>,
    ) -> Result<Response<HealthCheckResponse>, Status> {
        Ok(Response::new(HealthCheckResponse {
            status: ServingStatus::Serving as i32,
        }))
    }
}
