//! Error mapping for the Driver API service.

use ferry_driver_core::DriverError;
use tonic::Status;

/// Convert a driver error into a gRPC status.
///
/// Storage failures were already logged where they were classified; the
/// caller gets no database details.
pub fn driver_error_to_status(err: DriverError) -> Status {
    match err {
        DriverError::NotFound => Status::not_found("Driver not found"),
        DriverError::Storage(_) => {
            metrics::counter!("driver_storage_errors_total").increment(1);
            Status::internal("Storage failure")
        }
    }
}
