//! Ferry Proto - gRPC Protocol Buffers
//!
//! Generated code from Protocol Buffer definitions for Ferry gRPC services.
//!
//! # Services
//!
//! - [`driver_service`] - Driver records, verification and presence
//!
//! # Example
//!
//! ```ignore
//! use ferry_proto::driver_service::driver_service_client::DriverServiceClient;
//! use ferry_proto::DriverByIdRequest;
//!
//! let mut client = DriverServiceClient::connect("http://localhost:50053").await?;
//! let driver = client
//!     .get_driver_details(DriverByIdRequest { id: "d1".to_string() })
//!     .await?;
//! ```

// Suppress clippy warnings from generated tonic code
#![allow(clippy::derive_partial_eq_without_eq)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::default_trait_access)]
#![allow(clippy::too_many_lines)]

/// Ferry v1 API types and services.
pub mod ferry {
    pub mod v1 {
        tonic::include_proto!("ferry.v1");

        /// File descriptor set for gRPC reflection.
        pub const FILE_DESCRIPTOR_SET: &[u8] =
            tonic::include_file_descriptor_set!("ferry_descriptor");
    }
}

pub use ferry::v1::*;

pub mod driver_service {
    pub use super::ferry::v1::driver_service_client;
    pub use super::ferry::v1::driver_service_server;
}
