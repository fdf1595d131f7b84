//! Ferry Driver Core - Driver lifecycle logic
//!
//! Driver records, the verification gate, status changes, presence
//! heartbeats and trip history, on top of a [`ferry_db::DriverRepository`].

pub mod error;
pub mod service;

pub use error::*;
pub use service::*;
