//! Ferry Types - Shared domain types
//!
//! This crate contains domain types used across Ferry services:
//! - Driver and account identity
//! - Driver records and list filters
//! - Presence window and trip history results

pub mod account;
pub mod driver;
pub mod error;
pub mod history;
pub mod presence;

pub use account::*;
pub use driver::*;
pub use error::*;
pub use history::*;
pub use presence::*;
