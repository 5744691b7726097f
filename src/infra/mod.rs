//! Everything that leaves the process: the REST API and catalog files.

pub mod api;
pub mod catalog;

pub use api::{ApiError, ConflictReason, TripApiClient};
pub use catalog::CatalogError;
