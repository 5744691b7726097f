//! Trip composition wizard and collaboration client for the travel planner backend.

pub mod app;
pub mod config;
pub mod domain;
pub mod infra;
pub mod util;
