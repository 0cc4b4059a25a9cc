//! Shared types and reconciliation logic for the Farm Monitoring Platform
//!
//! This crate contains the pure, I/O-free parts of the analytics engine
//! shared between the backend and the browser (via WASM): coordinate order
//! resolution, the metric family catalogue, the normalized analytics model,
//! cache entry types, visualization point styling, and input validation.

pub mod coords;
pub mod models;
pub mod types;
pub mod validation;

pub use coords::*;
pub use models::*;
pub use types::*;
pub use validation::*;
