//! Domain models for the Farm Monitoring Platform

mod analytics;
mod cache;
mod farm;
mod points;
mod series;

pub use analytics::*;
pub use cache::*;
pub use farm::*;
pub use points::*;
pub use series::*;
