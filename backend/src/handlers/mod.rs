//! HTTP request handlers

pub mod analytics;
pub mod health;

pub use analytics::{get_dashboard, get_insights, get_points};
pub use health::health_check;
