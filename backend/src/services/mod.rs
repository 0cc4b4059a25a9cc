//! Business logic services for the Farm Monitoring Platform

pub mod analytics;
pub mod cache;
pub mod normalize;
pub mod points;

pub use analytics::AnalyticsService;
pub use cache::AnalyticsCache;
