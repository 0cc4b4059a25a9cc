//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Axis order of a coordinate pair.
///
/// The engine stores polygons as `[lng, lat]` internally (the order the
/// analytics provider expects); map widgets want `[lat, lng]`. Every
/// consumer states which order it needs instead of swapping by hand.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AxisOrder {
    LngLat,
    LatLng,
}

/// A resolved polygon vertex in a known axis order.
pub type Vertex = [f64; 2];

/// Date range for analytics queries
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: chrono::NaiveDate,
    pub end: chrono::NaiveDate,
}

impl DateRange {
    pub fn new(start: chrono::NaiveDate, end: chrono::NaiveDate) -> Self {
        Self { start, end }
    }

    /// Parse a range from two `YYYY-MM-DD` strings.
    pub fn parse(start: &str, end: &str) -> Option<Self> {
        let start = chrono::NaiveDate::parse_from_str(start, "%Y-%m-%d").ok()?;
        let end = chrono::NaiveDate::parse_from_str(end, "%Y-%m-%d").ok()?;
        Some(Self { start, end })
    }
}
