//! Validation utilities for the Farm Monitoring Platform
//!
//! Geometry and date-range checks applied before any provider call. The
//! reconciliation pipeline itself degrades softly; these guards exist so a
//! degenerate polygon is reported to the caller instead of silently
//! producing an empty chart.

use crate::types::{AxisOrder, DateRange, Vertex};

// ============================================================================
// Geometry Validations
// ============================================================================

/// Validate a single WGS84 vertex (degrees)
pub fn validate_vertex(lat: f64, lng: f64) -> Result<(), &'static str> {
    if !lat.is_finite() || !lng.is_finite() {
        return Err("Coordinates must be finite numbers");
    }
    if lat.abs() > 90.0 {
        return Err("Latitude must be between -90 and 90");
    }
    if lng.abs() > 180.0 {
        return Err("Longitude must be between -180 and 180");
    }
    Ok(())
}

/// Validate every vertex of a resolved polygon
pub fn validate_polygon(vertices: &[Vertex], order: AxisOrder) -> Result<(), &'static str> {
    if vertices.is_empty() {
        return Err("Polygon has no resolvable vertices");
    }
    for v in vertices {
        let (lat, lng) = match order {
            AxisOrder::LngLat => (v[1], v[0]),
            AxisOrder::LatLng => (v[0], v[1]),
        };
        validate_vertex(lat, lng)?;
    }
    Ok(())
}

/// Whether the polygon has enough vertices to enclose an area
pub fn has_valid_area(vertices: &[Vertex]) -> bool {
    vertices.len() >= 3
}

// ============================================================================
// Date Validations
// ============================================================================

/// Validate a date range is ordered
pub fn validate_date_range(range: &DateRange) -> Result<(), &'static str> {
    if range.start > range.end {
        return Err("Start date must not be after end date");
    }
    Ok(())
}
