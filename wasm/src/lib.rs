//! WebAssembly module for the Farm Monitoring Platform
//!
//! Provides client-side computation for:
//! - Coordinate canonicalization before map rendering
//! - Polygon and vertex validation in the farm boundary editor
//! - Moisture banding and marker styling for offline previews

use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::coords::*;
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Canonicalize raw farm coordinates into `[lng, lat]` vertex order
#[wasm_bindgen]
pub fn canonicalize_polygon(coordinates_json: &str) -> Result<String, JsValue> {
    let raw: serde_json::Value = serde_json::from_str(coordinates_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid coordinates JSON: {}", e)))?;

    let polygon = resolve_coordinates(&raw, AxisOrder::LngLat);
    serde_json::to_string(&polygon)
        .map_err(|e| JsValue::from_str(&format!("Serialization failed: {}", e)))
}

/// Canonicalize raw farm coordinates into `[lat, lng]` vertex order for
/// map widgets that draw latitude-first
#[wasm_bindgen]
pub fn canonicalize_polygon_lat_first(coordinates_json: &str) -> Result<String, JsValue> {
    let raw: serde_json::Value = serde_json::from_str(coordinates_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid coordinates JSON: {}", e)))?;

    let polygon = resolve_coordinates(&raw, AxisOrder::LatLng);
    serde_json::to_string(&polygon)
        .map_err(|e| JsValue::from_str(&format!("Serialization failed: {}", e)))
}

/// Validate one vertex, returning an error message or nothing
#[wasm_bindgen]
pub fn validate_farm_vertex(lat: f64, lng: f64) -> Option<String> {
    validate_vertex(lat, lng).err().map(|m| m.to_string())
}

/// Whether raw coordinates resolve to a polygon that encloses an area
#[wasm_bindgen]
pub fn polygon_has_area(coordinates_json: &str) -> Result<bool, JsValue> {
    let raw: serde_json::Value = serde_json::from_str(coordinates_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid coordinates JSON: {}", e)))?;

    let polygon = resolve_coordinates(&raw, AxisOrder::LngLat);
    Ok(has_valid_area(&polygon))
}

/// Classify a moisture reading into its display band
#[wasm_bindgen]
pub fn classify_moisture_band(moisture: Option<f64>) -> String {
    match serde_json::to_value(MoistureBand::classify(moisture)) {
        Ok(serde_json::Value::String(band)) => band,
        _ => "unknown".to_string(),
    }
}

/// Band color for a moisture reading
#[wasm_bindgen]
pub fn moisture_band_color(moisture: Option<f64>) -> String {
    MoistureBand::classify(moisture).color().to_string()
}

/// Compute marker styling for a moisture reading
#[wasm_bindgen]
pub fn moisture_marker_style(moisture: Option<f64>) -> Result<String, JsValue> {
    serde_json::to_string(&marker_style(moisture))
        .map_err(|e| JsValue::from_str(&format!("Serialization failed: {}", e)))
}

/// Build the cache key the backend uses for an analytics request
#[wasm_bindgen]
pub fn analytics_cache_key(
    farm_id: &str,
    start_date: Option<String>,
    end_date: Option<String>,
) -> String {
    let range = match (start_date, end_date) {
        (Some(start), Some(end)) => DateRange::parse(&start, &end),
        _ => None,
    };
    cache_key(farm_id, range.as_ref())
}
