//! Visualization point derivation
//!
//! Turns a normalized record into map-renderable moisture points at
//! whatever granularity the data supports: per-point samples when the
//! provider located them, otherwise one synthetic point at the polygon
//! centroid carrying the field-wide moisture figure.

use shared::{MetricFamily, NormalizedAnalytics, Vertex, VisualizationPoint};

/// Derive map points from the normalized record. Recomputed per render,
/// never cached.
pub fn derive_points(
    analytics: &NormalizedAnalytics,
    polygon: &[Vertex],
) -> Vec<VisualizationPoint> {
    if !analytics.soil_samples.is_empty() {
        return analytics
            .soil_samples
            .iter()
            .map(|s| VisualizationPoint {
                lat: s.lat,
                lng: s.lng,
                moisture: s.moisture,
                date: s.date.clone(),
            })
            .collect();
    }

    let Some((lat, lng)) = centroid(polygon) else {
        return Vec::new();
    };
    vec![VisualizationPoint {
        lat,
        lng,
        moisture: field_moisture(analytics),
        date: latest_moisture_date(analytics),
    }]
}

/// Arithmetic mean of vertex coordinates, not an area-weighted centroid.
fn centroid(polygon: &[Vertex]) -> Option<(f64, f64)> {
    if polygon.is_empty() {
        return None;
    }
    let n = polygon.len() as f64;
    let lng = polygon.iter().map(|v| v[0]).sum::<f64>() / n;
    let lat = polygon.iter().map(|v| v[1]).sum::<f64>() / n;
    Some((lat, lng))
}

/// Mean of the moisture series, else the bare scalar the payload carried.
fn field_moisture(analytics: &NormalizedAnalytics) -> Option<f64> {
    let values: Vec<f64> = analytics
        .series(MetricFamily::SoilMoisture)
        .iter()
        .filter_map(|s| s.value)
        .collect();
    MetricFamily::SoilMoisture
        .aggregate()
        .apply(&values)
        .or(analytics.soil_moisture_scalar)
}

/// Date of the most recent non-null moisture sample, relying on the
/// series' chronological input order.
fn latest_moisture_date(analytics: &NormalizedAnalytics) -> Option<String> {
    analytics
        .series(MetricFamily::SoilMoisture)
        .iter()
        .rev()
        .find(|s| s.value.is_some())
        .and_then(|s| s.date.clone())
}
