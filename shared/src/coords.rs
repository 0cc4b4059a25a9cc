//! Polygon coordinate order resolution
//!
//! Farm documents and drawing widgets deliver polygons in a handful of
//! shapes: `{lat, lng}` objects, `{latitude, longitude}` objects, bare
//! numeric pairs in either axis order, delimited strings, or any of those
//! JSON-encoded into a string. `resolve_coordinates` turns all of them into
//! a vertex list in the axis order the caller asks for.
//!
//! Bare pairs carry no field names, so their order is inferred from the
//! first pair alone: if it is numerically plausible as `(lat, lng)` the
//! whole sequence is read that way, otherwise as `(lng, lat)`. Near the
//! equator/prime meridian both readings are plausible and the inference can
//! be wrong; this is a known limitation of the input format, not something
//! the resolver can fix.

use serde_json::{Map, Value};

use crate::types::{AxisOrder, Vertex};

/// Resolve an arbitrarily shaped coordinate payload into vertices in
/// `target` order. Never fails; unparseable input yields an empty list.
pub fn resolve_coordinates(raw: &Value, target: AxisOrder) -> Vec<Vertex> {
    emit(collect_points(raw, true), target)
}

/// Axis order a slice of bare numeric pairs appears to be in, judged from
/// the first pair only.
pub fn infer_pair_order(first: (f64, f64)) -> AxisOrder {
    let (a, b) = first;
    if a.abs() <= 90.0 && b.abs() <= 180.0 {
        AxisOrder::LatLng
    } else {
        AxisOrder::LngLat
    }
}

/// Resolve one sample's location into `(lat, lng)`.
///
/// Accepts `{lat, lng}` and `{latitude, longitude}` objects (with the
/// two-numeric-field fallback) and 2-element `[lng, lat]` arrays, the
/// shapes soil-sample lists use. Pair order is fixed here, not inferred:
/// provider point samples always arrive longitude first.
pub fn resolve_sample_location(raw: &Value) -> Option<(f64, f64)> {
    match raw {
        Value::Object(obj) => point_from_object(obj),
        Value::Array(items) => {
            let pair = numeric_pair(items)?;
            Some((pair.1, pair.0))
        }
        _ => None,
    }
}

// Internal canonical representation is (lat, lng) tuples; axis order is
// applied once at the end.
fn collect_points(raw: &Value, allow_string: bool) -> Vec<(f64, f64)> {
    match raw {
        Value::Array(items) => points_from_sequence(items),
        Value::Object(obj) => point_from_object(obj).into_iter().collect(),
        Value::String(s) if allow_string => {
            // A JSON-encoded payload is unwrapped exactly once; anything
            // else is treated as a delimited pair string.
            match serde_json::from_str::<Value>(s) {
                Ok(inner) => collect_points(&inner, false),
                Err(_) => points_from_delimited(s),
            }
        }
        _ => Vec::new(),
    }
}

fn points_from_sequence(items: &[Value]) -> Vec<(f64, f64)> {
    let pair_order = items
        .iter()
        .find_map(|item| match item {
            Value::Array(inner) => numeric_pair(inner),
            _ => None,
        })
        .map(infer_pair_order);

    let mut points = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::Object(obj) => {
                if let Some(p) = point_from_object(obj) {
                    points.push(p);
                }
            }
            Value::Array(inner) => {
                if let (Some((a, b)), Some(order)) = (numeric_pair(inner), pair_order) {
                    points.push(match order {
                        AxisOrder::LatLng => (a, b),
                        AxisOrder::LngLat => (b, a),
                    });
                }
            }
            _ => {}
        }
    }
    points
}

fn points_from_delimited(s: &str) -> Vec<(f64, f64)> {
    let mut pairs = Vec::new();
    for chunk in s.split(|c: char| c == ';' || c == '|' || c == '/' || c.is_whitespace()) {
        if chunk.is_empty() {
            continue;
        }
        let mut parts = chunk.split(',');
        let (Some(a), Some(b)) = (parts.next(), parts.next()) else {
            continue;
        };
        if parts.next().is_some() {
            continue;
        }
        let (Ok(a), Ok(b)) = (a.trim().parse::<f64>(), b.trim().parse::<f64>()) else {
            continue;
        };
        pairs.push((a, b));
    }

    let Some(&first) = pairs.first() else {
        return Vec::new();
    };
    match infer_pair_order(first) {
        AxisOrder::LatLng => pairs,
        AxisOrder::LngLat => pairs.into_iter().map(|(a, b)| (b, a)).collect(),
    }
}

/// `(lat, lng)` from a point object. Named keys win; otherwise the first
/// two numeric fields in the object's own key order are read as
/// (lat-ish, lng-ish). Fewer than two numeric fields drops the point.
fn point_from_object(obj: &Map<String, Value>) -> Option<(f64, f64)> {
    if let (Some(lat), Some(lng)) = (number_at(obj, "lat"), number_at(obj, "lng")) {
        return Some((lat, lng));
    }
    if let (Some(lat), Some(lng)) = (number_at(obj, "latitude"), number_at(obj, "longitude")) {
        return Some((lat, lng));
    }

    let mut numerics = obj.values().filter_map(Value::as_f64);
    match (numerics.next(), numerics.next()) {
        (Some(lat), Some(lng)) => Some((lat, lng)),
        _ => None,
    }
}

fn number_at(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    obj.get(key).and_then(Value::as_f64)
}

fn numeric_pair(items: &[Value]) -> Option<(f64, f64)> {
    match items {
        [a, b] => Some((a.as_f64()?, b.as_f64()?)),
        _ => None,
    }
}

fn emit(points: Vec<(f64, f64)>, target: AxisOrder) -> Vec<Vertex> {
    points
        .into_iter()
        .map(|(lat, lng)| match target {
            AxisOrder::LngLat => [lng, lat],
            AxisOrder::LatLng => [lat, lng],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lat_lng_objects_swap_to_lng_lat() {
        let raw = json!([
            {"lat": 23.01, "lng": 72.50},
            {"lat": 23.02, "lng": 72.51}
        ]);
        assert_eq!(
            resolve_coordinates(&raw, AxisOrder::LngLat),
            vec![[72.50, 23.01], [72.51, 23.02]]
        );
    }

    #[test]
    fn test_latitude_longitude_objects() {
        let raw = json!([{"latitude": 23.01, "longitude": 72.50}]);
        assert_eq!(
            resolve_coordinates(&raw, AxisOrder::LngLat),
            vec![[72.50, 23.01]]
        );
    }

    #[test]
    fn test_lat_first_pairs_are_swapped() {
        let raw = json!([[23.01, 72.50], [23.02, 72.51], [23.03, 72.50]]);
        assert_eq!(
            resolve_coordinates(&raw, AxisOrder::LngLat),
            vec![[72.50, 23.01], [72.51, 23.02], [72.50, 23.03]]
        );
    }

    #[test]
    fn test_lng_first_pairs_pass_through() {
        // 172 cannot be a latitude, so the sequence is already (lng, lat)
        let raw = json!([[172.0, 40.0], [173.0, 41.0]]);
        assert_eq!(
            resolve_coordinates(&raw, AxisOrder::LngLat),
            vec![[172.0, 40.0], [173.0, 41.0]]
        );
    }

    #[test]
    fn test_target_lat_lng_for_map_display() {
        let raw = json!([[172.0, 40.0]]);
        assert_eq!(
            resolve_coordinates(&raw, AxisOrder::LatLng),
            vec![[40.0, 172.0]]
        );
    }

    #[test]
    fn test_single_point_object() {
        let raw = json!({"lat": 23.01, "lng": 72.50});
        assert_eq!(
            resolve_coordinates(&raw, AxisOrder::LngLat),
            vec![[72.50, 23.01]]
        );
    }

    #[test]
    fn test_delimited_string() {
        let raw = json!("23.01,72.50;23.02,72.51");
        assert_eq!(
            resolve_coordinates(&raw, AxisOrder::LngLat),
            vec![[72.50, 23.01], [72.51, 23.02]]
        );
    }

    #[test]
    fn test_json_encoded_string() {
        let raw = json!("[{\"lat\": 23.01, \"lng\": 72.50}]");
        assert_eq!(
            resolve_coordinates(&raw, AxisOrder::LngLat),
            vec![[72.50, 23.01]]
        );
    }

    #[test]
    fn test_object_fallback_two_numeric_fields() {
        let raw = json!([{"y": 23.01, "x": 72.50, "label": "a"}]);
        // Fallback reads fields in key order as (lat-ish, lng-ish)
        assert_eq!(
            resolve_coordinates(&raw, AxisOrder::LngLat),
            vec![[72.50, 23.01]]
        );
    }

    #[test]
    fn test_object_fallback_too_few_numerics_drops_point() {
        let raw = json!([{"y": 23.01, "label": "a"}, {"lat": 23.02, "lng": 72.51}]);
        assert_eq!(
            resolve_coordinates(&raw, AxisOrder::LngLat),
            vec![[72.51, 23.02]]
        );
    }

    #[test]
    fn test_unparseable_input_is_empty() {
        assert!(resolve_coordinates(&json!(null), AxisOrder::LngLat).is_empty());
        assert!(resolve_coordinates(&json!(42), AxisOrder::LngLat).is_empty());
        assert!(resolve_coordinates(&json!([]), AxisOrder::LngLat).is_empty());
        assert!(resolve_coordinates(&json!("not coordinates"), AxisOrder::LngLat).is_empty());
    }

    #[test]
    fn test_sample_location_shapes() {
        assert_eq!(
            resolve_sample_location(&json!({"lat": 23.0, "lng": 72.5})),
            Some((23.0, 72.5))
        );
        assert_eq!(
            resolve_sample_location(&json!({"latitude": 23.0, "longitude": 72.5})),
            Some((23.0, 72.5))
        );
        // Bare pairs in sample lists are fixed (lng, lat)
        assert_eq!(
            resolve_sample_location(&json!([72.5, 23.0])),
            Some((23.0, 72.5))
        );
        assert_eq!(resolve_sample_location(&json!("72.5,23.0")), None);
    }
}
