//! Metric series normalization
//!
//! Reconciles the provider's arbitrarily shaped payload into the canonical
//! [`NormalizedAnalytics`] record. Per family: promote a nested grouping to
//! the top level if needed, resolve each sample's value through the
//! family's accepted-name chain (falling back to the first numeric field
//! that is not `date`), apply the unit policy, and write the result under
//! the family's fixed output key.
//!
//! Nothing in here errors. Malformed sub-trees become empty arrays or null
//! scalars; the one guarantee is the fixed output shape.

use chrono::{Datelike, NaiveDate};
use serde_json::{Map, Value};

use shared::{
    Alerts, MetricFamily, MetricSample, NormalizedAnalytics, SoilSample, TemperatureAlert,
};

/// Temperatures at or below this derive a frost alert (Celsius).
const FROST_ALERT_MAX_C: f64 = 4.0;

/// Temperatures at or above this derive a heat alert (Celsius).
const HEAT_ALERT_MIN_C: f64 = 35.0;

/// Normalize a raw provider payload. Never fails.
pub fn normalize(raw: &Value) -> NormalizedAnalytics {
    let mut out = NormalizedAnalytics::default();
    let Some(obj) = raw.as_object() else {
        return out;
    };

    for family in MetricFamily::ALL {
        if let Some(items) = family_array(obj, family) {
            out.set_series(family, reconcile_series(items, family));
        }
    }

    // A bare number under soil_moisture is not a series but still feeds
    // the centroid fallback on the map
    out.soil_moisture_scalar = obj.get("soil_moisture").and_then(Value::as_f64);

    out.growth_stage = string_at(obj, "growth_stage").or_else(|| string_at(obj, "stage"));
    let topography = obj.get("topography").and_then(Value::as_object);
    out.elevation_m = scalar_with_promotion(obj, topography, "elevation_m");
    out.slope_deg = scalar_with_promotion(obj, topography, "slope_deg");
    out.aspect_deg = scalar_with_promotion(obj, topography, "aspect_deg");

    out.ndvi_trend_slope_per_day = number_at(obj, "ndvi_trend_slope_per_day")
        .or_else(|| number_at(obj, "ndvi_trend"))
        .or_else(|| trend_slope_per_day(out.series(MetricFamily::Ndvi)));

    out.ml_prediction = string_at(obj, "ml_prediction");
    out.ml_confidence = number_at(obj, "ml_confidence");

    out.soil_profile = obj
        .get("soil_profile")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    out.alerts = match obj.get("alerts") {
        Some(v) if v.is_object() => Alerts::from_value(v),
        _ => derive_alerts(out.series(MetricFamily::Temperature)),
    };

    out.soil_samples = extract_soil_samples(obj);

    out
}

/// Per-family summary figures for the insights view: rainfall totals,
/// everything else averages, rounded to 4 decimals. Families without a
/// single non-null value are omitted.
pub fn summarize(analytics: &NormalizedAnalytics) -> Map<String, Value> {
    let mut summary = Map::new();
    for (family, samples) in analytics.iter_series() {
        let values: Vec<f64> = samples.iter().filter_map(|s| s.value).collect();
        if let Some(aggregated) = family.aggregate().apply(&values) {
            let rounded = (aggregated * 10_000.0).round() / 10_000.0;
            summary.insert(family.key().to_string(), Value::from(rounded));
        }
    }
    summary
}

/// Find the family's input array: top-level source keys first, then the
/// nested grouping. An empty top-level array does not shadow a populated
/// nested one.
fn family_array<'a>(obj: &'a Map<String, Value>, family: MetricFamily) -> Option<&'a Vec<Value>> {
    for key in family.source_keys() {
        if let Some(Value::Array(items)) = obj.get(*key) {
            if !items.is_empty() {
                return Some(items);
            }
        }
    }
    if let Some((container, key)) = family.nested_source() {
        if let Some(Value::Array(items)) = obj.get(container).and_then(|c| c.get(key)) {
            if !items.is_empty() {
                return Some(items);
            }
        }
    }
    None
}

fn reconcile_series(items: &[Value], family: MetricFamily) -> Vec<MetricSample> {
    items
        .iter()
        .map(|item| reconcile_sample(item, family))
        .collect()
}

fn reconcile_sample(item: &Value, family: MetricFamily) -> MetricSample {
    let obj = match item {
        Value::Object(obj) => obj,
        // A bare number is still a usable sample, just undated
        Value::Number(n) => {
            return MetricSample {
                date: None,
                value: n.as_f64().map(|v| family.unit_policy().apply(v)),
            }
        }
        _ => return MetricSample::default(),
    };

    let date = obj.get("date").and_then(Value::as_str).map(str::to_owned);
    let value = resolve_value(obj, family.accepted_names())
        .map(|v| family.unit_policy().apply(v));

    MetricSample { date, value }
}

/// Accepted names in order, then the first numeric field not named `date`
/// in the object's own key order.
fn resolve_value(obj: &Map<String, Value>, accepted: &[&str]) -> Option<f64> {
    for name in accepted {
        if let Some(v) = obj.get(*name).and_then(Value::as_f64) {
            return Some(v);
        }
    }
    obj.iter()
        .find(|(key, value)| key.as_str() != "date" && value.is_number())
        .and_then(|(_, value)| value.as_f64())
}

fn scalar_with_promotion(
    obj: &Map<String, Value>,
    nested: Option<&Map<String, Value>>,
    key: &str,
) -> Option<f64> {
    number_at(obj, key).or_else(|| nested.and_then(|n| number_at(n, key)))
}

/// Ordinary least squares slope of the NDVI series over day offsets.
/// Needs at least two dated, non-null samples; a single-day cluster has no
/// defined slope.
fn trend_slope_per_day(samples: &[MetricSample]) -> Option<f64> {
    let points: Vec<(f64, f64)> = samples
        .iter()
        .filter_map(|s| {
            let date = NaiveDate::parse_from_str(s.date.as_deref()?, "%Y-%m-%d").ok()?;
            Some((f64::from(date.num_days_from_ce()), s.value?))
        })
        .collect();

    if points.len() < 2 {
        return None;
    }

    let n = points.len() as f64;
    let x_mean = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let y_mean = points.iter().map(|(_, y)| y).sum::<f64>() / n;
    let numerator: f64 = points
        .iter()
        .map(|(x, y)| (x - x_mean) * (y - y_mean))
        .sum();
    let denominator: f64 = points.iter().map(|(x, _)| (x - x_mean).powi(2)).sum();

    if denominator == 0.0 {
        None
    } else {
        Some(numerator / denominator)
    }
}

/// Frost/heat alerts from the normalized temperature series, used when the
/// provider sent no alerts object of its own.
fn derive_alerts(temperature: &[MetricSample]) -> Alerts {
    let mut alerts = Alerts::default();
    for sample in temperature {
        let (Some(date), Some(temp)) = (sample.date.as_ref(), sample.value) else {
            continue;
        };
        if temp <= FROST_ALERT_MAX_C {
            alerts.frost.push(TemperatureAlert {
                date: date.clone(),
                temp,
            });
        } else if temp >= HEAT_ALERT_MIN_C {
            alerts.heat.push(TemperatureAlert {
                date: date.clone(),
                temp,
            });
        }
    }
    alerts
}

/// Per-point soil samples: the dedicated points list wins, else the
/// generic sample list. First list yielding at least one located sample
/// is taken whole.
fn extract_soil_samples(obj: &Map<String, Value>) -> Vec<SoilSample> {
    for key in ["soil_moisture_points", "soil_samples"] {
        let Some(items) = obj.get(key).and_then(Value::as_array) else {
            continue;
        };
        let samples: Vec<SoilSample> = items.iter().filter_map(sample_from_value).collect();
        if !samples.is_empty() {
            return samples;
        }
    }
    Vec::new()
}

fn sample_from_value(item: &Value) -> Option<SoilSample> {
    // Nested location object wins over flat fields on the item itself
    let location = item
        .get("location")
        .filter(|v| v.is_object() || v.is_array())
        .unwrap_or(item);
    let (lat, lng) = shared::resolve_sample_location(location)?;

    let moisture = item
        .get("moisture")
        .and_then(Value::as_f64)
        .or_else(|| item.get("value").and_then(Value::as_f64));
    let date = item.get("date").and_then(Value::as_str).map(str::to_owned);

    Some(SoilSample {
        lat,
        lng,
        moisture,
        date,
    })
}

fn string_at(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_owned)
}

fn number_at(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    obj.get(key).and_then(Value::as_f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_top_level_series_normalized() {
        let out = normalize(&json!({
            "ndvi_timeseries": [{"date": "2025-06-01", "ndvi": 0.62}]
        }));
        let series = out.series(MetricFamily::Ndvi);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].date.as_deref(), Some("2025-06-01"));
        assert_eq!(series[0].value, Some(0.62));
    }

    #[test]
    fn test_alias_source_key_accepted() {
        let out = normalize(&json!({
            "ndvi": [{"date": "2025-06-01", "ndvi": 0.5}]
        }));
        assert_eq!(out.series(MetricFamily::Ndvi).len(), 1);
    }

    #[test]
    fn test_weather_grouping_promoted() {
        let out = normalize(&json!({
            "weather": {
                "temperature": [{"date": "2025-06-01", "temp": 305.0}],
                "rainfall": [{"date": "2025-06-01", "rain_mm": 4.2}]
            }
        }));
        let temp = out.series(MetricFamily::Temperature);
        assert!((temp[0].value.unwrap() - 31.85).abs() < 1e-9);
        assert_eq!(out.series(MetricFamily::Rainfall)[0].value, Some(4.2));
    }

    #[test]
    fn test_empty_top_level_does_not_shadow_nested() {
        let out = normalize(&json!({
            "temperature": [],
            "weather": {"temperature": [{"date": "2025-06-01", "temp": 22.0}]}
        }));
        assert_eq!(out.series(MetricFamily::Temperature)[0].value, Some(22.0));
    }

    #[test]
    fn test_accepted_name_chain() {
        let out = normalize(&json!({
            "rainfall": [
                {"date": "2025-06-01", "rain": 4.2},
                {"date": "2025-06-02", "precip_mm": 1.1}
            ]
        }));
        let series = out.series(MetricFamily::Rainfall);
        assert_eq!(series[0].value, Some(4.2));
        assert_eq!(series[1].value, Some(1.1));
    }

    #[test]
    fn test_first_numeric_field_fallback_in_key_order() {
        let out = normalize(&json!({
            "ndvi_timeseries": [
                {"date": "2025-06-01", "flag": true, "zzz": 9.9, "aaa": 1.1}
            ]
        }));
        // Insertion order decides, not alphabetical order.
        assert_eq!(out.series(MetricFamily::Ndvi)[0].value, Some(9.9));
    }

    #[test]
    fn test_kelvin_only_above_threshold() {
        let out = normalize(&json!({
            "temperature": [
                {"date": "2025-06-01", "temp": 305.0},
                {"date": "2025-06-02", "temp": 25.0}
            ]
        }));
        let series = out.series(MetricFamily::Temperature);
        assert!((series[0].value.unwrap() - 31.85).abs() < 1e-9);
        assert_eq!(series[1].value, Some(25.0));
    }

    #[test]
    fn test_null_value_is_a_recorded_gap() {
        let out = normalize(&json!({
            "temperature": [{"date": "2025-06-01", "temp": null}]
        }));
        let series = out.series(MetricFamily::Temperature);
        assert_eq!(series[0].date.as_deref(), Some("2025-06-01"));
        assert_eq!(series[0].value, None);
    }

    #[test]
    fn test_bare_number_samples_kept_undated() {
        let out = normalize(&json!({"rainfall": [1.0, 2.5]}));
        let series = out.series(MetricFamily::Rainfall);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].date, None);
        assert_eq!(series[1].value, Some(2.5));
    }

    #[test]
    fn test_scalar_soil_moisture() {
        let out = normalize(&json!({"soil_moisture": 0.27}));
        assert_eq!(out.soil_moisture_scalar, Some(0.27));
        assert!(out.series(MetricFamily::SoilMoisture).is_empty());
    }

    #[test]
    fn test_soil_moisture_series_leaves_scalar_unset() {
        let out = normalize(&json!({
            "soil_moisture": [{"date": "2025-06-01", "moisture": 0.31}]
        }));
        assert_eq!(out.soil_moisture_scalar, None);
        assert_eq!(out.series(MetricFamily::SoilMoisture)[0].value, Some(0.31));
    }

    #[test]
    fn test_growth_stage_aliases() {
        assert_eq!(
            normalize(&json!({"growth_stage": "flowering"})).growth_stage.as_deref(),
            Some("flowering")
        );
        assert_eq!(
            normalize(&json!({"stage": "ripening"})).growth_stage.as_deref(),
            Some("ripening")
        );
    }

    #[test]
    fn test_topography_promotion() {
        let out = normalize(&json!({
            "elevation_m": 812.0,
            "topography": {"elevation_m": 9999.0, "slope_deg": 4.5, "aspect_deg": 180.0}
        }));
        // Top level wins; the grouping only fills what is missing.
        assert_eq!(out.elevation_m, Some(812.0));
        assert_eq!(out.slope_deg, Some(4.5));
        assert_eq!(out.aspect_deg, Some(180.0));
    }

    #[test]
    fn test_trend_passthrough_wins_over_computation() {
        let out = normalize(&json!({
            "ndvi_trend_slope_per_day": -0.003,
            "ndvi_timeseries": [
                {"date": "2025-06-01", "ndvi": 0.2},
                {"date": "2025-06-11", "ndvi": 0.9}
            ]
        }));
        assert_eq!(out.ndvi_trend_slope_per_day, Some(-0.003));
    }

    #[test]
    fn test_trend_computed_from_series() {
        let out = normalize(&json!({
            "ndvi_timeseries": [
                {"date": "2025-06-01", "ndvi": 0.2},
                {"date": "2025-06-11", "ndvi": 0.4}
            ]
        }));
        // 0.2 over 10 days
        assert!((out.ndvi_trend_slope_per_day.unwrap() - 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_trend_undefined_for_degenerate_series() {
        let single = normalize(&json!({
            "ndvi_timeseries": [{"date": "2025-06-01", "ndvi": 0.2}]
        }));
        assert_eq!(single.ndvi_trend_slope_per_day, None);

        let one_day = normalize(&json!({
            "ndvi_timeseries": [
                {"date": "2025-06-01", "ndvi": 0.2},
                {"date": "2025-06-01", "ndvi": 0.4}
            ]
        }));
        assert_eq!(one_day.ndvi_trend_slope_per_day, None);

        let undated = normalize(&json!({
            "ndvi_timeseries": [{"ndvi": 0.2}, {"ndvi": 0.4}]
        }));
        assert_eq!(undated.ndvi_trend_slope_per_day, None);
    }

    #[test]
    fn test_provider_alerts_object_wins() {
        let out = normalize(&json!({
            "alerts": {"frost": [{"date": "2025-06-01", "temp": 2.0}], "heat": []},
            "temperature": [{"date": "2025-06-02", "temp": 40.0}]
        }));
        assert_eq!(out.alerts.frost.len(), 1);
        assert!(out.alerts.heat.is_empty());
    }

    #[test]
    fn test_alerts_derived_from_temperature_series() {
        let out = normalize(&json!({
            "temperature": [
                {"date": "2025-06-01", "temp": -1.0},
                {"date": "2025-06-02", "temp": 20.0},
                {"date": "2025-06-03", "temp": 36.0},
                {"date": "2025-06-04", "temp": 4.0},
                {"date": "2025-06-05", "temp": 35.0},
                {"temp": 50.0}
            ]
        }));
        let frost: Vec<f64> = out.alerts.frost.iter().map(|a| a.temp).collect();
        let heat: Vec<f64> = out.alerts.heat.iter().map(|a| a.temp).collect();
        assert_eq!(frost, vec![-1.0, 4.0]);
        // Undated readings never alert.
        assert_eq!(heat, vec![36.0, 35.0]);
    }

    #[test]
    fn test_non_object_alerts_fall_back_to_derivation() {
        let out = normalize(&json!({
            "alerts": "none",
            "temperature": [{"date": "2025-06-01", "temp": 2.0}]
        }));
        assert_eq!(out.alerts.frost.len(), 1);
    }

    #[test]
    fn test_soil_points_list_preferred() {
        let out = normalize(&json!({
            "soil_moisture_points": [
                {"location": {"lat": 23.0, "lng": 72.5}, "moisture": 0.3, "date": "2025-06-01"}
            ],
            "soil_samples": [
                {"lat": 1.0, "lng": 1.0, "moisture": 0.9}
            ]
        }));
        assert_eq!(out.soil_samples.len(), 1);
        assert_eq!(out.soil_samples[0].lat, 23.0);
        assert_eq!(out.soil_samples[0].moisture, Some(0.3));
    }

    #[test]
    fn test_soil_samples_fallback_list() {
        let out = normalize(&json!({
            "soil_samples": [
                {"lat": 23.0, "lng": 72.5, "value": 0.22},
                {"location": [72.6, 23.1]}
            ]
        }));
        assert_eq!(out.soil_samples.len(), 2);
        assert_eq!(out.soil_samples[0].moisture, Some(0.22));
        // Array locations are fixed [lng, lat].
        assert_eq!(out.soil_samples[1].lat, 23.1);
        assert_eq!(out.soil_samples[1].moisture, None);
    }

    #[test]
    fn test_unlocatable_points_list_yields_to_next() {
        let out = normalize(&json!({
            "soil_moisture_points": [{"moisture": 0.5}],
            "soil_samples": [{"lat": 23.0, "lng": 72.5, "moisture": 0.2}]
        }));
        assert_eq!(out.soil_samples.len(), 1);
        assert_eq!(out.soil_samples[0].moisture, Some(0.2));
    }

    #[test]
    fn test_ml_fields_passed_through() {
        let out = normalize(&json!({
            "ml_prediction": "stressed",
            "ml_confidence": 0.87
        }));
        assert_eq!(out.ml_prediction.as_deref(), Some("stressed"));
        assert_eq!(out.ml_confidence, Some(0.87));
    }

    #[test]
    fn test_non_object_payload_yields_default() {
        assert_eq!(normalize(&json!([1, 2, 3])), NormalizedAnalytics::default());
        assert_eq!(normalize(&json!(null)), NormalizedAnalytics::default());
        assert_eq!(normalize(&json!("gibberish")), NormalizedAnalytics::default());
    }

    #[test]
    fn test_summarize_rainfall_sums_everything_else_averages() {
        let analytics = normalize(&json!({
            "rainfall": [
                {"date": "2025-06-01", "rain_mm": 1.0},
                {"date": "2025-06-02", "rain_mm": 2.0},
                {"date": "2025-06-03", "rain_mm": 3.5}
            ],
            "temperature": [
                {"date": "2025-06-01", "temp": 20.0},
                {"date": "2025-06-02", "temp": 30.0}
            ]
        }));
        let summary = summarize(&analytics);
        assert_eq!(summary.get("rainfall"), Some(&json!(6.5)));
        assert_eq!(summary.get("temperature"), Some(&json!(25.0)));
    }

    #[test]
    fn test_summarize_omits_empty_families() {
        let summary = summarize(&NormalizedAnalytics::default());
        assert!(summary.is_empty());
    }

    #[test]
    fn test_summarize_skips_null_values_and_rounds() {
        let analytics = normalize(&json!({
            "ndvi_timeseries": [
                {"date": "2025-06-01", "ndvi": 0.1},
                {"date": "2025-06-02", "ndvi": null},
                {"date": "2025-06-03", "ndvi": 0.2}
            ]
        }));
        let summary = summarize(&analytics);
        assert_eq!(summary.get("ndvi_timeseries"), Some(&json!(0.15)));
    }
}
