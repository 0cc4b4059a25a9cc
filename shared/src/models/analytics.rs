//! The canonical normalized analytics record

use std::collections::BTreeMap;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::models::{MetricFamily, MetricSample};

/// Chart-ready analytics for one farm and date range.
///
/// Fixed shape: every metric family key is present even when the provider
/// sent nothing (empty array), scalars are null rather than absent, and
/// sample objects carry the family's canonical value key. Consumers never
/// branch on source shape.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedAnalytics {
    series: BTreeMap<MetricFamily, Vec<MetricSample>>,
    pub growth_stage: Option<String>,
    pub elevation_m: Option<f64>,
    pub slope_deg: Option<f64>,
    pub aspect_deg: Option<f64>,
    pub ndvi_trend_slope_per_day: Option<f64>,
    pub ml_prediction: Option<String>,
    pub ml_confidence: Option<f64>,
    pub soil_profile: Map<String, Value>,
    pub alerts: Alerts,
    pub soil_samples: Vec<SoilSample>,
    /// Kept when the payload gave soil moisture as a bare number instead
    /// of a series; feeds the centroid fallback on the map.
    pub soil_moisture_scalar: Option<f64>,
}

impl Default for NormalizedAnalytics {
    fn default() -> Self {
        let series = MetricFamily::ALL.iter().map(|&f| (f, Vec::new())).collect();
        Self {
            series,
            growth_stage: None,
            elevation_m: None,
            slope_deg: None,
            aspect_deg: None,
            ndvi_trend_slope_per_day: None,
            ml_prediction: None,
            ml_confidence: None,
            soil_profile: Map::new(),
            alerts: Alerts::default(),
            soil_samples: Vec::new(),
            soil_moisture_scalar: None,
        }
    }
}

impl NormalizedAnalytics {
    pub fn series(&self, family: MetricFamily) -> &[MetricSample] {
        self.series.get(&family).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn set_series(&mut self, family: MetricFamily, samples: Vec<MetricSample>) {
        self.series.insert(family, samples);
    }

    pub fn iter_series(&self) -> impl Iterator<Item = (MetricFamily, &[MetricSample])> {
        self.series.iter().map(|(&f, s)| (f, s.as_slice()))
    }

    /// Read a record back from its own serialized form. Missing or
    /// malformed pieces fall back to empty defaults; this never fails.
    pub fn from_canonical(value: &Value) -> Self {
        let mut out = Self::default();
        let Some(obj) = value.as_object() else {
            return out;
        };

        for family in MetricFamily::ALL {
            if let Some(Value::Array(items)) = obj.get(family.key()) {
                let samples = items
                    .iter()
                    .map(|item| MetricSample {
                        date: item.get("date").and_then(Value::as_str).map(str::to_owned),
                        value: item.get(family.value_key()).and_then(Value::as_f64),
                    })
                    .collect();
                out.set_series(family, samples);
            }
        }

        out.growth_stage = string_at(obj, "growth_stage");
        out.elevation_m = number_at(obj, "elevation_m");
        out.slope_deg = number_at(obj, "slope_deg");
        out.aspect_deg = number_at(obj, "aspect_deg");
        out.ndvi_trend_slope_per_day = number_at(obj, "ndvi_trend_slope_per_day");
        out.ml_prediction = string_at(obj, "ml_prediction");
        out.ml_confidence = number_at(obj, "ml_confidence");
        out.soil_profile = obj
            .get("soil_profile")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        out.alerts = obj.get("alerts").map(Alerts::from_value).unwrap_or_default();
        out.soil_samples = obj
            .get("soil_samples")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| serde_json::from_value(v.clone()).ok())
                    .collect()
            })
            .unwrap_or_default();
        out.soil_moisture_scalar = number_at(obj, "soil_moisture_scalar");
        out
    }
}

impl Serialize for NormalizedAnalytics {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        for family in MetricFamily::ALL {
            map.serialize_entry(
                family.key(),
                &KeyedSamples {
                    samples: self.series(family),
                    value_key: family.value_key(),
                },
            )?;
        }
        map.serialize_entry("growth_stage", &self.growth_stage)?;
        map.serialize_entry("elevation_m", &self.elevation_m)?;
        map.serialize_entry("slope_deg", &self.slope_deg)?;
        map.serialize_entry("aspect_deg", &self.aspect_deg)?;
        map.serialize_entry("ndvi_trend_slope_per_day", &self.ndvi_trend_slope_per_day)?;
        map.serialize_entry("ml_prediction", &self.ml_prediction)?;
        map.serialize_entry("ml_confidence", &self.ml_confidence)?;
        map.serialize_entry("soil_profile", &self.soil_profile)?;
        map.serialize_entry("alerts", &self.alerts)?;
        map.serialize_entry("soil_samples", &self.soil_samples)?;
        map.serialize_entry("soil_moisture_scalar", &self.soil_moisture_scalar)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for NormalizedAnalytics {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(NormalizedAnalytics::from_canonical(&value))
    }
}

/// Samples serialized under their family's value key, e.g.
/// `{"date": "2025-01-01", "temp": 31.85}`.
struct KeyedSamples<'a> {
    samples: &'a [MetricSample],
    value_key: &'static str,
}

impl Serialize for KeyedSamples<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.samples.len()))?;
        for sample in self.samples {
            seq.serialize_element(&KeyedSample {
                sample,
                value_key: self.value_key,
            })?;
        }
        seq.end()
    }
}

struct KeyedSample<'a> {
    sample: &'a MetricSample,
    value_key: &'static str,
}

impl Serialize for KeyedSample<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("date", &self.sample.date)?;
        map.serialize_entry(self.value_key, &self.sample.value)?;
        map.end()
    }
}

/// Temperature threshold crossings worth surfacing on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Alerts {
    pub frost: Vec<TemperatureAlert>,
    pub heat: Vec<TemperatureAlert>,
}

/// One alert entry, in Celsius
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureAlert {
    pub date: String,
    pub temp: f64,
}

impl Alerts {
    /// Read a provider-shaped alerts object. Missing lists become empty;
    /// entries without a date and a numeric temp are dropped.
    pub fn from_value(value: &Value) -> Self {
        fn list(value: Option<&Value>) -> Vec<TemperatureAlert> {
            value
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|item| {
                            Some(TemperatureAlert {
                                date: item.get("date")?.as_str()?.to_owned(),
                                temp: item.get("temp").and_then(Value::as_f64)?,
                            })
                        })
                        .collect()
                })
                .unwrap_or_default()
        }

        Self {
            frost: list(value.get("frost")),
            heat: list(value.get("heat")),
        }
    }
}

/// One georeferenced soil moisture sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilSample {
    pub lat: f64,
    pub lng: f64,
    pub moisture: Option<f64>,
    pub date: Option<String>,
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
    fn test_default_record_has_every_family_key() {
        let value = serde_json::to_value(NormalizedAnalytics::default()).unwrap();
        let obj = value.as_object().unwrap();
        for family in MetricFamily::ALL {
            assert_eq!(obj[family.key()], json!([]), "missing {}", family.key());
        }
        assert_eq!(obj["soil_profile"], json!({}));
        assert_eq!(obj["alerts"], json!({"frost": [], "heat": []}));
        assert_eq!(obj["growth_stage"], Value::Null);
        assert_eq!(obj["ml_confidence"], Value::Null);
    }

    #[test]
    fn test_samples_serialize_under_family_value_key() {
        let mut record = NormalizedAnalytics::default();
        record.set_series(
            MetricFamily::Temperature,
            vec![MetricSample::new("2025-01-01", 31.85)],
        );
        record.set_series(
            MetricFamily::Rainfall,
            vec![MetricSample::new("2025-01-01", 4.2)],
        );

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value["temperature"],
            json!([{"date": "2025-01-01", "temp": 31.85}])
        );
        assert_eq!(
            value["rainfall"],
            json!([{"date": "2025-01-01", "rain_mm": 4.2}])
        );
    }

    #[test]
    fn test_null_value_keeps_date() {
        let mut record = NormalizedAnalytics::default();
        record.set_series(
            MetricFamily::Ndvi,
            vec![MetricSample {
                date: Some("2025-01-02".into()),
                value: None,
            }],
        );
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value["ndvi_timeseries"],
            json!([{"date": "2025-01-02", "ndvi": null}])
        );
    }

    #[test]
    fn test_round_trip_through_canonical_json() {
        let mut record = NormalizedAnalytics::default();
        record.set_series(
            MetricFamily::SoilMoisture,
            vec![MetricSample::new("2025-01-01", 0.27)],
        );
        record.growth_stage = Some("vegetative".into());
        record.elevation_m = Some(412.0);
        record.ml_prediction = Some("healthy".into());
        record.ml_confidence = Some(0.92);
        record.alerts.frost.push(TemperatureAlert {
            date: "2025-01-03".into(),
            temp: 2.1,
        });
        record.soil_samples.push(SoilSample {
            lat: 23.01,
            lng: 72.50,
            moisture: Some(0.31),
            date: Some("2025-01-01".into()),
        });
        record.soil_moisture_scalar = Some(0.27);

        let json = serde_json::to_string(&record).unwrap();
        let back: NormalizedAnalytics = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_from_canonical_tolerates_garbage() {
        assert_eq!(
            NormalizedAnalytics::from_canonical(&json!(null)),
            NormalizedAnalytics::default()
        );
        assert_eq!(
            NormalizedAnalytics::from_canonical(&json!([1, 2, 3])),
            NormalizedAnalytics::default()
        );
    }

    #[test]
    fn test_alerts_from_value_drops_malformed_entries() {
        let alerts = Alerts::from_value(&json!({
            "frost": [
                {"date": "2025-01-03", "temp": 2.1},
                {"temp": 1.0},
                {"date": "2025-01-04", "temp": "cold"}
            ]
        }));
        assert_eq!(alerts.frost.len(), 1);
        assert_eq!(alerts.frost[0].date, "2025-01-03");
        assert!(alerts.heat.is_empty());
    }
}
