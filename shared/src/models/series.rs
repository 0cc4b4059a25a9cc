//! Metric family catalogue
//!
//! Every time-series metric the provider may send belongs to one of a fixed
//! set of families. Each family carries its canonical output key, the value
//! key its samples are written under, the ordered field names accepted on
//! input, the top-level and nested places its array may arrive, its unit
//! policy, and how it aggregates into a summary figure. The whole
//! reconciliation pipeline is driven off this table; adding a family means
//! adding a variant here, nothing else.

/// One sample of a normalized metric time series.
///
/// Samples keep input order (assumed chronological, never re-sorted). A
/// null value is a recorded gap, not an absent sample.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetricSample {
    pub date: Option<String>,
    pub value: Option<f64>,
}

impl MetricSample {
    pub fn new(date: impl Into<String>, value: f64) -> Self {
        Self {
            date: Some(date.into()),
            value: Some(value),
        }
    }
}

/// Unit handling applied to a family's resolved values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitPolicy {
    /// Pass values through untouched.
    None,
    /// Values above 100 are read as Kelvin and converted to Celsius.
    /// No surface temperature plausibly exceeds 100 degrees Celsius, so
    /// the threshold discriminates the two units without a unit tag.
    KelvinAbove100,
}

impl UnitPolicy {
    pub fn apply(self, value: f64) -> f64 {
        match self {
            UnitPolicy::None => value,
            UnitPolicy::KelvinAbove100 => {
                if value > 100.0 {
                    value - 273.15
                } else {
                    value
                }
            }
        }
    }
}

/// How a family's non-null values collapse into one summary figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Mean,
    Sum,
}

impl Aggregate {
    /// None when there is nothing to aggregate.
    pub fn apply(self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        let sum: f64 = values.iter().sum();
        match self {
            Aggregate::Sum => Some(sum),
            Aggregate::Mean => Some(sum / values.len() as f64),
        }
    }
}

/// The fixed enumerated set of metric families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MetricFamily {
    Ndvi,
    Evi,
    Gndvi,
    Savi,
    Msavi,
    Arvi,
    Ndwi,
    SoilMoisture,
    SoilTemperature,
    Rainfall,
    Temperature,
    Dewpoint,
    SolarRadiation,
    WindSpeed,
    Evapotranspiration,
    Lai,
    CanopyFraction,
    ChlorophyllIndex,
    WaterStressIndex,
    CanopyTemperature,
}

impl MetricFamily {
    pub const ALL: [MetricFamily; 20] = [
        MetricFamily::Ndvi,
        MetricFamily::Evi,
        MetricFamily::Gndvi,
        MetricFamily::Savi,
        MetricFamily::Msavi,
        MetricFamily::Arvi,
        MetricFamily::Ndwi,
        MetricFamily::SoilMoisture,
        MetricFamily::SoilTemperature,
        MetricFamily::Rainfall,
        MetricFamily::Temperature,
        MetricFamily::Dewpoint,
        MetricFamily::SolarRadiation,
        MetricFamily::WindSpeed,
        MetricFamily::Evapotranspiration,
        MetricFamily::Lai,
        MetricFamily::CanopyFraction,
        MetricFamily::ChlorophyllIndex,
        MetricFamily::WaterStressIndex,
        MetricFamily::CanopyTemperature,
    ];

    /// Canonical top-level key on the normalized record.
    pub fn key(self) -> &'static str {
        match self {
            MetricFamily::Ndvi => "ndvi_timeseries",
            MetricFamily::Evi => "evi_timeseries",
            MetricFamily::Gndvi => "gndvi_timeseries",
            MetricFamily::Savi => "savi_timeseries",
            MetricFamily::Msavi => "msavi_timeseries",
            MetricFamily::Arvi => "arvi_timeseries",
            MetricFamily::Ndwi => "ndwi_timeseries",
            MetricFamily::SoilMoisture => "soil_moisture",
            MetricFamily::SoilTemperature => "soil_temperature",
            MetricFamily::Rainfall => "rainfall",
            MetricFamily::Temperature => "temperature",
            MetricFamily::Dewpoint => "dewpoint",
            MetricFamily::SolarRadiation => "solar_radiation",
            MetricFamily::WindSpeed => "wind_speed",
            MetricFamily::Evapotranspiration => "evapotranspiration",
            MetricFamily::Lai => "lai_timeseries",
            MetricFamily::CanopyFraction => "canopy_fraction",
            MetricFamily::ChlorophyllIndex => "chlorophyll_index",
            MetricFamily::WaterStressIndex => "water_stress_index",
            MetricFamily::CanopyTemperature => "canopy_temperature",
        }
    }

    /// Key each normalized sample's value is written under, fixed per
    /// family regardless of the input name it was read from.
    pub fn value_key(self) -> &'static str {
        match self {
            MetricFamily::Ndvi => "ndvi",
            MetricFamily::Evi => "evi",
            MetricFamily::Gndvi => "gndvi",
            MetricFamily::Savi => "savi",
            MetricFamily::Msavi => "msavi",
            MetricFamily::Arvi => "arvi",
            MetricFamily::Ndwi => "ndwi",
            MetricFamily::SoilMoisture => "moisture",
            MetricFamily::SoilTemperature => "soil_temp",
            MetricFamily::Rainfall => "rain_mm",
            MetricFamily::Temperature => "temp",
            MetricFamily::Dewpoint => "dewpoint",
            MetricFamily::SolarRadiation => "solar",
            MetricFamily::WindSpeed => "wind_speed",
            MetricFamily::Evapotranspiration => "evap",
            MetricFamily::Lai => "lai",
            MetricFamily::CanopyFraction => "canopy_frac",
            MetricFamily::ChlorophyllIndex => "chlorophyll",
            MetricFamily::WaterStressIndex => "wsi",
            MetricFamily::CanopyTemperature => "canopy_temp",
        }
    }

    /// Sample field names accepted on input, tried in order before the
    /// first-numeric-field fallback.
    pub fn accepted_names(self) -> &'static [&'static str] {
        match self {
            MetricFamily::Ndvi => &["ndvi"],
            MetricFamily::Evi => &["evi"],
            MetricFamily::Gndvi => &["gndvi"],
            MetricFamily::Savi => &["savi"],
            MetricFamily::Msavi => &["msavi"],
            MetricFamily::Arvi => &["arvi"],
            MetricFamily::Ndwi => &["ndwi"],
            MetricFamily::SoilMoisture => &["moisture", "soil_moisture"],
            MetricFamily::SoilTemperature => &["soil_temp", "soil_temperature", "temp"],
            MetricFamily::Rainfall => &["rain_mm", "rain", "rainfall", "precip_mm"],
            MetricFamily::Temperature => &["temp", "temperature"],
            MetricFamily::Dewpoint => &["dewpoint", "dew_point"],
            MetricFamily::SolarRadiation => &["solar", "solar_radiation", "radiation"],
            MetricFamily::WindSpeed => &["wind_speed", "wind"],
            MetricFamily::Evapotranspiration => &["evap", "et", "evapotranspiration"],
            MetricFamily::Lai => &["lai"],
            MetricFamily::CanopyFraction => &["canopy_frac", "canopy_fraction", "fcover"],
            MetricFamily::ChlorophyllIndex => &["chlorophyll", "ci", "chlorophyll_index"],
            MetricFamily::WaterStressIndex => &["wsi", "water_stress", "cwsi"],
            MetricFamily::CanopyTemperature => &["canopy_temp", "canopy_temperature", "temp"],
        }
    }

    /// Top-level payload keys the family's array may arrive under, tried
    /// in order.
    pub fn source_keys(self) -> &'static [&'static str] {
        match self {
            MetricFamily::Ndvi => &["ndvi_timeseries", "ndvi"],
            MetricFamily::Evi => &["evi_timeseries", "evi"],
            MetricFamily::Gndvi => &["gndvi_timeseries", "gndvi"],
            MetricFamily::Savi => &["savi_timeseries", "savi"],
            MetricFamily::Msavi => &["msavi_timeseries", "msavi"],
            MetricFamily::Arvi => &["arvi_timeseries", "arvi"],
            MetricFamily::Ndwi => &["ndwi_timeseries", "ndwi"],
            MetricFamily::SoilMoisture => &["soil_moisture", "soil_moisture_timeseries"],
            MetricFamily::SoilTemperature => &["soil_temperature"],
            MetricFamily::Rainfall => &["rainfall", "precipitation"],
            MetricFamily::Temperature => {
                &["temperature", "temperature_timeseries", "air_temperature"]
            }
            MetricFamily::Dewpoint => &["dewpoint"],
            MetricFamily::SolarRadiation => &["solar_radiation"],
            MetricFamily::WindSpeed => &["wind_speed"],
            MetricFamily::Evapotranspiration => &["evapotranspiration"],
            MetricFamily::Lai => &["lai_timeseries", "lai"],
            MetricFamily::CanopyFraction => &["canopy_fraction"],
            MetricFamily::ChlorophyllIndex => &["chlorophyll_index"],
            MetricFamily::WaterStressIndex => &["water_stress_index"],
            MetricFamily::CanopyTemperature => &["canopy_temperature"],
        }
    }

    /// Nested grouping the array is promoted from when no top-level key
    /// holds it, as `(container, key)`.
    pub fn nested_source(self) -> Option<(&'static str, &'static str)> {
        match self {
            MetricFamily::Temperature => Some(("weather", "temperature")),
            MetricFamily::Rainfall => Some(("weather", "rainfall")),
            MetricFamily::Dewpoint => Some(("weather", "dewpoint")),
            MetricFamily::SolarRadiation => Some(("weather", "solar_radiation")),
            MetricFamily::WindSpeed => Some(("weather", "wind_speed")),
            MetricFamily::Evapotranspiration => Some(("weather", "evapotranspiration")),
            MetricFamily::SoilMoisture => Some(("soil", "moisture")),
            MetricFamily::SoilTemperature => Some(("soil", "temperature")),
            _ => None,
        }
    }

    pub fn unit_policy(self) -> UnitPolicy {
        match self {
            MetricFamily::Temperature
            | MetricFamily::SoilTemperature
            | MetricFamily::CanopyTemperature => UnitPolicy::KelvinAbove100,
            _ => UnitPolicy::None,
        }
    }

    /// Rainfall totals; every other family averages.
    pub fn aggregate(self) -> Aggregate {
        match self {
            MetricFamily::Rainfall => Aggregate::Sum,
            _ => Aggregate::Mean,
        }
    }
}
