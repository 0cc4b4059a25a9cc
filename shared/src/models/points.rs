//! Map visualization point and marker styling
//!
//! The styling half is advisory for rendering, not a data contract, but it
//! lives here so the server's points endpoint and the browser (via WASM)
//! band and size markers identically.

use serde::{Deserialize, Serialize};

/// A map-renderable soil moisture sample. Derived per render from the
/// normalized record, never persisted on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizationPoint {
    pub lat: f64,
    pub lng: f64,
    pub moisture: Option<f64>,
    pub date: Option<String>,
}

/// Soil moisture color band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoistureBand {
    CriticalLow,
    Low,
    Moderate,
    Adequate,
    High,
    Unknown,
}

/// Moisture below this renders with an attention halo.
pub const CRITICAL_MOISTURE: f64 = 0.12;

/// Moisture below this starts growing the marker radius.
pub const RADIUS_GROWTH_MOISTURE: f64 = 0.30;

const BASE_RADIUS_PX: f64 = 6.0;
const MAX_RADIUS_PX: f64 = 14.0;

impl MoistureBand {
    pub fn classify(moisture: Option<f64>) -> Self {
        let Some(m) = moisture else {
            return MoistureBand::Unknown;
        };
        if !m.is_finite() {
            return MoistureBand::Unknown;
        }
        if m < CRITICAL_MOISTURE {
            MoistureBand::CriticalLow
        } else if m < 0.20 {
            MoistureBand::Low
        } else if m < 0.35 {
            MoistureBand::Moderate
        } else if m < 0.6 {
            MoistureBand::Adequate
        } else {
            MoistureBand::High
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            MoistureBand::CriticalLow => "#d32f2f",
            MoistureBand::Low => "#f57c00",
            MoistureBand::Moderate => "#fbc02d",
            MoistureBand::Adequate => "#7cb342",
            MoistureBand::High => "#1976d2",
            MoistureBand::Unknown => "#9e9e9e",
        }
    }
}

/// Screen treatment for one marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerStyle {
    pub color: String,
    pub radius_px: f64,
    pub halo: Option<Halo>,
}

/// Wide low-opacity ring drawing attention to critically dry points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Halo {
    pub radius_px: f64,
    pub opacity: f64,
}

/// Style a marker for a moisture value. Radius grows as moisture falls
/// below 0.30; critically dry points get a halo; unknown moisture renders
/// grey at base size.
pub fn marker_style(moisture: Option<f64>) -> MarkerStyle {
    let band = MoistureBand::classify(moisture);
    let radius_px = match moisture {
        Some(m) if m.is_finite() && m < RADIUS_GROWTH_MOISTURE => {
            let grown = BASE_RADIUS_PX + (RADIUS_GROWTH_MOISTURE - m) / RADIUS_GROWTH_MOISTURE * 8.0;
            grown.min(MAX_RADIUS_PX)
        }
        _ => BASE_RADIUS_PX,
    };
    let halo = (band == MoistureBand::CriticalLow).then(|| Halo {
        radius_px: radius_px * 2.0,
        opacity: 0.15,
    });

    MarkerStyle {
        color: band.color().to_owned(),
        radius_px,
        halo,
    }
}
