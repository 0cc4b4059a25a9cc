//! Farm document model
//!
//! Stored by the dashboard's CRUD layer; this engine only reads it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A stored farm document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FarmDocument {
    pub id: String,
    pub name: Option<String>,
    /// Polygon in any shape the drawing UI or an import produced;
    /// resolved at request time, never rewritten in place.
    #[serde(default)]
    pub coordinates: Value,
    /// Soil profile captured at farm creation. Preferred over the
    /// provider's `soil_profile` for display.
    pub details: Option<Map<String, Value>>,
}
