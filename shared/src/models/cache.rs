//! Cache entry and key types

use serde::{Deserialize, Serialize};

use crate::models::NormalizedAnalytics;
use crate::types::DateRange;

/// One cached reconciliation result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    #[serde(rename = "cached_at")]
    pub cached_at_epoch_seconds: i64,
    pub response: NormalizedAnalytics,
}

/// Cache key for a farm and date range. Callers that let the provider pick
/// the range (the insights view) get `auto` placeholders, so an explicit
/// range and the auto path never collide.
pub fn cache_key(farm_id: &str, range: Option<&DateRange>) -> String {
    match range {
        Some(r) => format!("{}_{}_{}", farm_id, r.start, r.end),
        None => format!("{}_auto_auto", farm_id),
    }
}
