//! Analytics reconciliation orchestration
//!
//! Single entry point both consumer views go through: canonicalize the
//! farm polygon, consult the cache, call the provider with bounded
//! retries, normalize, cache, and apply the farm document's own soil
//! profile on the way out.

use std::sync::Arc;

use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::external::analytics::{AnalyticsRequest, ProviderClient};
use crate::services::cache::AnalyticsCache;
use crate::services::normalize;
use shared::{
    cache_key, resolve_coordinates, validate_date_range, validate_polygon, AxisOrder, DateRange,
    FarmDocument, NormalizedAnalytics, Vertex,
};

#[derive(Clone)]
pub struct AnalyticsService {
    provider: ProviderClient,
    cache: Arc<AnalyticsCache>,
    max_retries: u32,
}

impl AnalyticsService {
    pub fn new(provider: ProviderClient, cache: Arc<AnalyticsCache>, max_retries: u32) -> Self {
        Self {
            provider,
            cache,
            max_retries,
        }
    }

    /// Canonicalize a farm's stored coordinates into `[lng, lat]` vertex
    /// order and bounds-check the result. The provider is never called
    /// with a degenerate polygon.
    pub fn canonical_polygon(farm: &FarmDocument) -> AppResult<Vec<Vertex>> {
        let polygon = resolve_coordinates(&farm.coordinates, AxisOrder::LngLat);
        validate_polygon(&polygon, AxisOrder::LngLat).map_err(|message| AppError::Validation {
            field: "coordinates".to_string(),
            message: message.to_string(),
        })?;
        Ok(polygon)
    }

    /// Resolve analytics for a farm: cached when fresh, fetched and
    /// normalized otherwise. `force_refresh` skips the cache lookup but
    /// still overwrites the entry with the new response.
    pub async fn resolve(
        &self,
        farm: &FarmDocument,
        range: Option<DateRange>,
        force_refresh: bool,
    ) -> AppResult<NormalizedAnalytics> {
        let polygon = Self::canonical_polygon(farm)?;
        if let Some(range) = &range {
            validate_date_range(range).map_err(|message| AppError::Validation {
                field: "date_range".to_string(),
                message: message.to_string(),
            })?;
        }

        let key = cache_key(&farm.id, range.as_ref());
        if !force_refresh {
            if let Some(entry) = self.cache.get(&key).await {
                tracing::debug!("Analytics cache hit for {}", key);
                return Ok(apply_profile_override(farm, entry.response));
            }
        }

        tracing::info!(
            "Fetching analytics from provider for {} (force_refresh={})",
            key,
            force_refresh
        );
        let request = AnalyticsRequest {
            coordinates: polygon,
            start_date: range.as_ref().map(|r| r.start),
            end_date: range.as_ref().map(|r| r.end),
            farm_id: farm.id.clone(),
            force_refresh,
        };
        let payload = self.fetch_with_retries(&request).await?;
        let normalized = normalize::normalize(&payload);
        let entry = self.cache.put(key, normalized).await;
        Ok(apply_profile_override(farm, entry.response))
    }

    /// Number of entries currently cached, surfaced by the health check.
    pub async fn cached_entries(&self) -> usize {
        self.cache.entry_count().await
    }

    /// Retry transient provider failures up to the configured bound.
    /// Definitive provider errors pass straight through untouched.
    async fn fetch_with_retries(&self, request: &AnalyticsRequest) -> AppResult<Value> {
        let mut attempt = 0;
        loop {
            match self.provider.fetch_analytics(request).await {
                Err(AppError::ProviderUnavailable(message)) if attempt < self.max_retries => {
                    attempt += 1;
                    tracing::warn!("Provider attempt {} failed, retrying: {}", attempt, message);
                }
                other => return other,
            }
        }
    }
}

/// The farm document's own soil profile, when present and non-empty,
/// takes precedence over whatever the provider reported. The cached
/// entry keeps the provider's profile so the override never sticks.
fn apply_profile_override(
    farm: &FarmDocument,
    mut analytics: NormalizedAnalytics,
) -> NormalizedAnalytics {
    if let Some(details) = &farm.details {
        if !details.is_empty() {
            analytics.soil_profile = details.clone();
        }
    }
    analytics
}
