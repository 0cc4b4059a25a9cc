//! Analytics provider client
//!
//! Talks to the remote analytics service that computes satellite and
//! weather derived metrics for a field polygon. The response shape is
//! deliberately treated as opaque JSON here; reconciliation into the
//! canonical model happens in the normalizer, not at the wire.

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::config::ProviderConfig;
use crate::error::{AppError, AppResult};
use shared::Vertex;

/// Analytics provider API client
#[derive(Clone)]
pub struct ProviderClient {
    client: Client,
    base_url: String,
}

/// Request body for an analytics run
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsRequest {
    /// Canonical polygon, longitude first
    pub coordinates: Vec<Vertex>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub farm_id: String,
    pub force_refresh: bool,
}

impl ProviderClient {
    /// Create a new ProviderClient from configuration
    pub fn new(config: &ProviderConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Create a new ProviderClient with custom base URL (for testing)
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    /// Run one analytics request and return the raw payload.
    ///
    /// A top-level `error` field is the provider's own failure channel and
    /// comes back as `ProviderError` with the message untouched; transport
    /// problems and unparseable bodies come back as `ProviderUnavailable`.
    pub async fn fetch_analytics(&self, request: &AnalyticsRequest) -> AppResult<Value> {
        let url = format!("{}/analytics", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::ProviderUnavailable(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ProviderUnavailable(format!(
                "{} - {}",
                status, body
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| AppError::ProviderUnavailable(format!("invalid response body: {}", e)))?;

        if let Some(message) = provider_reported_error(&payload) {
            return Err(AppError::ProviderError(message));
        }

        Ok(payload)
    }
}

/// The provider signals its own failures inside a 200 response; a non-null
/// top-level `error` field short-circuits everything downstream.
fn provider_reported_error(payload: &Value) -> Option<String> {
    match payload.get("error")? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
