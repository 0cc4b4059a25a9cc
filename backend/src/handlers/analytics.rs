//! HTTP handlers for analytics endpoints
//!
//! Farm documents travel with the request body; there is no server-side
//! farm registry. All three views funnel through the same resolve path,
//! so they share cache entries for the same farm and range.

use axum::{extract::State, Json};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};
use crate::services::{normalize, points, AnalyticsService};
use crate::AppState;
use shared::{marker_style, DateRange, FarmDocument, MarkerStyle, NormalizedAnalytics};

#[derive(Debug, Deserialize)]
pub struct DashboardRequest {
    pub farm: FarmDocument,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub force_refresh: bool,
}

/// Dashboard view: the full normalized analytics record.
pub async fn get_dashboard(
    State(state): State<AppState>,
    Json(request): Json<DashboardRequest>,
) -> AppResult<Json<NormalizedAnalytics>> {
    let range = resolve_range(request.start_date, request.end_date)?;
    let analytics = state
        .analytics
        .resolve(&request.farm, range, request.force_refresh)
        .await?;
    Ok(Json(analytics))
}

#[derive(Debug, Deserialize)]
pub struct InsightsRequest {
    pub farm: FarmDocument,
    #[serde(default)]
    pub force_refresh: bool,
}

#[derive(Debug, Serialize)]
pub struct InsightsResponse {
    pub analytics: NormalizedAnalytics,
    pub summary: Map<String, Value>,
}

/// Insights view: the record plus per-family summary aggregates over
/// the provider's default reporting window.
pub async fn get_insights(
    State(state): State<AppState>,
    Json(request): Json<InsightsRequest>,
) -> AppResult<Json<InsightsResponse>> {
    let analytics = state
        .analytics
        .resolve(&request.farm, None, request.force_refresh)
        .await?;
    let summary = normalize::summarize(&analytics);
    Ok(Json(InsightsResponse { analytics, summary }))
}

#[derive(Debug, Serialize)]
pub struct StyledPoint {
    pub lat: f64,
    pub lng: f64,
    pub moisture: Option<f64>,
    pub date: Option<String>,
    pub style: MarkerStyle,
}

/// Map view: moisture visualization points with marker styling attached.
/// Takes the same body as the dashboard so both views share cache entries
/// for the same farm and range.
pub async fn get_points(
    State(state): State<AppState>,
    Json(request): Json<DashboardRequest>,
) -> AppResult<Json<Vec<StyledPoint>>> {
    let range = resolve_range(request.start_date, request.end_date)?;
    let polygon = AnalyticsService::canonical_polygon(&request.farm)?;
    let analytics = state
        .analytics
        .resolve(&request.farm, range, request.force_refresh)
        .await?;
    let points = points::derive_points(&analytics, &polygon)
        .into_iter()
        .map(|p| StyledPoint {
            lat: p.lat,
            lng: p.lng,
            moisture: p.moisture,
            style: marker_style(p.moisture),
            date: p.date,
        })
        .collect();
    Ok(Json(points))
}

/// Dashboard date filters arrive as a pair or not at all.
fn resolve_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> AppResult<Option<DateRange>> {
    match (start, end) {
        (Some(start), Some(end)) => Ok(Some(DateRange::new(start, end))),
        (None, None) => Ok(None),
        _ => Err(AppError::Validation {
            field: "date_range".to_string(),
            message: "start_date and end_date must be provided together".to_string(),
        }),
    }
}
