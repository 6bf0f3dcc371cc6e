//! REST API handlers for the AQI dashboard
//!
//! These handlers use the shared DashboardService.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Form, Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, warn};

use super::service::{DashboardService, HourlyResult, StationsResult};
use crate::aggregate::round2;
use crate::context::DatasetOverview;
use crate::dashboard::{DashboardRequest, ResultBundle};
use crate::error::DashboardError;
use crate::views::RiskClassification;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct CitiesResponse {
    pub cities: Vec<String>,
}

#[derive(Serialize)]
pub struct RisksResponse {
    pub risks: Vec<RiskEntry>,
}

#[derive(Serialize)]
pub struct RiskEntry {
    pub city: String,
    pub risk_score: f64,
    pub tier: String,
}

impl From<RiskClassification> for RisksResponse {
    fn from(r: RiskClassification) -> Self {
        let risks = r
            .list
            .into_iter()
            .zip(r.values)
            .map(|((city, tier), risk_score)| RiskEntry {
                city,
                risk_score: round2(risk_score),
                tier: tier.to_string(),
            })
            .collect();
        Self { risks }
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(e: DashboardError) -> ApiError {
    let status = if e.is_client_error() {
        warn!("Rejected request: {}", e);
        StatusCode::BAD_REQUEST
    } else {
        error!("Request failed: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(ErrorResponse { error: e.to_string() }))
}

// ============================================================================
// Handlers
// ============================================================================

pub type AppState = Arc<DashboardService>;

/// GET /api/v1/health
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

/// GET /api/v1/dashboard
pub async fn get_dashboard(
    State(service): State<AppState>,
    Query(params): Query<DashboardRequest>,
) -> Result<Json<ResultBundle>, ApiError> {
    service.dashboard(&params).map(Json).map_err(api_error)
}

/// POST /api/v1/dashboard (form-encoded)
pub async fn post_dashboard(
    State(service): State<AppState>,
    Form(params): Form<DashboardRequest>,
) -> Result<Json<ResultBundle>, ApiError> {
    service.dashboard(&params).map(Json).map_err(api_error)
}

/// GET /api/v1/cities
pub async fn get_cities(State(service): State<AppState>) -> Json<CitiesResponse> {
    Json(CitiesResponse {
        cities: service.cities(),
    })
}

/// GET /api/v1/risks
pub async fn get_risks(State(service): State<AppState>) -> Json<RisksResponse> {
    Json(RisksResponse::from(service.risks()))
}

/// GET /api/v1/stations
pub async fn get_stations(
    State(service): State<AppState>,
    Query(params): Query<DashboardRequest>,
) -> Result<Json<StationsResult>, ApiError> {
    service.stations(&params).map(Json).map_err(api_error)
}

/// GET /api/v1/hourly
pub async fn get_hourly(
    State(service): State<AppState>,
    Query(params): Query<DashboardRequest>,
) -> Result<Json<HourlyResult>, ApiError> {
    service.hourly(&params).map(Json).map_err(api_error)
}

/// GET /api/v1/datasets
pub async fn get_datasets(State(service): State<AppState>) -> Json<DatasetOverview> {
    Json(service.datasets())
}
