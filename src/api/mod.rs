//! HTTP API for the AQI dashboard
//!
//! All endpoints live under `/api/v1` and share one `DashboardService`.

pub mod handlers;
pub mod service;

pub use service::DashboardService;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn create_router(service: Arc<DashboardService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(handlers::health))
        // Dashboard: query string or the form submission
        .route(
            "/api/v1/dashboard",
            get(handlers::get_dashboard).post(handlers::post_dashboard),
        )
        .route("/api/v1/cities", get(handlers::get_cities))
        .route("/api/v1/risks", get(handlers::get_risks))
        .route("/api/v1/stations", get(handlers::get_stations))
        .route("/api/v1/hourly", get(handlers::get_hourly))
        .route("/api/v1/datasets", get(handlers::get_datasets))
        .with_state(service)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
