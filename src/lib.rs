//! Air-quality dashboard backend.
//!
//! Loads the city/station AQI CSV datasets once, then answers dashboard
//! requests (city + date range) with summary metrics, a trend series, a
//! per-city heatmap, a station ranking and risk tiers.

pub mod aggregate;
pub mod api;
pub mod config;
pub mod context;
pub mod dashboard;
pub mod dates;
pub mod error;
pub mod filter;
pub mod models;
pub mod store;
pub mod views;

pub use context::DataContext;
pub use dashboard::{build_dashboard, DashboardRequest, ResultBundle};
pub use error::{DashboardError, Result};
