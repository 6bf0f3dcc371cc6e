//! Shared business logic behind the REST handlers.
//!
//! The service owns the read-only data context; every call resolves its own
//! filter, so concurrent requests never share mutable state.

use serde::Serialize;
use std::sync::Arc;

use crate::context::{DataContext, DatasetOverview};
use crate::dashboard::{
    build_dashboard, hourly_profile, station_details, DashboardRequest, ResultBundle,
    StationRankDetail,
};
use crate::error::Result;
use crate::filter::FilterCriteria;
use crate::views::{self, HourlyPoint, RiskClassification};

// ============================================================================
// Data Structures
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct StationsResult {
    pub filter: FilterCriteria,
    pub stations: Vec<StationRankDetail>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HourlyResult {
    pub filter: FilterCriteria,
    pub hours: Vec<HourlyPoint>,
}

// ============================================================================
// Dashboard Service
// ============================================================================

#[derive(Debug, Clone)]
pub struct DashboardService {
    context: Arc<DataContext>,
}

impl DashboardService {
    pub fn new(context: DataContext) -> Self {
        Self {
            context: Arc::new(context),
        }
    }

    pub fn dashboard(&self, request: &DashboardRequest) -> Result<ResultBundle> {
        let criteria = request.resolve(&self.context)?;
        Ok(build_dashboard(&self.context, &criteria))
    }

    pub fn cities(&self) -> Vec<String> {
        views::cities_list(&self.context.city_day)
    }

    pub fn risks(&self) -> RiskClassification {
        views::classify_risks(&self.context.risk_scores)
    }

    pub fn stations(&self, request: &DashboardRequest) -> Result<StationsResult> {
        let criteria = request.resolve(&self.context)?;
        let stations = station_details(&self.context, &criteria);
        Ok(StationsResult {
            filter: criteria,
            stations,
        })
    }

    pub fn hourly(&self, request: &DashboardRequest) -> Result<HourlyResult> {
        let criteria = request.resolve(&self.context)?;
        let hours = hourly_profile(&self.context, &criteria);
        Ok(HourlyResult {
            filter: criteria,
            hours,
        })
    }

    pub fn datasets(&self) -> DatasetOverview {
        self.context.overview()
    }
}
