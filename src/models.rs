//! CSV row shapes and the typed records the dashboard works on.
//!
//! Raw rows mirror the renamed columns and keep every value optional; the
//! `From` conversions trim keys and parse dates leniently.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::dates::{parse_date, parse_datetime};

/// Raw row of the city-day table, after column renaming
#[derive(Debug, Deserialize)]
pub struct CityDayRow {
    pub city: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub aqi: Option<f64>,
}

/// Raw row of the station-day table
#[derive(Debug, Deserialize)]
pub struct StationDayRow {
    pub station: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub aqi: Option<f64>,
}

/// Raw row of the city-hour table
#[derive(Debug, Deserialize)]
pub struct CityHourRow {
    pub city: String,
    #[serde(default)]
    pub datetime: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub aqi: Option<f64>,
}

/// Raw row of the station-hour table
#[derive(Debug, Deserialize)]
pub struct StationHourRow {
    pub station: String,
    #[serde(default)]
    pub datetime: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub aqi: Option<f64>,
}

/// Raw row of the risk-score table
#[derive(Debug, Deserialize)]
pub struct RiskScoreRow {
    pub city: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub risk_score: Option<f64>,
}

/// Raw row of the station metadata table
#[derive(Debug, Deserialize)]
pub struct StationRow {
    pub station: String,
    #[serde(default)]
    pub station_name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Daily AQI reading for a city
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AqiRecord {
    pub city: String,
    pub date: Option<NaiveDate>,
    pub aqi: Option<f64>,
}

/// Daily AQI reading for a monitoring station
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationRecord {
    pub station: String,
    pub date: Option<NaiveDate>,
    pub aqi: Option<f64>,
}

/// Hourly AQI reading for a city
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityHourRecord {
    pub city: String,
    pub datetime: Option<NaiveDateTime>,
    pub aqi: Option<f64>,
}

/// Hourly AQI reading for a station
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationHourRecord {
    pub station: String,
    pub datetime: Option<NaiveDateTime>,
    pub aqi: Option<f64>,
}

/// Precomputed risk score, one per city
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskRecord {
    pub city: String,
    pub risk_score: f64,
}

/// Station metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationInfo {
    pub station: String,
    pub station_name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub status: Option<String>,
}

/// Policy tier derived from a risk score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskTier {
    Severe,
    High,
    Moderate,
    Low,
}

impl RiskTier {
    /// Thresholds are exclusive on the lower side: 300 is High, 150 is Low.
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s > 300.0 => RiskTier::Severe,
            s if s > 200.0 => RiskTier::High,
            s if s > 150.0 => RiskTier::Moderate,
            _ => RiskTier::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Severe => "Severe",
            RiskTier::High => "High",
            RiskTier::Moderate => "Moderate",
            RiskTier::Low => "Low",
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl From<CityDayRow> for AqiRecord {
    fn from(row: CityDayRow) -> Self {
        Self {
            city: row.city.trim().to_string(),
            date: row.date.as_deref().and_then(parse_date),
            aqi: row.aqi.filter(|v| v.is_finite()),
        }
    }
}

impl From<StationDayRow> for StationRecord {
    fn from(row: StationDayRow) -> Self {
        Self {
            station: row.station.trim().to_string(),
            date: row.date.as_deref().and_then(parse_date),
            aqi: row.aqi.filter(|v| v.is_finite()),
        }
    }
}

impl From<CityHourRow> for CityHourRecord {
    fn from(row: CityHourRow) -> Self {
        Self {
            city: row.city.trim().to_string(),
            datetime: row.datetime.as_deref().and_then(parse_datetime),
            aqi: row.aqi.filter(|v| v.is_finite()),
        }
    }
}

impl From<StationHourRow> for StationHourRecord {
    fn from(row: StationHourRow) -> Self {
        Self {
            station: row.station.trim().to_string(),
            datetime: row.datetime.as_deref().and_then(parse_datetime),
            aqi: row.aqi.filter(|v| v.is_finite()),
        }
    }
}

impl From<StationRow> for StationInfo {
    fn from(row: StationRow) -> Self {
        Self {
            station: row.station.trim().to_string(),
            station_name: non_blank(row.station_name),
            city: non_blank(row.city),
            state: non_blank(row.state),
            status: non_blank(row.status),
        }
    }
}

impl RiskScoreRow {
    /// Rows without a usable score cannot be tiered and are dropped.
    pub fn to_record(&self) -> Option<RiskRecord> {
        self.risk_score
            .filter(|s| s.is_finite())
            .map(|risk_score| RiskRecord {
                city: self.city.trim().to_string(),
                risk_score,
            })
    }
}
