//! Process-wide, read-only dataset context.
//!
//! Built once at startup and shared (behind an `Arc`) by every request.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{info, warn};

use crate::config::DataFiles;
use crate::error::Result;
use crate::models::{
    AqiRecord, CityDayRow, CityHourRecord, CityHourRow, RiskRecord, RiskScoreRow, StationDayRow,
    StationHourRecord, StationHourRow, StationInfo, StationRecord, StationRow,
};
use crate::store::{load_table, RenameMap, Table};

pub const CITY_DAY_RENAMES: RenameMap = &[("City", "city"), ("Date", "date"), ("AQI", "aqi")];
pub const STATION_DAY_RENAMES: RenameMap =
    &[("StationId", "station"), ("Date", "date"), ("AQI", "aqi")];
pub const CITY_HOUR_RENAMES: RenameMap =
    &[("City", "city"), ("Datetime", "datetime"), ("AQI", "aqi")];
pub const STATION_HOUR_RENAMES: RenameMap =
    &[("StationId", "station"), ("Datetime", "datetime"), ("AQI", "aqi")];
pub const RISK_SCORE_RENAMES: RenameMap = &[
    ("City", "city"),
    ("LinearRegression_risk_score", "risk_score"),
];
pub const STATION_RENAMES: RenameMap = &[
    ("StationId", "station"),
    ("StationName", "station_name"),
    ("City", "city"),
    ("State", "state"),
    ("Status", "status"),
];

/// All datasets the dashboard reads from.
#[derive(Debug, Clone, Default)]
pub struct DataContext {
    pub city_day: Table<AqiRecord>,
    pub station_day: Table<StationRecord>,
    pub city_hour: Table<CityHourRecord>,
    pub station_hour: Table<StationHourRecord>,
    pub risk_scores: Table<RiskRecord>,
    pub stations: Table<StationInfo>,
}

/// Row counts and date coverage of the loaded datasets
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetOverview {
    pub city_day_rows: usize,
    pub station_day_rows: usize,
    pub city_hour_rows: usize,
    pub station_hour_rows: usize,
    pub risk_score_rows: usize,
    pub station_rows: usize,
    pub unparsed_city_day_dates: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

/// Hourly and station metadata tables are optional: an unreadable one is
/// logged and replaced by an empty table.
fn supplementary<T>(table: &str, loaded: Result<Table<T>>) -> Table<T> {
    loaded.unwrap_or_else(|e| {
        warn!(table, error = %e, "Ignoring unreadable supplementary table");
        Table::empty()
    })
}

impl DataContext {
    /// Loads every dataset. Missing files become empty tables; a schema
    /// error in a daily or risk table fails the load.
    pub fn load(files: &DataFiles) -> Result<Self> {
        let ctx = Self {
            city_day: load_table(
                &files.city_day,
                CITY_DAY_RENAMES,
                &["city", "date", "aqi"],
                |r: CityDayRow| Some(r.into()),
            )?,
            station_day: load_table(
                &files.station_day,
                STATION_DAY_RENAMES,
                &["station", "date", "aqi"],
                |r: StationDayRow| Some(r.into()),
            )?,
            city_hour: supplementary(
                "city_hour",
                load_table(
                    &files.city_hour,
                    CITY_HOUR_RENAMES,
                    &["city", "datetime", "aqi"],
                    |r: CityHourRow| Some(r.into()),
                ),
            ),
            station_hour: supplementary(
                "station_hour",
                load_table(
                    &files.station_hour,
                    STATION_HOUR_RENAMES,
                    &["station", "datetime", "aqi"],
                    |r: StationHourRow| Some(r.into()),
                ),
            ),
            risk_scores: load_table(
                &files.risk_scores,
                RISK_SCORE_RENAMES,
                &["city", "risk_score"],
                |r: RiskScoreRow| r.to_record(),
            )?,
            stations: supplementary(
                "stations",
                load_table(
                    &files.stations,
                    STATION_RENAMES,
                    &["station"],
                    |r: StationRow| Some(r.into()),
                ),
            ),
        };

        let unparsed = ctx.unparsed_city_day_dates() + ctx.unparsed_station_day_dates();
        if unparsed > 0 {
            warn!(rows = unparsed, "Rows with unparseable dates are excluded from date filters");
        }

        info!(
            city_day = ctx.city_day.len(),
            station_day = ctx.station_day.len(),
            risk_scores = ctx.risk_scores.len(),
            "Data context ready"
        );
        Ok(ctx)
    }

    /// Earliest and latest parsed date of the city-day table.
    pub fn city_day_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.city_day.iter().filter_map(|r| r.date);
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }

    fn unparsed_city_day_dates(&self) -> usize {
        self.city_day.iter().filter(|r| r.date.is_none()).count()
    }

    fn unparsed_station_day_dates(&self) -> usize {
        self.station_day.iter().filter(|r| r.date.is_none()).count()
    }

    /// Station id → metadata, for annotating rankings.
    pub fn station_index(&self) -> HashMap<&str, &StationInfo> {
        self.stations
            .iter()
            .map(|s| (s.station.as_str(), s))
            .collect()
    }

    pub fn overview(&self) -> DatasetOverview {
        let range = self.city_day_range();
        DatasetOverview {
            city_day_rows: self.city_day.len(),
            station_day_rows: self.station_day.len(),
            city_hour_rows: self.city_hour.len(),
            station_hour_rows: self.station_hour.len(),
            risk_score_rows: self.risk_scores.len(),
            station_rows: self.stations.len(),
            unparsed_city_day_dates: self.unparsed_city_day_dates(),
            first_date: range.map(|(lo, _)| lo),
            last_date: range.map(|(_, hi)| hi),
        }
    }
}
