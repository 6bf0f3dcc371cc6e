//! Dashboard orchestration: resolve the request into a filter, filter the
//! daily tables once, run every view builder and assemble the result bundle.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::DataContext;
use crate::dates::parse_date;
use crate::error::{DashboardError, Result};
use crate::filter::{filter, filter_by_date, FilterCriteria, ALL_CITIES};
use crate::models::{AqiRecord, RiskTier, StationRecord};
use crate::views::{self, HourlyPoint, StationRank};

/// Date range used when the city-day table has no dates to derive one from.
pub fn fallback_range() -> (NaiveDate, NaiveDate) {
    (
        NaiveDate::from_ymd_opt(2015, 1, 1).unwrap_or(NaiveDate::MIN),
        NaiveDate::from_ymd_opt(2020, 7, 1).unwrap_or(NaiveDate::MAX),
    )
}

/// Raw request parameters, as submitted by the dashboard form or query
/// string. Empty strings count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardRequest {
    pub city: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_param(field: &'static str, value: Option<&str>, default: NaiveDate) -> Result<NaiveDate> {
    match value {
        None => Ok(default),
        Some(raw) => parse_date(raw).ok_or_else(|| {
            DashboardError::invalid_request(field, raw, "expected a date such as 2020-01-31")
        }),
    }
}

impl DashboardRequest {
    pub fn new(city: Option<&str>, start_date: Option<&str>, end_date: Option<&str>) -> Self {
        Self {
            city: city.map(str::to_string),
            start_date: start_date.map(str::to_string),
            end_date: end_date.map(str::to_string),
        }
    }

    /// Fills defaults from the data and validates the dates.
    ///
    /// Defaults: every city, and the full date span of the unfiltered
    /// city-day table (or [`fallback_range`] without one).
    pub fn resolve(&self, ctx: &DataContext) -> Result<FilterCriteria> {
        let (default_start, default_end) = ctx
            .city_day_range()
            .unwrap_or_else(fallback_range);

        let city = present(&self.city).unwrap_or(ALL_CITIES);
        let start_date = parse_param("start_date", present(&self.start_date), default_start)?;
        let end_date = parse_param("end_date", present(&self.end_date), default_end)?;

        Ok(FilterCriteria::new(city, start_date, end_date))
    }
}

/// Everything the dashboard page renders, one per request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultBundle {
    pub num_cities: usize,
    pub num_stations: usize,
    pub avg_aqi: f64,
    pub trend_dates: Vec<String>,
    pub trend_values: Vec<f64>,
    pub heatmap_cities: Vec<String>,
    pub heatmap_values: Vec<f64>,
    pub heatmap_colors: Vec<String>,
    pub stations_names: Vec<String>,
    pub stations_avg: Vec<f64>,
    pub risks_list: Vec<(String, RiskTier)>,
    pub risks_names: Vec<String>,
    pub risks_values: Vec<f64>,
    pub cities_list: Vec<String>,
    pub selected_city: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// The daily tables narrowed to one request's filter.
pub struct FilteredViews<'a> {
    pub city_day: Vec<&'a AqiRecord>,
    pub station_day: Vec<&'a StationRecord>,
}

impl<'a> FilteredViews<'a> {
    /// City-day rows get the city and date predicates. Station rows carry no
    /// city, so only the date range applies to them.
    pub fn new(ctx: &'a DataContext, criteria: &FilterCriteria) -> Self {
        Self {
            city_day: filter(&ctx.city_day, criteria),
            station_day: filter_by_date(&ctx.station_day, criteria),
        }
    }
}

pub fn build_dashboard(ctx: &DataContext, criteria: &FilterCriteria) -> ResultBundle {
    let filtered = FilteredViews::new(ctx, criteria);
    debug!(
        city = %criteria.city,
        start = %criteria.start_date,
        end = %criteria.end_date,
        city_rows = filtered.city_day.len(),
        station_rows = filtered.station_day.len(),
        "Filtered daily tables"
    );

    let summary = views::summary(&filtered.city_day, &filtered.station_day);
    let trend = views::trend(&filtered.city_day);
    let heatmap = views::heatmap(&filtered.city_day);
    let (stations_names, stations_avg): (Vec<String>, Vec<f64>) =
        views::station_ranking(&filtered.station_day)
            .into_iter()
            .map(|rank| (rank.station, rank.mean))
            .unzip();
    let risks = views::classify_risks(&ctx.risk_scores);

    ResultBundle {
        num_cities: summary.num_cities,
        num_stations: summary.num_stations,
        avg_aqi: summary.avg_aqi,
        trend_dates: trend.dates,
        trend_values: trend.values,
        heatmap_cities: heatmap.cities,
        heatmap_values: heatmap.values,
        heatmap_colors: heatmap.colors,
        stations_names,
        stations_avg,
        risks_list: risks.list,
        risks_names: risks.names,
        risks_values: risks.values,
        cities_list: views::cities_list(&ctx.city_day),
        selected_city: criteria.city.clone(),
        start_date: criteria.start_date,
        end_date: criteria.end_date,
    }
}

/// Station ranking annotated with station metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationRankDetail {
    #[serde(flatten)]
    pub rank: StationRank,
    pub station_name: Option<String>,
    pub city: Option<String>,
}

pub fn station_details(ctx: &DataContext, criteria: &FilterCriteria) -> Vec<StationRankDetail> {
    let rows = filter_by_date(&ctx.station_day, criteria);
    let index = ctx.station_index();

    views::station_ranking(&rows)
        .into_iter()
        .map(|rank| {
            let info = index.get(rank.station.as_str());
            StationRankDetail {
                station_name: info.and_then(|i| i.station_name.clone()),
                city: info.and_then(|i| i.city.clone()),
                rank,
            }
        })
        .collect()
}

pub fn hourly_profile(ctx: &DataContext, criteria: &FilterCriteria) -> Vec<HourlyPoint> {
    let rows = filter(&ctx.city_hour, criteria);
    views::hourly_profile(&rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CityHourRecord, RiskRecord, StationInfo};
    use crate::store::Table;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn city(name: &str, date: &str, aqi: Option<f64>) -> AqiRecord {
        AqiRecord {
            city: name.to_string(),
            date: parse_date(date),
            aqi,
        }
    }

    fn station(id: &str, date: &str, aqi: Option<f64>) -> StationRecord {
        StationRecord {
            station: id.to_string(),
            date: parse_date(date),
            aqi,
        }
    }

    fn scenario() -> DataContext {
        DataContext {
            city_day: Table::from_rows(vec![
                city("CityA", "2024-01-01", Some(400.0)),
                city("CityA", "2024-01-02", None),
                city("CityB", "2024-01-01", Some(100.0)),
            ]),
            station_day: Table::from_rows(vec![
                station("S1", "2024-01-01", Some(80.0)),
                station("S2", "2024-01-02", Some(120.0)),
                station("S2", "2024-01-09", Some(999.0)),
            ]),
            risk_scores: Table::from_rows(vec![
                RiskRecord { city: "CityB".into(), risk_score: 175.0 },
                RiskRecord { city: "CityA".into(), risk_score: 350.0 },
            ]),
            ..Default::default()
        }
    }

    #[test]
    fn test_end_to_end_scenario() {
        let ctx = scenario();
        let criteria = FilterCriteria::all_cities(ymd(2024, 1, 1), ymd(2024, 1, 2));
        let bundle = build_dashboard(&ctx, &criteria);

        assert_eq!(bundle.num_cities, 2);
        assert_eq!(bundle.num_stations, 2);
        assert_eq!(bundle.avg_aqi, 250.0);
        assert_eq!(bundle.trend_dates, vec!["2024-01-01"]);
        assert_eq!(bundle.trend_values, vec![400.0]);
        assert_eq!(bundle.heatmap_cities, vec!["CityA", "CityB"]);
        assert_eq!(bundle.heatmap_values, vec![400.0, 100.0]);
        assert_eq!(bundle.stations_names, vec!["S2", "S1"]);
        assert_eq!(bundle.stations_avg, vec![120.0, 80.0]);
        assert_eq!(bundle.risks_names, vec!["CityA", "CityB"]);
        assert_eq!(bundle.risks_list[0].1, RiskTier::Severe);
        assert_eq!(bundle.risks_list[1].1, RiskTier::Moderate);
        assert_eq!(bundle.cities_list, vec!["All", "CityA", "CityB"]);
        assert_eq!(bundle.selected_city, "All");
    }

    #[test]
    fn test_inverted_range_reports_zero() {
        let ctx = scenario();
        let criteria = FilterCriteria::all_cities(ymd(2024, 1, 2), ymd(2024, 1, 1));
        let bundle = build_dashboard(&ctx, &criteria);

        assert_eq!(bundle.num_cities, 0);
        assert_eq!(bundle.num_stations, 0);
        assert_eq!(bundle.avg_aqi, 0.0);
        assert!(bundle.trend_dates.is_empty());
        assert!(bundle.heatmap_cities.is_empty());
        assert!(bundle.stations_names.is_empty());
        // Risks and the dropdown ignore the filter.
        assert_eq!(bundle.risks_names.len(), 2);
        assert_eq!(bundle.cities_list.len(), 3);
    }

    #[test]
    fn test_city_filter_applies_to_city_rows_only() {
        let ctx = scenario();
        let criteria = FilterCriteria::new("CityB", ymd(2024, 1, 1), ymd(2024, 1, 31));
        let bundle = build_dashboard(&ctx, &criteria);

        assert_eq!(bundle.num_cities, 1);
        assert_eq!(bundle.avg_aqi, 100.0);
        assert_eq!(bundle.heatmap_cities, vec!["CityB"]);
        assert_eq!(bundle.num_stations, 2);
        assert_eq!(bundle.selected_city, "CityB");
    }

    #[test]
    fn test_missing_station_table_degrades() {
        let ctx = DataContext {
            station_day: Table::empty(),
            ..scenario()
        };
        let criteria = FilterCriteria::all_cities(ymd(2024, 1, 1), ymd(2024, 1, 2));
        let bundle = build_dashboard(&ctx, &criteria);

        assert_eq!(bundle.num_stations, 0);
        assert!(bundle.stations_names.is_empty());
        assert!(bundle.stations_avg.is_empty());
        assert_eq!(bundle.num_cities, 2);
    }

    #[test]
    fn test_everything_empty() {
        let ctx = DataContext::default();
        let criteria = DashboardRequest::default().resolve(&ctx).unwrap();
        assert_eq!((criteria.start_date, criteria.end_date), fallback_range());
        assert_eq!(criteria.start_date, ymd(2015, 1, 1));

        let bundle = build_dashboard(&ctx, &criteria);
        assert_eq!(bundle.cities_list, vec!["All"]);
        assert!(bundle.risks_list.is_empty());
        assert_eq!(bundle.avg_aqi, 0.0);
    }

    #[test]
    fn test_resolve_defaults_from_data() {
        let ctx = scenario();
        let criteria = DashboardRequest::new(None, Some(""), Some("  ")).resolve(&ctx).unwrap();
        assert_eq!(criteria.city, ALL_CITIES);
        assert_eq!(criteria.start_date, ymd(2024, 1, 1));
        assert_eq!(criteria.end_date, ymd(2024, 1, 2));
    }

    #[test]
    fn test_resolve_explicit_values() {
        let ctx = scenario();
        let criteria = DashboardRequest::new(Some("CityA"), Some("2023-12-01"), Some("2024-02-01"))
            .resolve(&ctx)
            .unwrap();
        assert_eq!(criteria, FilterCriteria::new("CityA", ymd(2023, 12, 1), ymd(2024, 2, 1)));
    }

    #[test]
    fn test_resolve_rejects_bad_date() {
        let ctx = scenario();
        let err = DashboardRequest::new(None, Some("2024-13-45"), None)
            .resolve(&ctx)
            .unwrap_err();
        assert!(err.is_client_error());
        assert!(err.to_string().contains("start_date"));
    }

    #[test]
    fn test_resolve_rejects_bad_end_date() {
        let ctx = scenario();
        let err = DashboardRequest::new(None, Some("2024-01-01"), Some("soon"))
            .resolve(&ctx)
            .unwrap_err();
        assert!(err.is_client_error());
        match err {
            DashboardError::InvalidRequest { field, value, .. } => {
                assert_eq!(field, "end_date");
                assert_eq!(value, "soon");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_station_details_annotated() {
        let ctx = DataContext {
            stations: Table::from_rows(vec![StationInfo {
                station: "S1".into(),
                station_name: Some("North Gate".into()),
                city: Some("CityA".into()),
                state: None,
                status: None,
            }]),
            ..scenario()
        };
        let criteria = FilterCriteria::all_cities(ymd(2024, 1, 1), ymd(2024, 1, 31));
        let details = station_details(&ctx, &criteria);

        assert_eq!(details.len(), 2);
        assert_eq!(details[0].rank.station, "S2");
        assert_eq!(details[0].rank.count, 2);
        assert_eq!(details[0].city, None);
        assert_eq!(details[1].station_name.as_deref(), Some("North Gate"));
    }

    #[test]
    fn test_hourly_profile_respects_city() {
        let at = |c: &str, h: u32, aqi: f64| CityHourRecord {
            city: c.into(),
            datetime: ymd(2024, 1, 1).and_hms_opt(h, 0, 0),
            aqi: Some(aqi),
        };
        let ctx = DataContext {
            city_hour: Table::from_rows(vec![at("CityA", 8, 10.0), at("CityB", 8, 90.0)]),
            ..scenario()
        };
        let criteria = FilterCriteria::new("CityA", ymd(2024, 1, 1), ymd(2024, 1, 1));
        let profile = hourly_profile(&ctx, &criteria);
        assert_eq!(profile.len(), 1);
        assert_eq!(profile[0].mean, 10.0);
    }

    #[test]
    fn test_bundle_serializes_expected_fields() {
        let ctx = scenario();
        let criteria = FilterCriteria::all_cities(ymd(2024, 1, 1), ymd(2024, 1, 2));
        let json = serde_json::to_value(build_dashboard(&ctx, &criteria)).unwrap();

        assert_eq!(json["start_date"], "2024-01-01");
        assert_eq!(json["risks_list"][0], serde_json::json!(["CityA", "Severe"]));
        assert_eq!(json.as_object().unwrap().len(), 17);
    }
}
