//! Derived views built from filtered tables: summary metrics, the trend of
//! the most polluted city, the per-city heatmap, the station ranking, risk
//! tiers, the city dropdown and the hourly profile.

use chrono::{NaiveDate, Timelike};
use serde::Serialize;
use std::collections::BTreeSet;

use crate::aggregate::{group_mean_count, mean, nunique, ranked_means, round2};
use crate::dates::format_iso;
use crate::filter::ALL_CITIES;
use crate::models::{AqiRecord, CityHourRecord, RiskRecord, RiskTier, StationRecord};
use crate::store::Table;

/// Number of trailing days kept in the trend series.
pub const TREND_WINDOW: usize = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryMetrics {
    pub num_cities: usize,
    pub num_stations: usize,
    pub avg_aqi: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrendSeries {
    /// City the series was drawn for, `None` when there was nothing to draw.
    pub city: Option<String>,
    pub dates: Vec<String>,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Heatmap {
    pub cities: Vec<String>,
    pub values: Vec<f64>,
    pub colors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationRank {
    pub station: String,
    pub count: usize,
    pub mean: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RiskClassification {
    pub list: Vec<(String, RiskTier)>,
    pub names: Vec<String>,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyPoint {
    pub hour: u32,
    pub count: usize,
    pub mean: f64,
}

pub fn summary(city_rows: &[&AqiRecord], station_rows: &[&StationRecord]) -> SummaryMetrics {
    // A filtered table whose AQI is entirely null also reports 0.
    let avg_aqi = mean(city_rows.iter().map(|r| r.aqi)).map_or(0.0, round2);

    SummaryMetrics {
        num_cities: nunique(city_rows, |r| r.city.as_str()),
        num_stations: nunique(station_rows, |r| r.station.as_str()),
        avg_aqi,
    }
}

/// Trend of the city with the highest mean AQI.
///
/// Ties on the mean go to the lexicographically smallest city name. The
/// city's rows are sorted by date (stable), null-AQI rows are dropped, and the
/// last [`TREND_WINDOW`] remain.
pub fn trend(city_rows: &[&AqiRecord]) -> TrendSeries {
    let means = group_mean_count(city_rows, |r| r.city.as_str(), |r| r.aqi);
    let Some(&(top_city, _)) = ranked_means(&means).first() else {
        return TrendSeries::default();
    };

    let mut points: Vec<(NaiveDate, f64)> = city_rows
        .iter()
        .filter(|r| r.city == top_city)
        .filter_map(|r| Some((r.date?, r.aqi?)))
        .collect();
    points.sort_by_key(|(date, _)| *date);

    let skip = points.len().saturating_sub(TREND_WINDOW);
    let (dates, values): (Vec<String>, Vec<f64>) = points
        .into_iter()
        .skip(skip)
        .map(|(date, aqi)| (format_iso(date), aqi))
        .unzip();

    TrendSeries {
        city: Some(top_city.to_string()),
        dates,
        values,
    }
}

/// `rgba(R, G, 0, 0.8)` shading from green (low) to red (`max`).
pub fn heat_color(value: f64, max: f64) -> String {
    let max = if max > 0.0 { max } else { 1.0 };
    let ratio = (value / max).clamp(0.0, 1.0);
    let red = (255.0 * ratio).round() as u8;
    let green = (255.0 * (1.0 - ratio)).round() as u8;
    format!("rgba({}, {}, 0, 0.8)", red, green)
}

/// Per-city mean AQI sorted descending, with one color per value.
/// Cities without any AQI value are left out.
pub fn heatmap(city_rows: &[&AqiRecord]) -> Heatmap {
    let means = group_mean_count(city_rows, |r| r.city.as_str(), |r| r.aqi);
    let ranked = ranked_means(&means);

    let max = ranked.first().map_or(1.0, |(_, v)| *v);
    let mut heatmap = Heatmap::default();
    for (city, value) in ranked {
        heatmap.cities.push(city.to_string());
        heatmap.values.push(value);
        heatmap.colors.push(heat_color(value, max));
    }
    heatmap
}

/// Stations by descending mean AQI; ties by station id. Stations without
/// any AQI value are left out.
pub fn station_ranking(station_rows: &[&StationRecord]) -> Vec<StationRank> {
    let stats = group_mean_count(station_rows, |r| r.station.as_str(), |r| r.aqi);
    ranked_means(&stats)
        .into_iter()
        .map(|(station, mean)| StationRank {
            station: station.to_string(),
            count: stats[station].count,
            mean,
        })
        .collect()
}

/// Tiers every risk row and orders them by descending score. Equal scores
/// keep their table order.
pub fn classify_risks(risks: &Table<RiskRecord>) -> RiskClassification {
    let mut sorted: Vec<&RiskRecord> = risks.iter().collect();
    sorted.sort_by(|a, b| b.risk_score.total_cmp(&a.risk_score));

    let mut out = RiskClassification::default();
    for risk in sorted {
        out.list
            .push((risk.city.clone(), RiskTier::from_score(risk.risk_score)));
        out.names.push(risk.city.clone());
        out.values.push(risk.risk_score);
    }
    out
}

/// `"All"` followed by every distinct city of the unfiltered table, sorted.
pub fn cities_list(city_day: &Table<AqiRecord>) -> Vec<String> {
    let distinct: BTreeSet<&str> = city_day
        .iter()
        .map(|r| r.city.as_str())
        .filter(|c| !c.is_empty() && *c != ALL_CITIES)
        .collect();

    std::iter::once(ALL_CITIES)
        .chain(distinct)
        .map(str::to_string)
        .collect()
}

/// Mean AQI per hour of day over hourly rows, ascending by hour.
pub fn hourly_profile(hour_rows: &[&CityHourRecord]) -> Vec<HourlyPoint> {
    let mut buckets = [(0.0f64, 0usize); 24];
    for row in hour_rows {
        if let (Some(dt), Some(aqi)) = (row.datetime, row.aqi) {
            let bucket = &mut buckets[dt.hour() as usize];
            bucket.0 += aqi;
            bucket.1 += 1;
        }
    }

    buckets
        .iter()
        .enumerate()
        .filter(|(_, (_, count))| *count > 0)
        .map(|(hour, (sum, count))| HourlyPoint {
            hour: hour as u32,
            count: *count,
            mean: sum / *count as f64,
        })
        .collect()
}
