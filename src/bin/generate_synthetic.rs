//! Synthetic data generator for the AQI dashboard
//!
//! Writes all six dataset files with the column names the loaders expect,
//! including a controlled share of missing AQI values and unparseable dates
//! so the tolerant loading paths get exercised.
//!
//! Usage:
//!   cargo run --release --bin generate_synthetic -- [OPTIONS]
//!
//! Options:
//!   --output-dir <DIR>     Where to write the CSV files (default: data)
//!   --start-date <DATE>    First day of the daily tables (default: 2019-01-01)
//!   --days <N>             Number of days per city/station (default: 365)
//!   --hourly-days <N>      Trailing days that also get hourly rows (default: 14)
//!   --stations-per-city <N> (default: 3)
//!   --null-rate <F>        Probability of an empty AQI cell (default: 0.05)
//!   --bad-date-rate <F>    Probability of an unparseable date (default: 0.01)
//!   --seed <N>             Random seed for reproducibility (optional)

use anyhow::{Context, Result};
use aqi_dashboard::config::{
    CITY_DAY_FILE, CITY_HOUR_FILE, RISK_SCORES_FILE, STATIONS_FILE, STATION_DAY_FILE,
    STATION_HOUR_FILE,
};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use clap::Parser;
use csv::WriterBuilder;
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Synthetic AQI dataset generator
#[derive(Parser, Debug)]
#[command(name = "generate_synthetic")]
#[command(about = "Generate a synthetic air-quality dataset with controlled noise")]
struct Args {
    /// Output directory
    #[arg(long, default_value = "data")]
    output_dir: PathBuf,

    /// First day of the daily series
    #[arg(long, default_value = "2019-01-01")]
    start_date: NaiveDate,

    /// Days of daily readings
    #[arg(long, default_value = "365")]
    days: u32,

    /// Trailing days that also get hourly readings
    #[arg(long, default_value = "14")]
    hourly_days: u32,

    /// Monitoring stations per city
    #[arg(long, default_value = "3")]
    stations_per_city: usize,

    /// Probability of an empty AQI value (0.0 - 1.0)
    #[arg(long, default_value = "0.05")]
    null_rate: f64,

    /// Probability of an unparseable date (0.0 - 1.0)
    #[arg(long, default_value = "0.01")]
    bad_date_rate: f64,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,
}

/// City profile: name, state and baseline AQI
const CITIES: &[(&str, &str, f64)] = &[
    ("Ahmedabad", "Gujarat", 210.0),
    ("Bengaluru", "Karnataka", 95.0),
    ("Chennai", "Tamil Nadu", 100.0),
    ("Delhi", "Delhi", 260.0),
    ("Hyderabad", "Telangana", 110.0),
    ("Kolkata", "West Bengal", 140.0),
    ("Lucknow", "Uttar Pradesh", 220.0),
    ("Mumbai", "Maharashtra", 105.0),
    ("Patna", "Bihar", 235.0),
    ("Thiruvananthapuram", "Kerala", 70.0),
];

// Output rows use the published column names.

#[derive(Serialize)]
struct CityDayOut<'a> {
    #[serde(rename = "City")]
    city: &'a str,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "AQI")]
    aqi: Option<f64>,
}

#[derive(Serialize)]
struct StationDayOut<'a> {
    #[serde(rename = "StationId")]
    station: &'a str,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "AQI")]
    aqi: Option<f64>,
}

#[derive(Serialize)]
struct CityHourOut<'a> {
    #[serde(rename = "City")]
    city: &'a str,
    #[serde(rename = "Datetime")]
    datetime: String,
    #[serde(rename = "AQI")]
    aqi: Option<f64>,
}

#[derive(Serialize)]
struct StationHourOut<'a> {
    #[serde(rename = "StationId")]
    station: &'a str,
    #[serde(rename = "Datetime")]
    datetime: String,
    #[serde(rename = "AQI")]
    aqi: Option<f64>,
}

#[derive(Serialize)]
struct RiskOut<'a> {
    #[serde(rename = "City")]
    city: &'a str,
    #[serde(rename = "LinearRegression_risk_score")]
    risk_score: f64,
}

#[derive(Serialize)]
struct StationOut<'a> {
    #[serde(rename = "StationId")]
    station: &'a str,
    #[serde(rename = "StationName")]
    station_name: String,
    #[serde(rename = "City")]
    city: &'a str,
    #[serde(rename = "State")]
    state: &'a str,
    #[serde(rename = "Status")]
    status: &'a str,
}

struct Station {
    id: String,
    city: &'static str,
    state: &'static str,
    offset: f64,
}

/// Winter peak, monsoon trough.
fn seasonal_factor(date: NaiveDate) -> f64 {
    let angle = (date.ordinal() as f64 / 365.0) * std::f64::consts::TAU;
    1.0 + 0.35 * angle.cos()
}

/// Morning and evening rush-hour bumps.
fn diurnal_factor(hour: u32) -> f64 {
    match hour {
        7..=10 => 1.2,
        18..=22 => 1.3,
        0..=5 => 0.85,
        _ => 1.0,
    }
}

fn sample_aqi(base: f64, factor: f64, null_rate: f64, rng: &mut impl Rng) -> Option<f64> {
    if rng.gen::<f64>() < null_rate {
        return None;
    }
    let noise = rng.gen_range(-0.2..=0.2);
    let value = (base * factor * (1.0 + noise)).clamp(5.0, 500.0);
    Some(value.round())
}

fn format_date(date: NaiveDate, bad_date_rate: f64, rng: &mut impl Rng) -> String {
    if rng.gen::<f64>() < bad_date_rate {
        "not-a-date".to_string()
    } else {
        date.format("%Y-%m-%d").to_string()
    }
}

fn format_datetime(dt: NaiveDateTime, bad_date_rate: f64, rng: &mut impl Rng) -> String {
    if rng.gen::<f64>() < bad_date_rate {
        "not-a-datetime".to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

fn build_stations(per_city: usize, rng: &mut impl Rng) -> Vec<Station> {
    CITIES
        .iter()
        .flat_map(|&(city, state, _)| {
            let prefix: String = city.chars().take(2).collect::<String>().to_uppercase();
            (1..=per_city)
                .map(|n| Station {
                    id: format!("{}{:03}", prefix, n),
                    city,
                    state,
                    offset: rng.gen_range(0.8..=1.2),
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

fn baseline(city: &str) -> f64 {
    CITIES
        .iter()
        .find(|(name, _, _)| *name == city)
        .map_or(100.0, |(_, _, base)| *base)
}

fn writer(dir: &Path, file: &str) -> Result<csv::Writer<std::fs::File>> {
    let path = dir.join(file);
    WriterBuilder::new()
        .has_headers(true)
        .from_path(&path)
        .with_context(|| format!("cannot create {}", path.display()))
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!("🔧 Synthetic AQI Data Generator");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Output dir:       {}", args.output_dir.display());
    println!("Start date:       {}", args.start_date);
    println!("Days:             {}", args.days);
    println!("Hourly days:      {}", args.hourly_days);
    println!("Stations/city:    {}", args.stations_per_city);
    println!("Null AQI rate:    {:.1}%", args.null_rate * 100.0);
    println!("Bad date rate:    {:.1}%", args.bad_date_rate * 100.0);
    if let Some(seed) = args.seed {
        println!("Random seed:      {}", seed);
    }
    println!();

    let mut rng: StdRng = match args.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    std::fs::create_dir_all(&args.output_dir)?;
    let stations = build_stations(args.stations_per_city, &mut rng);
    let dates: Vec<NaiveDate> = (0..args.days)
        .map(|d| args.start_date + Duration::days(d as i64))
        .collect();
    let hourly_from = args.days.saturating_sub(args.hourly_days) as usize;

    println!("🏭 Generating daily readings...");
    let mut city_day = writer(&args.output_dir, CITY_DAY_FILE)?;
    let mut city_hour = writer(&args.output_dir, CITY_HOUR_FILE)?;
    let mut city_day_rows = 0usize;
    let mut city_hour_rows = 0usize;
    let mut risk_scores = Vec::with_capacity(CITIES.len());

    for &(city, _, base) in CITIES {
        let mut sum = 0.0;
        let mut n = 0usize;
        for (i, &date) in dates.iter().enumerate() {
            let aqi = sample_aqi(base, seasonal_factor(date), args.null_rate, &mut rng);
            if let Some(v) = aqi {
                sum += v;
                n += 1;
            }
            city_day.serialize(CityDayOut {
                city,
                date: format_date(date, args.bad_date_rate, &mut rng),
                aqi,
            })?;
            city_day_rows += 1;

            if i >= hourly_from {
                for hour in 0..24 {
                    let factor = seasonal_factor(date) * diurnal_factor(hour);
                    let Some(dt) = date.and_hms_opt(hour, 0, 0) else {
                        continue;
                    };
                    city_hour.serialize(CityHourOut {
                        city,
                        datetime: format_datetime(dt, args.bad_date_rate, &mut rng),
                        aqi: sample_aqi(base, factor, args.null_rate, &mut rng),
                    })?;
                    city_hour_rows += 1;
                }
            }
        }
        let mean = if n > 0 { sum / n as f64 } else { base };
        let score = (mean * rng.gen_range(0.9..=1.25) * 100.0).round() / 100.0;
        risk_scores.push((city, score));
    }
    city_day.flush()?;
    city_hour.flush()?;
    println!("   {} city-day rows, {} city-hour rows", city_day_rows, city_hour_rows);

    let mut station_day = writer(&args.output_dir, STATION_DAY_FILE)?;
    let mut station_hour = writer(&args.output_dir, STATION_HOUR_FILE)?;
    let mut station_day_rows = 0usize;
    let mut station_hour_rows = 0usize;

    for station in &stations {
        let base = baseline(station.city) * station.offset;
        for (i, &date) in dates.iter().enumerate() {
            station_day.serialize(StationDayOut {
                station: &station.id,
                date: format_date(date, args.bad_date_rate, &mut rng),
                aqi: sample_aqi(base, seasonal_factor(date), args.null_rate, &mut rng),
            })?;
            station_day_rows += 1;

            if i >= hourly_from {
                for hour in 0..24 {
                    let factor = seasonal_factor(date) * diurnal_factor(hour);
                    let Some(dt) = date.and_hms_opt(hour, 0, 0) else {
                        continue;
                    };
                    station_hour.serialize(StationHourOut {
                        station: &station.id,
                        datetime: format_datetime(dt, args.bad_date_rate, &mut rng),
                        aqi: sample_aqi(base, factor, args.null_rate, &mut rng),
                    })?;
                    station_hour_rows += 1;
                }
            }
        }
    }
    station_day.flush()?;
    station_hour.flush()?;
    println!("   {} station-day rows, {} station-hour rows", station_day_rows, station_hour_rows);

    println!("\n📋 Writing metadata...");
    let mut risks = writer(&args.output_dir, RISK_SCORES_FILE)?;
    for &(city, risk_score) in &risk_scores {
        risks.serialize(RiskOut { city, risk_score })?;
    }
    risks.flush()?;

    let mut meta = writer(&args.output_dir, STATIONS_FILE)?;
    for station in &stations {
        let status = if rng.gen_bool(0.9) { "Active" } else { "" };
        meta.serialize(StationOut {
            station: &station.id,
            station_name: format!("{} Monitoring Site {}", station.city, &station.id[2..]),
            city: station.city,
            state: station.state,
            status,
        })?;
    }
    meta.flush()?;
    println!("   {} risk scores, {} stations", risk_scores.len(), stations.len());

    println!("\n✅ Dataset written to {}", args.output_dir.display());
    Ok(())
}
