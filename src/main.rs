//! One-shot dashboard report
//!
//! Loads the datasets, applies the filter and prints every dashboard view.
//!
//! Usage:
//!   cargo run --release -- --city Delhi --start-date 2019-01-01 --end-date 2019-12-31
//!   cargo run --release -- --json

use anyhow::Result;
use aqi_dashboard::config::DataArgs;
use aqi_dashboard::dashboard::{build_dashboard, DashboardRequest, ResultBundle};
use aqi_dashboard::DataContext;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "aqi_dashboard")]
#[command(about = "Print the air-quality dashboard for a city and date range")]
struct Args {
    #[command(flatten)]
    data: DataArgs,

    /// City to focus on ("All" for every city)
    #[arg(long)]
    city: Option<String>,

    /// First day of the range (defaults to the earliest date in the data)
    #[arg(long)]
    start_date: Option<String>,

    /// Last day of the range (defaults to the latest date in the data)
    #[arg(long)]
    end_date: Option<String>,

    /// Print the result bundle as JSON instead of a text report
    #[arg(long)]
    json: bool,

    /// Rows shown per ranking in the text report
    #[arg(long, default_value = "10")]
    top: usize,
}

fn print_section_header(title: &str) {
    println!("\n{}", "═".repeat(80));
    println!("  {}", title);
    println!("{}\n", "═".repeat(80));
}

fn print_report(bundle: &ResultBundle, top: usize) {
    print_section_header("AIR QUALITY DASHBOARD");
    println!("  City:          {}", bundle.selected_city);
    println!("  Date range:    {} → {}", bundle.start_date, bundle.end_date);
    println!("  Cities:        {}", bundle.num_cities);
    println!("  Stations:      {}", bundle.num_stations);
    println!("  Average AQI:   {:.2}", bundle.avg_aqi);

    print_section_header("TREND (MOST POLLUTED CITY)");
    if bundle.trend_dates.is_empty() {
        println!("  No AQI readings in range");
    }
    for (date, value) in bundle.trend_dates.iter().zip(&bundle.trend_values) {
        println!("  {}  {:>8.1}", date, value);
    }

    print_section_header("CITY AVERAGES");
    println!("  {:<24} {:>10}  {}", "City", "Mean AQI", "Color");
    println!("  {}", "─".repeat(60));
    for ((city, value), color) in bundle
        .heatmap_cities
        .iter()
        .zip(&bundle.heatmap_values)
        .zip(&bundle.heatmap_colors)
        .take(top)
    {
        println!("  {:<24} {:>10.2}  {}", city, value, color);
    }

    print_section_header("STATION RANKING");
    println!("  {:<24} {:>10}", "Station", "Mean AQI");
    println!("  {}", "─".repeat(60));
    for (station, value) in bundle.stations_names.iter().zip(&bundle.stations_avg).take(top) {
        println!("  {:<24} {:>10.2}", station, value);
    }

    print_section_header("RISK TIERS");
    println!("  {:<24} {:>10}  {}", "City", "Score", "Tier");
    println!("  {}", "─".repeat(60));
    for ((city, tier), score) in bundle.risks_list.iter().zip(&bundle.risks_values).take(top) {
        println!("  {:<24} {:>10.2}  {}", city, score, tier);
    }
    println!();
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .init();

    let args = Args::parse();
    let context = DataContext::load(&args.data.files())?;

    let request = DashboardRequest {
        city: args.city.clone(),
        start_date: args.start_date.clone(),
        end_date: args.end_date.clone(),
    };
    let criteria = request.resolve(&context)?;
    info!(city = %criteria.city, start = %criteria.start_date, end = %criteria.end_date, "Building dashboard");

    let bundle = build_dashboard(&context, &criteria);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&bundle)?);
    } else {
        print_report(&bundle, args.top);
    }

    Ok(())
}
