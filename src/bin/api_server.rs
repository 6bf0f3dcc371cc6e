//! REST API server for the AQI dashboard
//!
//! Loads every dataset once at startup and serves the dashboard over HTTP.
//!
//! Usage:
//!   ./target/release/api_server [--data-dir DIR] [--host ADDR] [--port PORT]
//!
//! REST endpoints:
//!   GET  /api/v1/health      - Health check
//!   GET  /api/v1/dashboard   - Dashboard bundle (?city=&start_date=&end_date=)
//!   POST /api/v1/dashboard   - Same, form-encoded
//!   GET  /api/v1/cities      - City dropdown
//!   GET  /api/v1/risks       - Risk tiers
//!   GET  /api/v1/stations    - Station ranking with metadata
//!   GET  /api/v1/hourly      - Hour-of-day profile
//!   GET  /api/v1/datasets    - Loaded row counts and date coverage

use anyhow::{Context, Result};
use aqi_dashboard::api::{create_router, DashboardService};
use aqi_dashboard::config::{DataArgs, ServerArgs};
use aqi_dashboard::DataContext;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "api_server")]
#[command(about = "Serve the air-quality dashboard API")]
struct Args {
    #[command(flatten)]
    data: DataArgs,

    #[command(flatten)]
    server: ServerArgs,
}

fn print_banner(addr: &SocketAddr, args: &Args) {
    println!("============================================================");
    println!("              AIR QUALITY DASHBOARD API SERVER");
    println!("============================================================");
    println!();
    println!("  Data:     {}", args.data.data_dir.display());
    println!("  REST:     http://{}/api/v1/", addr);
    println!();
    println!("REST Endpoints:");
    println!("  GET  /api/v1/health        Health check");
    println!("  GET  /api/v1/dashboard     Dashboard bundle");
    println!("  POST /api/v1/dashboard     Dashboard bundle (form)");
    println!("  GET  /api/v1/cities        City list");
    println!("  GET  /api/v1/risks         Risk tiers");
    println!("  GET  /api/v1/stations      Station ranking");
    println!("  GET  /api/v1/hourly        Hourly profile");
    println!("  GET  /api/v1/datasets      Dataset overview");
    println!();
    println!("============================================================");
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .init();

    let args = Args::parse();
    let addr: SocketAddr = format!("{}:{}", args.server.host, args.server.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", args.server.host, args.server.port))?;

    let context = DataContext::load(&args.data.files())
        .with_context(|| format!("failed to load datasets from {}", args.data.data_dir.display()))?;
    let service = Arc::new(DashboardService::new(context));

    print_banner(&addr, &args);

    let app = create_router(service);
    info!("Starting REST server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
