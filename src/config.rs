//! Command-line and environment configuration.

use clap::Args;
use std::path::{Path, PathBuf};

pub const CITY_DAY_FILE: &str = "city_day.csv";
pub const STATION_DAY_FILE: &str = "station_day.csv";
pub const CITY_HOUR_FILE: &str = "city_hour.csv";
pub const STATION_HOUR_FILE: &str = "station_hour.csv";
pub const RISK_SCORES_FILE: &str = "city_risk_scores.csv";
pub const STATIONS_FILE: &str = "stations.csv";

/// Where the datasets live. Shared by every binary.
#[derive(Args, Debug, Clone)]
pub struct DataArgs {
    /// Directory holding the dataset CSV files
    #[arg(long, env = "AQI_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,
}

/// HTTP listener settings
#[derive(Args, Debug, Clone)]
pub struct ServerArgs {
    /// Address to bind
    #[arg(long, env = "AQI_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "AQI_PORT", default_value = "8080")]
    pub port: u16,
}

/// Resolved paths of the six dataset files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFiles {
    pub city_day: PathBuf,
    pub station_day: PathBuf,
    pub city_hour: PathBuf,
    pub station_hour: PathBuf,
    pub risk_scores: PathBuf,
    pub stations: PathBuf,
}

impl DataFiles {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            city_day: dir.join(CITY_DAY_FILE),
            station_day: dir.join(STATION_DAY_FILE),
            city_hour: dir.join(CITY_HOUR_FILE),
            station_hour: dir.join(STATION_HOUR_FILE),
            risk_scores: dir.join(RISK_SCORES_FILE),
            stations: dir.join(STATIONS_FILE),
        }
    }
}

impl DataArgs {
    pub fn files(&self) -> DataFiles {
        DataFiles::in_dir(&self.data_dir)
    }
}
