//! Error types shared by the loaders, the dashboard pipeline and the API.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    /// A request parameter could not be interpreted.
    #[error("invalid request parameter `{field}` = {value:?}: {reason}")]
    InvalidRequest {
        field: &'static str,
        value: String,
        reason: String,
    },

    /// A dataset file exists but lacks a column the loader needs.
    #[error("{}: missing required column `{column}`", path.display())]
    MissingColumn { path: PathBuf, column: String },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DashboardError {
    pub fn invalid_request(
        field: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        DashboardError::InvalidRequest {
            field,
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// True for errors caused by the caller rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(self, DashboardError::InvalidRequest { .. })
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
