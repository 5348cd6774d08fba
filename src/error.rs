use thiserror::Error;

use crate::models::Target;

pub type Result<T> = std::result::Result<T, ForecastError>;

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Date parsing error: {0}")]
    DateParse(#[from] chrono::ParseError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Weather source returned status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("Weather source returned no daily data")]
    EmptyPayload,

    #[error("Feature '{feature}' required by the {target} model is missing from the context")]
    MissingFeature { target: Target, feature: String },

    #[error("The {target} model requires feature '{feature}', which cannot be derived")]
    FeatureMismatch { target: Target, feature: String },

    #[error("Model for {target} is unavailable: {reason}")]
    ModelUnavailable { target: Target, reason: String },

    #[error("Invalid model artifact: {0}")]
    InvalidModel(String),

    #[error("Observation store has no dated rows")]
    EmptyStore,

    #[error("Missing required data: {0}")]
    MissingData(String),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Worker pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Async task error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}
