//! Error types for the price_forecast crate

use chrono::NaiveDate;
use series_math::MathError;
use thiserror::Error;

/// Custom error types for the price_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Malformed series input (missing, unparseable or duplicated dates, bad values)
    #[error("Data format error: {0}")]
    DataFormat(String),

    /// Bad model or runner configuration
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Model fitting failed or did not converge
    #[error("Model fit error: {0}")]
    ModelFit(String),

    /// Response assembly could not line forecasts up with labels
    #[error("Format error: {0}")]
    Format(String),

    /// Every candidate origin was too close to the end of the series
    #[error("No forecastable origins: series ends {last} and the horizon is {horizon} months")]
    NoForecastableOrigins { last: NaiveDate, horizon: usize },

    /// Invalid or unreadable configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::DataFormat(err.to_string())
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::Config(err.to_string())
    }
}

impl From<MathError> for ForecastError {
    fn from(err: MathError) -> Self {
        ForecastError::ModelFit(err.to_string())
    }
}
