//! Error types for the forecast_server crate

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use price_forecast::ForecastError;
use thiserror::Error;
use tracing::error;

/// Failures while starting the server
#[derive(Debug, Error)]
pub enum ServerError {
    /// Invalid environment or configuration file
    #[error("Config error: {0}")]
    Config(String),

    #[error(transparent)]
    Forecast(#[from] ForecastError),

    /// Error binding or serving the listener
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ServerError>;

/// A failed request
///
/// The cause is logged; the client only sees a generic 500.
#[derive(Debug)]
pub struct ApiError(ForecastError);

impl From<ForecastError> for ApiError {
    fn from(err: ForecastError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!(error = %self.0, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}
