//! # forecast_server
//!
//! HTTP endpoints feeding the price and forecast line charts.
//!
//! | Path | Payload |
//! |---|---|
//! | `GET /get-data` | `{labels, datasets}` of the mock price indices |
//! | `GET /get-data-forecasts` | `{labels, true_line, datasets}` rolling forecasts |
//! | `GET /get-forecast-accuracy` | `{horizon, models}` accuracy of the rolling forecasts |
//! | `GET /health` | `{status, version}` |

use axum::routing::get;
use axum::Router;
use price_forecast::ChartService;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod error;
pub mod routes;
pub mod settings;

pub use crate::error::{ApiError, Result, ServerError};
pub use crate::settings::ServerSettings;

/// Application state shared across handlers
#[derive(Debug, Clone)]
pub struct AppState {
    service: Arc<ChartService>,
}

impl AppState {
    pub fn new(service: ChartService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Build the router with CORS and request tracing
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/get-data", get(routes::get_data))
        .route("/get-data-forecasts", get(routes::get_data_forecasts))
        .route("/get-forecast-accuracy", get(routes::get_forecast_accuracy))
        .route("/health", get(routes::health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
