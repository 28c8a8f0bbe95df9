//! # Price Forecast Workspace
//!
//! Re-exports the workspace crates under one roof.
//!
//! - [`series_math`]: descriptive statistics, differencing and least squares
//! - [`price_forecast`]: monthly series, forecasting models, rolling forecasts and chart payloads
//! - [`forecast_server`]: the HTTP endpoints serving those payloads
//!
//! ## Example
//!
//! ```
//! use price_forecast_workspace::price_forecast::{ChartService, ForecastConfig};
//!
//! let service = ChartService::new(ForecastConfig::default()).unwrap();
//! let payload = service.price_indices().unwrap();
//! assert_eq!(payload.labels.len(), 24);
//! ```

pub use forecast_server;
pub use price_forecast;
pub use series_math;
