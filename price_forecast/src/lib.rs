//! # Price Forecast
//!
//! Monthly price series and rolling-origin forecasts shaped for a line
//! chart front end.
//!
//! ## Features
//!
//! - Monthly series from seeded mock draws, linear trends or tab-separated files
//! - Forecasting models (Random Walk baseline, ARIMA)
//! - Rolling-origin runner that forecasts a fixed horizon from every origin
//! - Chart payloads (`labels`, `true_line`, `datasets`) and accuracy reports
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use price_forecast::models::{ModelSpec, NamedModel};
//! use price_forecast::rolling::RollingForecastRunner;
//! use price_forecast::source::{seeded_rng, MockSeries};
//! use price_forecast::chart::ResponseFormatter;
//!
//! let start = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
//! let end = NaiveDate::from_ymd_opt(2020, 12, 1).unwrap();
//! let series = MockSeries::new(start, end, 100.0, 10.0)
//!     .generate(&mut seeded_rng(0))
//!     .unwrap();
//!
//! let models = vec![
//!     NamedModel::new("Random Walk", ModelSpec::RandomWalk { lags: 1 }),
//!     NamedModel::new("AR(1)", ModelSpec::Autoregressive { p: 1, d: 0, q: 0 }),
//! ];
//! let origins = &series.dates()[24..];
//!
//! let collection = RollingForecastRunner::new(12)
//!     .unwrap()
//!     .run(&series, &models, origins)
//!     .unwrap();
//! let chart = ResponseFormatter::forecast_chart(&series, "True Line", &collection).unwrap();
//!
//! assert_eq!(chart.labels.len(), chart.true_line.data.len());
//! ```

pub mod calendar;
pub mod chart;
pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod models;
pub mod rolling;
pub mod service;
pub mod source;

// Re-export commonly used types
pub use crate::chart::{ChartPayload, ForecastChart, ResponseFormatter};
pub use crate::config::ForecastConfig;
pub use crate::data::{DataLoader, TimeSeries};
pub use crate::error::{ForecastError, Result};
pub use crate::models::{Forecast, ForecastModel, ModelSpec, NamedModel};
pub use crate::rolling::{
    is_forecastable, FailurePolicy, ForecastCollection, ForecastResult, RollingForecastRunner,
};
pub use crate::service::ChartService;
pub use crate::source::SeriesSource;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
