//! # Series Math
//!
//! Numeric building blocks shared by the forecasting models:
//! descriptive statistics, differencing/integration and an ordinary
//! least squares solver used to fit autoregressive terms.

use thiserror::Error;

pub mod descriptive;
pub mod differencing;
pub mod regression;

pub use descriptive::{mean, std_dev, variance};
pub use differencing::{difference, Integrator};
pub use regression::least_squares;

/// Errors that can occur in series calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for series math operations
pub type Result<T> = std::result::Result<T, MathError>;
