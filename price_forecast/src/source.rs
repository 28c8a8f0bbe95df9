//! Series sources: seeded mock draws, deterministic trends and delimited files
//!
//! Generation never touches a process-wide generator. Callers build one
//! generator per request with [`seeded_rng`] and pass it to every
//! [`SeriesSource::load`] call in order, so a second mock series continues
//! the stream where the first one stopped.

use crate::calendar::{self, serde_month};
use crate::data::{DataLoader, FileLayout, TimeSeries};
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Build the request-scoped generator for a configured seed
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Where a series comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SeriesSource {
    /// Independent normal draws, one per month
    Mock(MockSeries),
    /// Straight line over the month index
    Trend(TrendSeries),
    /// Delimited file with a date and a value column
    File(FileSeries),
}

impl SeriesSource {
    /// Produce the series, drawing from `rng` when the source is random
    pub fn load<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<TimeSeries> {
        match self {
            SeriesSource::Mock(mock) => mock.generate(rng),
            SeriesSource::Trend(trend) => trend.generate(),
            SeriesSource::File(file) => file.read(),
        }
    }
}

/// Normal draws over a monthly date range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockSeries {
    #[serde(with = "serde_month")]
    pub start: NaiveDate,
    #[serde(with = "serde_month")]
    pub end: NaiveDate,
    pub mean: f64,
    pub std_dev: f64,
}

impl MockSeries {
    pub fn new(start: NaiveDate, end: NaiveDate, mean: f64, std_dev: f64) -> Self {
        Self {
            start,
            end,
            mean,
            std_dev,
        }
    }

    /// Draw one value per month in the range from `rng`
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<TimeSeries> {
        if !self.mean.is_finite() {
            return Err(ForecastError::InvalidParameter(format!(
                "Mock series mean must be finite, got {}",
                self.mean
            )));
        }

        let normal = Normal::new(self.mean, self.std_dev).map_err(|e| {
            ForecastError::InvalidParameter(format!(
                "Invalid standard deviation {}: {}",
                self.std_dev, e
            ))
        })?;

        let dates = calendar::month_range(self.start, self.end)?;
        let values = dates.iter().map(|_| normal.sample(rng)).collect();

        TimeSeries::new(dates, values)
    }
}

/// `intercept + slope * i` for the i-th month of the range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSeries {
    #[serde(with = "serde_month")]
    pub start: NaiveDate,
    #[serde(with = "serde_month")]
    pub end: NaiveDate,
    #[serde(default)]
    pub intercept: f64,
    #[serde(default = "default_slope")]
    pub slope: f64,
}

fn default_slope() -> f64 {
    1.0
}

impl TrendSeries {
    pub fn generate(&self) -> Result<TimeSeries> {
        let dates = calendar::month_range(self.start, self.end)?;
        let values = (0..dates.len())
            .map(|i| self.intercept + self.slope * i as f64)
            .collect();

        TimeSeries::new(dates, values)
    }
}

/// Delimited file read through [`DataLoader`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSeries {
    pub path: PathBuf,
    #[serde(default = "default_date_column")]
    pub date_column: String,
    #[serde(default = "default_value_column")]
    pub value_column: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

fn default_date_column() -> String {
    "date".to_string()
}

fn default_value_column() -> String {
    "value".to_string()
}

fn default_delimiter() -> char {
    '\t'
}

impl FileSeries {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            date_column: default_date_column(),
            value_column: default_value_column(),
            delimiter: default_delimiter(),
        }
    }

    pub fn read(&self) -> Result<TimeSeries> {
        if !self.delimiter.is_ascii() {
            return Err(ForecastError::InvalidParameter(format!(
                "Delimiter must be a single ASCII character, got '{}'",
                self.delimiter
            )));
        }

        let layout = FileLayout {
            date_column: self.date_column.clone(),
            value_column: self.value_column.clone(),
            delimiter: self.delimiter as u8,
        };

        DataLoader::from_delimited(&self.path, &layout)
    }
}
