//! Monthly time series data and file loading

use crate::calendar::{self, month_start};
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use std::fs::File;
use std::path::Path;

/// Monthly time series indexed by first-of-month dates
///
/// Dates are strictly increasing and values are finite; both are checked
/// on construction and the series is never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl TimeSeries {
    /// Create a series from parallel date and value vectors
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(ForecastError::DataFormat(format!(
                "Dates length ({}) doesn't match values length ({})",
                dates.len(),
                values.len()
            )));
        }

        if let Some(date) = dates.iter().find(|d| month_start(**d) != **d) {
            return Err(ForecastError::DataFormat(format!(
                "Date {} is not the first day of a month",
                date
            )));
        }

        if let Some(pair) = dates.windows(2).find(|w| w[0] >= w[1]) {
            return Err(ForecastError::DataFormat(format!(
                "Dates must be strictly increasing, found {} followed by {}",
                pair[0], pair[1]
            )));
        }

        if let Some(idx) = values.iter().position(|v| !v.is_finite()) {
            return Err(ForecastError::DataFormat(format!(
                "Non-finite value at {}",
                dates[idx]
            )));
        }

        Ok(Self { dates, values })
    }

    /// Create a series covering consecutive months starting at `start`
    pub fn monthly(start: NaiveDate, values: Vec<f64>) -> Result<Self> {
        let dates = (0..values.len())
            .map(|offset| calendar::add_months(start, offset as i32))
            .collect::<Result<Vec<_>>>()?;

        Self::new(dates, values)
    }

    /// Get the dates
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Get the values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of observations
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Check if the series is empty
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Index of `date` in the series
    pub fn position(&self, date: NaiveDate) -> Option<usize> {
        self.dates.binary_search(&date).ok()
    }

    /// Observed value at `date`
    pub fn value_at(&self, date: NaiveDate) -> Option<f64> {
        self.position(date).map(|idx| self.values[idx])
    }

    /// Iterate over `(date, value)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }

    /// Prefix of the series up to and including `origin`
    pub fn through(&self, origin: NaiveDate) -> TimeSeries {
        let end = self.dates.partition_point(|d| *d <= origin);
        TimeSeries {
            dates: self.dates[..end].to_vec(),
            values: self.values[..end].to_vec(),
        }
    }

    /// Suffix of the series starting at index `start`
    pub fn skip(&self, start: usize) -> TimeSeries {
        let start = start.min(self.len());
        TimeSeries {
            dates: self.dates[start..].to_vec(),
            values: self.values[start..].to_vec(),
        }
    }

    /// True when every consecutive pair of dates is exactly one month apart
    pub fn is_contiguous(&self) -> bool {
        self.dates
            .windows(2)
            .all(|w| calendar::months_between(w[0], w[1]) == 1)
    }

    /// Chart axis labels, one `YYYY-MM` per observation
    pub fn labels(&self) -> Vec<String> {
        self.dates.iter().map(|d| calendar::month_label(*d)).collect()
    }
}

/// Column layout of a delimited series file
#[derive(Debug, Clone)]
pub struct FileLayout {
    /// Name of the date column
    pub date_column: String,
    /// Name of the value column
    pub value_column: String,
    /// Field delimiter
    pub delimiter: u8,
}

impl Default for FileLayout {
    fn default() -> Self {
        Self {
            date_column: "date".to_string(),
            value_column: "value".to_string(),
            delimiter: b'\t',
        }
    }
}

/// Data loader for delimited series files
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load a series from a tab-separated file with `date` and `value` columns
    pub fn from_tsv<P: AsRef<Path>>(path: P) -> Result<TimeSeries> {
        Self::from_delimited(path, &FileLayout::default())
    }

    /// Load a series from a delimited file with the given column layout
    pub fn from_delimited<P: AsRef<Path>>(path: P, layout: &FileLayout) -> Result<TimeSeries> {
        let file = File::open(path.as_ref())?;
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(layout.delimiter)
            .trim(csv::Trim::All)
            .from_reader(file);

        let headers = reader.headers()?.clone();
        let date_idx = Self::column_index(&headers, &layout.date_column)?;
        let value_idx = Self::column_index(&headers, &layout.value_column)?;

        let mut rows = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record?;
            // header is line 1
            let line = i + 2;

            let date_text = record.get(date_idx).ok_or_else(|| {
                ForecastError::DataFormat(format!("Missing date at line {}", line))
            })?;
            let date = calendar::parse_month(date_text).map_err(|_| {
                ForecastError::DataFormat(format!(
                    "Invalid date '{}' at line {}",
                    date_text, line
                ))
            })?;

            let value_text = record.get(value_idx).ok_or_else(|| {
                ForecastError::DataFormat(format!("Missing value at line {}", line))
            })?;
            let value = value_text.parse::<f64>().map_err(|e| {
                ForecastError::DataFormat(format!(
                    "Invalid value '{}' at line {}: {}",
                    value_text, line, e
                ))
            })?;

            rows.push((date, value));
        }

        if rows.is_empty() {
            return Err(ForecastError::DataFormat(
                "Series file contains no observations".to_string(),
            ));
        }

        rows.sort_by_key(|(date, _)| *date);
        if let Some(pair) = rows.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(ForecastError::DataFormat(format!(
                "Duplicate date {}",
                calendar::month_label(pair[0].0)
            )));
        }

        let (dates, values): (Vec<NaiveDate>, Vec<f64>) = rows.into_iter().unzip();
        TimeSeries::new(dates, values)
    }

    fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize> {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| ForecastError::DataFormat(format!("No '{}' column found", name)))
    }
}
