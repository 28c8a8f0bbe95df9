//! Month arithmetic for first-of-month series
//!
//! Every date handled by the crate is normalized to the first day of its
//! month. Labels shown on the chart axis are `YYYY-MM`; forecast origins are
//! keyed `YYYY-MM-DD`.

use crate::error::{ForecastError, Result};
use chrono::{Datelike, Months, NaiveDate};

/// Format of chart axis labels
pub const LABEL_FORMAT: &str = "%Y-%m";

/// Format of forecast origin keys
pub const KEY_FORMAT: &str = "%Y-%m-%d";

/// First day of the month containing `date`
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Shift `date` by whole months, keeping it on the first of the month
pub fn add_months(date: NaiveDate, months: i32) -> Result<NaiveDate> {
    let start = month_start(date);
    let shifted = if months >= 0 {
        start.checked_add_months(Months::new(months.unsigned_abs()))
    } else {
        start.checked_sub_months(Months::new(months.unsigned_abs()))
    };

    shifted.ok_or_else(|| {
        ForecastError::InvalidParameter(format!(
            "Shifting {} by {} months leaves the supported date range",
            date, months
        ))
    })
}

/// Signed number of months from `from` to `to`, ignoring the day of month
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i32 {
    (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32
}

/// All month starts from `start` through `end`, both inclusive
pub fn month_range(start: NaiveDate, end: NaiveDate) -> Result<Vec<NaiveDate>> {
    let (start, end) = (month_start(start), month_start(end));
    if end < start {
        return Err(ForecastError::InvalidParameter(format!(
            "Date range ends ({}) before it starts ({})",
            end, start
        )));
    }

    let count = months_between(start, end) + 1;
    (0..count).map(|offset| add_months(start, offset)).collect()
}

/// Chart axis label, `YYYY-MM`
pub fn month_label(date: NaiveDate) -> String {
    date.format(LABEL_FORMAT).to_string()
}

/// Forecast origin key, `YYYY-MM-DD`
pub fn origin_key(date: NaiveDate) -> String {
    date.format(KEY_FORMAT).to_string()
}

/// Parse `YYYY-MM-DD` or `YYYY-MM` and normalize to the month start
pub fn parse_month(text: &str) -> Result<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, KEY_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(&format!("{}-01", text), KEY_FORMAT))
        .map(month_start)
        .map_err(|_| ForecastError::DataFormat(format!("Unparseable date '{}'", text)))
}

/// Serde helpers for month dates written as `YYYY-MM` or `YYYY-MM-DD`
pub mod serde_month {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::origin_key(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_month(&text).map_err(serde::de::Error::custom)
    }

    /// Same as the parent module for `Option<NaiveDate>` fields
    pub mod option {
        use chrono::NaiveDate;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            date: &Option<NaiveDate>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match date {
                Some(date) => serializer.serialize_some(&crate::calendar::origin_key(*date)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveDate>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|text| crate::calendar::parse_month(&text).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}
