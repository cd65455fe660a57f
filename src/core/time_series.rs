//! Time series that dynamic properties are indexed against.
//!
//! A time series is an ordered list of time points. A property carries a
//! `time_index` into one referenced series.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::util::{Error, Result};

/// Time frame of a series' timestamps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeFrame {
    /// Calendar dates and times.
    #[default]
    Human,
    /// Offsets in years before present (positive is older).
    Geologic,
}

/// A single time point.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timestamp {
    Date(DateTime<Utc>),
    YearsBeforePresent(i64),
}

impl Timestamp {
    /// Parse an ISO date (`2020-01-31`) or RFC 3339 timestamp.
    pub fn parse_date(s: &str) -> Result<Self> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self::Date(dt.with_timezone(&Utc)));
        }
        let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|e| Error::other(format!("bad date '{}': {}", s, e)))?;
        let dt = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| Error::other(format!("bad date '{}'", s)))?;
        Ok(Self::Date(dt.and_utc()))
    }
}

/// Ordered series of time points.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub uuid: Uuid,
    pub title: String,
    pub timeframe: TimeFrame,
    timestamps: Vec<Timestamp>,
}

impl TimeSeries {
    /// Human time series from ISO date strings.
    pub fn from_dates<S: AsRef<str>>(title: impl Into<String>, dates: &[S]) -> Result<Self> {
        let timestamps = dates
            .iter()
            .map(|d| Timestamp::parse_date(d.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Self::new(title, TimeFrame::Human, timestamps)
    }

    /// Human time series starting at `start` with `count` steps of `step` days.
    pub fn regular(title: impl Into<String>, start: DateTime<Utc>, step_days: i64, count: usize) -> Result<Self> {
        let timestamps = (0..count as i64)
            .map(|i| Timestamp::Date(start + Duration::days(i * step_days)))
            .collect();
        Self::new(title, TimeFrame::Human, timestamps)
    }

    /// Geologic time series from year offsets before present.
    pub fn geologic(title: impl Into<String>, years: &[i64]) -> Result<Self> {
        let timestamps = years.iter().map(|y| Timestamp::YearsBeforePresent(*y)).collect();
        Self::new(title, TimeFrame::Geologic, timestamps)
    }

    fn new(title: impl Into<String>, timeframe: TimeFrame, timestamps: Vec<Timestamp>) -> Result<Self> {
        let ordered = timestamps.windows(2).all(|w| match (w[0], w[1]) {
            (Timestamp::Date(a), Timestamp::Date(b)) => a < b,
            (Timestamp::YearsBeforePresent(a), Timestamp::YearsBeforePresent(b)) => a > b,
            _ => false,
        });
        if !ordered {
            return Err(Error::other("time series timestamps must be strictly ascending"));
        }
        Ok(Self {
            uuid: Uuid::new_v4(),
            title: title.into(),
            timeframe,
            timestamps,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamp(&self, index: usize) -> Option<Timestamp> {
        self.timestamps.get(index).copied()
    }

    pub fn timestamps(&self) -> &[Timestamp] {
        &self.timestamps
    }

    /// Index of an exact time point.
    pub fn index_for(&self, timestamp: &Timestamp) -> Option<usize> {
        self.timestamps.iter().position(|t| t == timestamp)
    }

    /// Duration between consecutive human time points, in days.
    pub fn step_days(&self, index: usize) -> Option<i64> {
        match (self.timestamp(index.checked_sub(1)?)?, self.timestamp(index)?) {
            (Timestamp::Date(a), Timestamp::Date(b)) => Some((b - a).num_days()),
            _ => None,
        }
    }
}
