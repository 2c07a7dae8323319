use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use super::TIMESTAMP_DISPLAY_FORMAT;
use crate::errors::{ErrorKind, TidemarkError, TidemarkResult};

const MIN_COMPACT: i64 = 1000_01_01_00_00_00;
const MAX_COMPACT: i64 = 9999_12_31_23_59_59;

/// Totally ordered version marker of a migration.
///
/// A marker is an `i64`. By convention it encodes a wall-clock instant as
/// `yyyyMMddHHmmss` so that markers sort in authoring order, but any value is
/// accepted; only its ordering and uniqueness matter to the planner.
///
/// [`Timestamp::MAX`] is the sentinel meaning "everything pending".
///
/// # Examples
///
/// ```rust
/// use tidemark::common::Timestamp;
///
/// let ts = Timestamp::from_ymd_hms(2024, 1, 15, 10, 30, 0).unwrap();
/// assert_eq!(ts.value(), 20240115103000);
/// assert!(ts < Timestamp::MAX);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Sentinel marker greater than every real migration.
    pub const MAX: Timestamp = Timestamp(i64::MAX);

    pub const fn new(value: i64) -> Self {
        Timestamp(value)
    }

    /// Encodes a date-time as a compact `yyyyMMddHHmmss` marker.
    pub fn from_datetime(datetime: NaiveDateTime) -> Self {
        let value = datetime.year() as i64 * 10_000_000_000
            + datetime.month() as i64 * 100_000_000
            + datetime.day() as i64 * 1_000_000
            + datetime.hour() as i64 * 10_000
            + datetime.minute() as i64 * 100
            + datetime.second() as i64;
        Timestamp(value)
    }

    /// Builds a compact marker from its calendar parts.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the parts do not form a valid date-time.
    pub fn from_ymd_hms(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> TidemarkResult<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(hour, minute, second))
            .map(Timestamp::from_datetime)
            .ok_or_else(|| {
                TidemarkError::new(
                    &format!(
                        "Invalid timestamp {:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                        year, month, day, hour, minute, second
                    ),
                    ErrorKind::ValidationError,
                )
            })
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn is_max(&self) -> bool {
        *self == Timestamp::MAX
    }

    /// Decodes the marker as a date-time if it follows the compact convention.
    pub fn to_datetime(&self) -> Option<NaiveDateTime> {
        if !(MIN_COMPACT..=MAX_COMPACT).contains(&self.0) {
            return None;
        }
        let value = self.0;
        let year = (value / 10_000_000_000) as i32;
        let month = (value / 100_000_000 % 100) as u32;
        let day = (value / 1_000_000 % 100) as u32;
        let hour = (value / 10_000 % 100) as u32;
        let minute = (value / 100 % 100) as u32;
        let second = (value % 100) as u32;
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(hour, minute, second))
    }
}

impl From<i64> for Timestamp {
    fn from(value: i64) -> Self {
        Timestamp(value)
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(datetime: NaiveDateTime) -> Self {
        Timestamp::from_datetime(datetime)
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_max() {
            return write!(f, "MAX");
        }
        match self.to_datetime() {
            Some(datetime) => write!(f, "{}", datetime.format(TIMESTAMP_DISPLAY_FORMAT)),
            None => write!(f, "{}", self.0),
        }
    }
}
