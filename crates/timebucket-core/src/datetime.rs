//! TimeBucket Date/Time Support
//!
//! Conversion of caller timestamps into zoned instants: epoch seconds,
//! free-form text and existing chrono instants all normalize to the same
//! representation before a slice key is derived. Also hosts timezone lookup
//! and minute-interval rounding.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use timebucket_common::{BucketError, Result};

// =============================================================================
// Time Input
// =============================================================================

/// A timestamp as accepted by `TimeBucket::insert`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeInput {
    /// Seconds since the Unix epoch.
    Epoch(i64),
    /// Free-form date/time text.
    Text(String),
    /// An already constructed instant.
    Instant(DateTime<FixedOffset>),
}

impl TimeInput {
    /// Resolve to an instant expressed in `timezone`.
    pub fn resolve<Z: TimeZone>(&self, timezone: &Z) -> Result<DateTime<Z>> {
        let instant = match self {
            Self::Epoch(secs) => from_epoch(*secs)?,
            Self::Text(text) => parse_datetime(text)?,
            Self::Instant(instant) => instant.with_timezone(&Utc),
        };
        Ok(instant.with_timezone(timezone))
    }
}

impl From<i64> for TimeInput {
    fn from(secs: i64) -> Self {
        Self::Epoch(secs)
    }
}

impl From<i32> for TimeInput {
    fn from(secs: i32) -> Self {
        Self::Epoch(i64::from(secs))
    }
}

impl From<&str> for TimeInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for TimeInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl<Z: TimeZone> From<DateTime<Z>> for TimeInput {
    fn from(instant: DateTime<Z>) -> Self {
        Self::Instant(instant.fixed_offset())
    }
}

// =============================================================================
// Parsing
// =============================================================================

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

// Naive forms carry no offset and are read as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Build a UTC instant from epoch seconds.
pub fn from_epoch(secs: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| BucketError::InvalidInput(format!("epoch seconds out of range: {}", secs)))
}

/// Parse free-form date/time text into a UTC instant.
pub fn parse_datetime(text: &str) -> Result<DateTime<Utc>> {
    let input = text.trim();

    if input.eq_ignore_ascii_case("now") {
        return Ok(Utc::now());
    }

    if let Some(epoch) = input.strip_prefix('@') {
        let secs = epoch
            .parse::<i64>()
            .map_err(|e| BucketError::Parse(format!("{}: {}", text, e)))?;
        return from_epoch(secs);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(input, format) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(naive.and_utc());
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(input, format) {
            if let Some(naive) = date.and_hms_opt(0, 0, 0) {
                return Ok(naive.and_utc());
            }
        }
    }

    Err(BucketError::Parse(format!("unrecognised timestamp: {:?}", text)))
}

/// Look up an IANA timezone by name.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| BucketError::UnknownTimezone(name.to_string()))
}

// =============================================================================
// Rounding
// =============================================================================

/// Round the minute field to the nearest multiple of `interval` (half rounds
/// up) and zero the seconds. A result of minute 60 or more carries into the
/// following hour. `None` when the result falls outside chrono's range.
pub fn round_to_nearest_minute_interval<Z: TimeZone>(
    instant: &DateTime<Z>,
    interval: u32,
) -> Option<DateTime<Z>> {
    let interval = u64::from(interval.max(1));
    let minute = u64::from(instant.minute());
    let rounded = (minute * 2 + interval) / (interval * 2) * interval;

    let hour_start = instant
        .clone()
        .checked_sub_signed(Duration::seconds(i64::from(
            instant.minute() * 60 + instant.second(),
        )))?
        .checked_sub_signed(Duration::nanoseconds(i64::from(instant.nanosecond())))?;

    hour_start.checked_add_signed(Duration::try_minutes(i64::try_from(rounded).ok()?)?)
}

// =============================================================================
// Tests
// =============================================================================
