//! TimeBucket Granularity
//!
//! The table of named windowing schemes. Each identifier maps to a slice
//! format (a chrono strftime pattern plus the shape of the keys it
//! produces); the `"<N> minute"` form additionally carries a rounding
//! interval.
//!
//! Custom tokens beyond strftime:
//! - `%q` quarter number (1-4), used by `quarter`
//! - `%s` on `unixtime` yields an integer key rather than text
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use crate::types::SliceKey;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Weekday};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use timebucket_common::{BucketError, GranularityPolicy, Result};

// =============================================================================
// Slice Format
// =============================================================================

/// Shape of the keys a format produces, used to turn a key back into the
/// instant that starts its window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyShape {
    Year,
    Quarter,
    Month,
    IsoWeek,
    Date,
    /// Local wall-clock date and time.
    LocalTime,
    /// Date and time with a numeric UTC offset.
    OffsetTime,
    /// A single calendar field (hour-of-day and similar); not an instant.
    Field,
    Epoch,
}

/// A slice format: the pattern used to render keys and their shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SliceFormat {
    spec: &'static str,
    shape: KeyShape,
}

const LOCAL_TIME_PARSE: &str = "%Y-%m-%d %H:%M:%S";
const OFFSET_TIME_PARSE: &str = "%Y-%m-%dT%H:%M:%S%:z";

impl SliceFormat {
    const fn new(spec: &'static str, shape: KeyShape) -> Self {
        Self { spec, shape }
    }

    pub fn spec(&self) -> &'static str {
        self.spec
    }

    pub fn shape(&self) -> KeyShape {
        self.shape
    }

    /// Whether keys of this format identify a point in time.
    pub fn is_instant(&self) -> bool {
        self.shape != KeyShape::Field
    }

    /// Look up a format by its pattern, as recorded in a snapshot.
    pub fn from_spec(spec: &str) -> Result<Self> {
        SLICE_FORMATS
            .iter()
            .map(|(_, format)| *format)
            .find(|format| format.spec == spec)
            .ok_or_else(|| BucketError::UnknownSliceFormat(spec.to_string()))
    }

    /// Render the slice key for an instant.
    pub fn format<Z>(&self, instant: &DateTime<Z>) -> SliceKey
    where
        Z: TimeZone,
        Z::Offset: fmt::Display,
    {
        match self.shape {
            KeyShape::Epoch => SliceKey::Int(instant.timestamp()),
            KeyShape::Quarter => {
                SliceKey::Text(format!("{}-Q{}", instant.year(), instant.month0() / 3 + 1))
            }
            _ => SliceKey::Text(instant.format(self.spec).to_string()),
        }
    }

    /// Reconstruct the instant starting the window a key names.
    ///
    /// Returns `None` for field-only formats and for keys that do not match
    /// the format, and for local times that do not exist in `timezone`.
    pub fn parse_key<Z: TimeZone>(&self, key: &SliceKey, timezone: &Z) -> Option<DateTime<Z>> {
        let text = match (self.shape, key) {
            (KeyShape::Epoch, SliceKey::Int(secs)) => {
                return DateTime::from_timestamp(*secs, 0).map(|dt| dt.with_timezone(timezone));
            }
            (KeyShape::Epoch, SliceKey::Text(text)) => {
                let secs = text.parse::<i64>().ok()?;
                return DateTime::from_timestamp(secs, 0).map(|dt| dt.with_timezone(timezone));
            }
            (_, SliceKey::Text(text)) => text.as_str(),
            (_, SliceKey::Int(_)) => return None,
        };

        let naive = match self.shape {
            KeyShape::OffsetTime => {
                return DateTime::parse_from_str(text, OFFSET_TIME_PARSE)
                    .ok()
                    .map(|dt| dt.with_timezone(timezone));
            }
            KeyShape::LocalTime => NaiveDateTime::parse_from_str(text, LOCAL_TIME_PARSE).ok()?,
            KeyShape::Date => midnight(NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()?)?,
            KeyShape::Month => {
                let (year, month) = text.split_once('-')?;
                midnight(NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)?)?
            }
            KeyShape::Year => midnight(NaiveDate::from_ymd_opt(text.parse().ok()?, 1, 1)?)?,
            KeyShape::Quarter => {
                let (year, quarter) = text.split_once("-Q")?;
                let quarter: u32 = quarter.parse().ok()?;
                if !(1..=4).contains(&quarter) {
                    return None;
                }
                midnight(NaiveDate::from_ymd_opt(year.parse().ok()?, (quarter - 1) * 3 + 1, 1)?)?
            }
            KeyShape::IsoWeek => {
                let (year, week) = text.split_once("-W")?;
                midnight(NaiveDate::from_isoywd_opt(
                    year.parse().ok()?,
                    week.parse().ok()?,
                    Weekday::Mon,
                )?)?
            }
            KeyShape::Field | KeyShape::Epoch => return None,
        };

        timezone.from_local_datetime(&naive).earliest()
    }
}

fn midnight(date: NaiveDate) -> Option<NaiveDateTime> {
    date.and_hms_opt(0, 0, 0)
}

impl fmt::Display for SliceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spec)
    }
}

// =============================================================================
// Granularity Table
// =============================================================================

/// Every named granularity and the format it slices by.
pub static SLICE_FORMATS: &[(&str, SliceFormat)] = &[
    ("year", SliceFormat::new("%Y", KeyShape::Year)),
    ("quarter", SliceFormat::new("%Y-Q%q", KeyShape::Quarter)),
    ("month", SliceFormat::new("%Y-%m", KeyShape::Month)),
    ("week", SliceFormat::new("%G-W%V", KeyShape::IsoWeek)),
    ("date", SliceFormat::new("%Y-%m-%d", KeyShape::Date)),
    ("day", SliceFormat::new("%Y-%m-%d", KeyShape::Date)),
    ("hour", SliceFormat::new("%Y-%m-%d %H:00:00", KeyShape::LocalTime)),
    ("hourtz", SliceFormat::new("%Y-%m-%dT%H:00:00%:z", KeyShape::OffsetTime)),
    ("minute", SliceFormat::new("%Y-%m-%d %H:%M:00", KeyShape::LocalTime)),
    ("minutetz", SliceFormat::new("%Y-%m-%dT%H:%M:00%:z", KeyShape::OffsetTime)),
    ("second", SliceFormat::new("%Y-%m-%d %H:%M:%S", KeyShape::LocalTime)),
    ("secondtz", SliceFormat::new("%Y-%m-%dT%H:%M:%S%:z", KeyShape::OffsetTime)),
    ("dayofmonth", SliceFormat::new("%d", KeyShape::Field)),
    ("dayofweek", SliceFormat::new("%w", KeyShape::Field)),
    ("hourofday", SliceFormat::new("%H", KeyShape::Field)),
    ("monthofyear", SliceFormat::new("%m", KeyShape::Field)),
    ("unixtime", SliceFormat::new("%s", KeyShape::Epoch)),
];

static MINUTE_INTERVAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?P<interval>\d+)\s+(?P<timepart>minutes?)\s*$")
        .expect("minute interval pattern is valid")
});

// =============================================================================
// Granularity
// =============================================================================

/// A resolved windowing scheme: slice format plus rounding interval in
/// minutes (1 means no rounding).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Granularity {
    format: SliceFormat,
    interval: u32,
}

impl Granularity {
    pub const SECOND: Granularity = Granularity {
        format: SliceFormat::new("%Y-%m-%d %H:%M:%S", KeyShape::LocalTime),
        interval: 1,
    };

    /// Look up an identifier in the table, or parse the `"<N> minute"` form.
    pub fn lookup(identifier: &str) -> Option<Self> {
        if let Some(captures) = MINUTE_INTERVAL.captures(identifier) {
            let interval: u32 = captures["interval"].parse().ok()?;
            let (_, format) = SLICE_FORMATS.iter().find(|(name, _)| *name == "minute")?;
            return (interval > 0).then_some(Self {
                format: *format,
                interval,
            });
        }

        SLICE_FORMATS
            .iter()
            .find(|(name, _)| *name == identifier.trim())
            .map(|(_, format)| Self {
                format: *format,
                interval: 1,
            })
    }

    /// Resolve an identifier under the given policy. Lenient resolution
    /// falls back to per-second slices.
    pub fn resolve(identifier: &str, policy: GranularityPolicy) -> Result<Self> {
        match (Self::lookup(identifier), policy) {
            (Some(granularity), _) => Ok(granularity),
            (None, GranularityPolicy::Strict) => {
                Err(BucketError::UnknownGranularity(identifier.to_string()))
            }
            (None, GranularityPolicy::Lenient) => {
                tracing::warn!(identifier, "unknown granularity, slicing per second");
                Ok(Self::SECOND)
            }
        }
    }

    /// Rebuild a granularity from a recorded format and interval.
    pub fn from_parts(format: SliceFormat, interval: u32) -> Result<Self> {
        if interval == 0 {
            return Err(BucketError::InvalidInput(
                "slice interval must be at least one minute".to_string(),
            ));
        }
        Ok(Self { format, interval })
    }

    pub fn format(&self) -> SliceFormat {
        self.format
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    /// Whether instants are rounded to the interval before slicing.
    pub fn is_rounded(&self) -> bool {
        self.interval != 1
    }
}

impl Default for Granularity {
    fn default() -> Self {
        Self::SECOND
    }
}

impl FromStr for Granularity {
    type Err = BucketError;

    fn from_str(identifier: &str) -> Result<Self> {
        Self::resolve(identifier, GranularityPolicy::Strict)
    }
}

// =============================================================================
// Tests
// =============================================================================
