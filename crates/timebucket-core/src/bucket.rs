//! TimeBucket Bucket
//!
//! Groups timestamped items into ordered time slices. Each insert derives a
//! slice key from the timestamp (normalized to the bucket's timezone and
//! optionally rounded to an N-minute interval) and files the item under it
//! in an ordered store. Slices come back out in ascending key order, either
//! by peeking (`time_slices`, `next_time_slice`) on a private copy of the
//! store or by draining (`extract_time_slice`) the live one.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use crate::datetime::{parse_timezone, round_to_nearest_minute_interval, TimeInput};
use crate::granularity::{Granularity, SliceFormat};
use crate::storage::{OrderedStore, TimeOrderedStorage};
use crate::types::{unique, SliceKey, TimeSlice};
use chrono::DateTime;
use chrono_tz::Tz;
use std::iter::FusedIterator;
use timebucket_common::{BucketConfig, BucketError, Result, StorageStrategy};

// =============================================================================
// Time Bucket
// =============================================================================

/// An ordered collection of items grouped into time slices.
#[derive(Debug, Clone)]
pub struct TimeBucket<T> {
    store: OrderedStore<T, SliceKey>,
    granularity: Granularity,
    timezone: Tz,
}

impl<T> TimeBucket<T> {
    /// Create a UTC bucket for a granularity identifier. Unknown identifiers
    /// slice per second.
    pub fn new(slice: &str) -> Self {
        Self::with_timezone(slice, Tz::UTC)
    }

    /// Create a bucket in an already resolved timezone.
    pub fn with_timezone(slice: &str, timezone: Tz) -> Self {
        let granularity = Granularity::resolve(slice, Default::default()).unwrap_or_default();
        Self::from_parts(granularity, timezone, StorageStrategy::default())
    }

    /// Create a bucket in a timezone given by IANA name.
    pub fn with_timezone_name(slice: &str, timezone: &str) -> Result<Self> {
        Ok(Self::with_timezone(slice, parse_timezone(timezone)?))
    }

    /// Create a bucket from configuration.
    pub fn from_config(config: &BucketConfig) -> Result<Self> {
        let granularity = Granularity::resolve(&config.slice, config.granularity_policy)?;
        let timezone = parse_timezone(&config.timezone)?;
        Ok(Self::from_parts(granularity, timezone, config.storage))
    }

    pub fn from_parts(granularity: Granularity, timezone: Tz, storage: StorageStrategy) -> Self {
        tracing::debug!(
            slice_format = granularity.format().spec(),
            interval = granularity.interval(),
            timezone = timezone.name(),
            %storage,
            "creating time bucket"
        );
        Self {
            store: OrderedStore::new(storage),
            granularity,
            timezone,
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Number of items in the bucket.
    pub fn count(&self) -> usize {
        self.store.len()
    }

    /// Number of distinct time slices in the bucket.
    pub fn slice_count(&self) -> usize {
        self.store.priority_count()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// The format slice keys are rendered with.
    pub fn time_format(&self) -> SliceFormat {
        self.granularity.format()
    }

    /// Rounding interval in minutes.
    pub fn interval(&self) -> u32 {
        self.granularity.interval()
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn storage_strategy(&self) -> StorageStrategy {
        self.store.strategy()
    }

    // -------------------------------------------------------------------------
    // Insertion
    // -------------------------------------------------------------------------

    /// Derive the slice key a timestamp falls into.
    pub fn slice_key(&self, timestamp: impl Into<TimeInput>) -> Result<SliceKey> {
        let instant = timestamp.into().resolve(&self.timezone)?;
        let instant = if self.granularity.is_rounded() {
            let interval = self.granularity.interval();
            round_to_nearest_minute_interval(&instant, interval).ok_or_else(|| {
                BucketError::InvalidInput(format!(
                    "{} rounded to {} minutes is out of range",
                    instant, interval
                ))
            })?
        } else {
            instant
        };
        Ok(self.granularity.format().format(&instant))
    }

    /// Insert an item at a timestamp (epoch seconds, date/time text, or a
    /// chrono instant).
    pub fn insert(&mut self, datum: T, timestamp: impl Into<TimeInput>) -> Result<()> {
        let key = self.slice_key(timestamp)?;
        self.store.insert(datum, key);
        Ok(())
    }

    /// Insert an item directly under a slice key, bypassing timestamp
    /// parsing. Used when restoring snapshots whose keys are not instants.
    pub fn insert_at_key(&mut self, datum: T, key: SliceKey) {
        self.store.insert(datum, key);
    }

    // -------------------------------------------------------------------------
    // Slices
    // -------------------------------------------------------------------------

    /// Number of items in the next slice, before deduplication.
    pub fn next_time_slice_count(&self) -> usize {
        self.store.peek_set_count()
    }

    /// The distinct slice boundaries as instants, ascending and strictly
    /// increasing. Keys that do not name an instant are skipped.
    pub fn time_index(&self) -> TimeIndex {
        TimeIndex {
            keys: self.store.sorted_priorities().into_iter(),
            format: self.granularity.format(),
            timezone: self.timezone,
            last: None,
        }
    }
}

impl<T: Clone + PartialEq> TimeBucket<T> {
    /// Iterate the slices in ascending key order without modifying the
    /// bucket. Each call starts again from the bucket's current contents.
    pub fn time_slices(&self) -> TimeSlices<T> {
        TimeSlices {
            store: self.store.clone(),
        }
    }

    /// Peek at the next slice; `None` when the bucket is empty.
    pub fn next_time_slice(&self) -> Option<TimeSlice<T>> {
        if self.is_empty() {
            return None;
        }
        let mut store = self.store.clone();
        take_slice(&mut store)
    }

    /// Remove and return the next slice.
    pub fn extract_time_slice(&mut self) -> Result<TimeSlice<T>> {
        let slice = take_slice(&mut self.store).ok_or(BucketError::Empty("time bucket"))?;
        tracing::debug!(time = %slice.time, items = slice.len(), "extracted time slice");
        Ok(slice)
    }
}

/// Pop every item sharing the minimum key into one deduplicated slice.
fn take_slice<T: PartialEq>(store: &mut OrderedStore<T, SliceKey>) -> Option<TimeSlice<T>> {
    let mut items = Vec::with_capacity(store.peek_set_count());
    let (first, time) = store.pop_entry()?;
    items.push(first);

    while store.peek_entry().is_some_and(|(_, key)| *key == time) {
        match store.pop_entry() {
            Some((item, _)) => items.push(item),
            None => break,
        }
    }

    Some(TimeSlice::new(time, unique(items)))
}

// =============================================================================
// Time Slices Iterator
// =============================================================================

/// Lazy, ascending sequence of slices over a private copy of a bucket.
#[derive(Debug, Clone)]
pub struct TimeSlices<T> {
    store: OrderedStore<T, SliceKey>,
}

impl<T: PartialEq> Iterator for TimeSlices<T> {
    type Item = TimeSlice<T>;

    fn next(&mut self) -> Option<Self::Item> {
        take_slice(&mut self.store)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.store.priority_count();
        (remaining, Some(remaining))
    }
}

impl<T: PartialEq> ExactSizeIterator for TimeSlices<T> {}

impl<T: PartialEq> FusedIterator for TimeSlices<T> {}

// =============================================================================
// Time Index Iterator
// =============================================================================

/// Lazy, strictly increasing sequence of slice boundary instants.
#[derive(Debug, Clone)]
pub struct TimeIndex {
    keys: std::vec::IntoIter<SliceKey>,
    format: SliceFormat,
    timezone: Tz,
    last: Option<DateTime<Tz>>,
}

impl Iterator for TimeIndex {
    type Item = DateTime<Tz>;

    fn next(&mut self) -> Option<Self::Item> {
        for key in self.keys.by_ref() {
            let Some(instant) = self.format.parse_key(&key, &self.timezone) else {
                tracing::trace!(%key, "slice key is not an instant, skipping");
                continue;
            };
            if self.last.as_ref().is_none_or(|last| instant > *last) {
                self.last = Some(instant);
                return Some(instant);
            }
        }
        None
    }
}

impl FusedIterator for TimeIndex {}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_defaults() {
        let bucket: TimeBucket<i32> = TimeBucket::new("second");
        assert_eq!(bucket.timezone(), Tz::UTC);
        assert_eq!(bucket.timezone().name(), "UTC");
        assert_eq!(bucket.granularity(), Granularity::SECOND);
        assert_eq!(bucket.storage_strategy(), StorageStrategy::Bucketed);
        assert_eq!(bucket.interval(), 1);
    }

    #[test]
    fn test_timezone_by_name_and_object() {
        let bucket: TimeBucket<i32> =
            TimeBucket::with_timezone_name("second", "Australia/Sydney").unwrap();
        assert_eq!(bucket.timezone().name(), "Australia/Sydney");

        let bucket: TimeBucket<i32> = TimeBucket::with_timezone("second", Tz::Australia__Sydney);
        assert_eq!(bucket.timezone(), Tz::Australia__Sydney);

        assert!(TimeBucket::<i32>::with_timezone_name("second", "Nowhere/Special").is_err());
    }

    #[test]
    fn test_unknown_slice_falls_back_to_second() {
        let bucket: TimeBucket<i32> = TimeBucket::new("fortnight");
        assert_eq!(bucket.time_format().spec(), "%Y-%m-%d %H:%M:%S");
    }

    #[test]
    fn test_quarter_format() {
        let bucket: TimeBucket<i32> = TimeBucket::new("quarter");
        assert_eq!(bucket.time_format().spec(), "%Y-Q%q");
    }

    #[test]
    fn test_empty_bucket() {
        let mut bucket: TimeBucket<&str> = TimeBucket::new("second");
        assert!(bucket.is_empty());
        assert!(bucket.next_time_slice().is_none());
        assert_eq!(bucket.time_slices().count(), 0);
        assert_eq!(bucket.time_index().count(), 0);
        assert_eq!(bucket.next_time_slice_count(), 0);

        let err = bucket.extract_time_slice().unwrap_err();
        assert!(err.is_precondition_violation());
    }

    #[test]
    fn test_single_insert() {
        let mut bucket = TimeBucket::new("second");
        bucket.insert("test", 1).unwrap();

        assert!(!bucket.is_empty());
        assert_eq!(bucket.count(), 1);
        assert_eq!(bucket.slice_count(), 1);
        assert_eq!(bucket.next_time_slice_count(), 1);
    }

    #[test]
    fn test_next_time_slice_is_one_slice() {
        let mut bucket = TimeBucket::new("unixtime");
        let now = Utc::now().timestamp();
        bucket.insert("correct", now).unwrap();
        bucket.insert("incorrect", now + 1).unwrap();

        let slice = bucket.next_time_slice().unwrap();
        assert_eq!(slice.time, SliceKey::Int(now));
        assert_eq!(slice.data, vec!["correct"]);
        assert_eq!(bucket.count(), 2);
    }

    #[test]
    fn test_insert_instant_and_text() {
        let mut bucket = TimeBucket::new("unixtime");
        let instant = Utc.with_ymd_and_hms(2022, 2, 2, 2, 2, 2).unwrap();
        bucket.insert("instant", instant).unwrap();
        bucket.insert("text", "2022-02-02T02:02:02Z").unwrap();

        let slice = bucket.extract_time_slice().unwrap();
        assert_eq!(slice.time, SliceKey::Int(instant.timestamp()));
        assert_eq!(slice.data, vec!["instant", "text"]);
    }

    #[test]
    fn test_insert_now_text() {
        let mut bucket = TimeBucket::new("unixtime");
        let before = Utc::now().timestamp();
        bucket.insert("test", "now").unwrap();
        let after = Utc::now().timestamp();

        let time = bucket.next_time_slice().unwrap().time.as_int().unwrap();
        assert!(before <= time && time <= after);
    }

    #[test]
    fn test_malformed_text_fails() {
        let mut bucket = TimeBucket::new("second");
        let err = bucket.insert(1, "half past never").unwrap_err();
        assert!(matches!(err, BucketError::Parse(_)));
        assert!(bucket.is_empty());
    }

    #[test]
    fn test_minute_interval_rounding() {
        let mut bucket = TimeBucket::new("5 minute");
        bucket.insert("test", "2023-01-01 12:31:00").unwrap();

        let slice = bucket.next_time_slice().unwrap();
        assert_eq!(slice.time.as_str(), Some("2023-01-01 12:30:00"));
    }

    #[test]
    fn test_huge_minute_interval_rounds_to_hour() {
        let mut bucket = TimeBucket::new("3000000000 minute");
        assert_eq!(bucket.interval(), 3_000_000_000);
        bucket.insert(1, 0).unwrap();
        bucket.insert(2, "1970-01-01 00:59:00").unwrap();

        let slice = bucket.next_time_slice().unwrap();
        assert_eq!(slice.time.as_str(), Some("1970-01-01 00:00:00"));
        assert_eq!(slice.data, vec![1, 2]);
    }

    #[test]
    fn test_rounding_out_of_range_is_rejected() {
        let mut bucket = TimeBucket::new("5 minute");
        let latest = DateTime::<chrono::Utc>::MAX_UTC.timestamp();
        let err = bucket.insert(1, latest).unwrap_err();
        assert!(matches!(err, BucketError::InvalidInput(_)));
        assert!(bucket.is_empty());
    }

    #[test]
    fn test_timezone_applied_to_key() {
        let mut bucket = TimeBucket::with_timezone("hour", Tz::Asia__Tokyo);
        bucket.insert((), 0).unwrap();
        assert_eq!(
            bucket.next_time_slice().unwrap().time.as_str(),
            Some("1970-01-01 09:00:00")
        );
    }

    #[test]
    fn test_slices_deduplicate() {
        let mut bucket = TimeBucket::new("minute");
        bucket.insert(7, "2023-01-01 00:00:10").unwrap();
        bucket.insert(7, "2023-01-01 00:00:20").unwrap();
        bucket.insert(8, "2023-01-01 00:00:30").unwrap();

        assert_eq!(bucket.next_time_slice_count(), 3);
        let slice = bucket.extract_time_slice().unwrap();
        assert_eq!(slice.data, vec![7, 8]);
        assert!(bucket.is_empty());
    }

    #[test]
    fn test_time_slices_size_hint() {
        let mut bucket = TimeBucket::new("unixtime");
        for t in [3, 1, 2, 1] {
            bucket.insert(t, t).unwrap();
        }

        let mut slices = bucket.time_slices();
        assert_eq!(slices.len(), 3);
        slices.next();
        assert_eq!(slices.len(), 2);
    }

    #[test]
    fn test_time_index_strictly_increasing() {
        let mut bucket = TimeBucket::new("minute");
        bucket.insert(1, "2021-01-02 11:04:00").unwrap();
        bucket.insert(2, "2021-01-02 11:00:00").unwrap();
        bucket.insert(3, "2021-01-02 11:02:30").unwrap();
        bucket.insert(4, "2021-01-02 11:02:10").unwrap();

        let index: Vec<_> = bucket.time_index().map(|t| t.timestamp()).collect();
        let base = Utc.with_ymd_and_hms(2021, 1, 2, 11, 0, 0).unwrap().timestamp();
        assert_eq!(index, vec![base, base + 120, base + 240]);
    }

    #[test]
    fn test_time_index_skips_field_keys() {
        let mut bucket = TimeBucket::new("hourofday");
        bucket.insert("a", 0).unwrap();
        bucket.insert("b", 7200).unwrap();

        assert_eq!(bucket.slice_count(), 2);
        assert_eq!(bucket.time_index().count(), 0);
    }

    #[test]
    fn test_from_config() {
        let config = BucketConfig::new("hour")
            .with_timezone("Europe/Berlin")
            .with_storage(StorageStrategy::Heap);
        let bucket: TimeBucket<u8> = TimeBucket::from_config(&config).unwrap();

        assert_eq!(bucket.storage_strategy(), StorageStrategy::Heap);
        assert_eq!(bucket.timezone(), Tz::Europe__Berlin);

        let strict = BucketConfig::new("fortnight")
            .with_granularity_policy(timebucket_common::GranularityPolicy::Strict);
        assert!(TimeBucket::<u8>::from_config(&strict).is_err());
    }
}
