//! TimeBucket Multi-Series Bucket
//!
//! A set of time buckets keyed by series, all sharing one granularity,
//! timezone and storage strategy. Buckets are created the first time a
//! series receives an item.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use crate::bucket::TimeBucket;
use crate::datetime::{parse_timezone, TimeInput};
use crate::granularity::Granularity;
use chrono_tz::Tz;
use std::collections::HashMap;
use std::hash::Hash;
use timebucket_common::{BucketConfig, Result, StorageStrategy};

// =============================================================================
// Multi Time Bucket
// =============================================================================

/// Time buckets partitioned by series key.
#[derive(Debug, Clone)]
pub struct MultiTimeBucket<K, T> {
    buckets: HashMap<K, TimeBucket<T>>,
    granularity: Granularity,
    timezone: Tz,
    storage: StorageStrategy,
}

impl<K: Eq + Hash, T> MultiTimeBucket<K, T> {
    /// Create a multi-series bucket, optionally pre-creating empty buckets
    /// for the given series.
    pub fn new(slice: &str, timezone: Tz, series: Option<Vec<K>>) -> Self {
        let granularity = Granularity::resolve(slice, Default::default()).unwrap_or_default();
        let mut multi = Self::from_parts(granularity, timezone, StorageStrategy::default());
        multi.register(series.unwrap_or_default());
        multi
    }

    /// Create a multi-series bucket in a timezone given by IANA name.
    pub fn with_timezone_name(slice: &str, timezone: &str, series: Option<Vec<K>>) -> Result<Self> {
        Ok(Self::new(slice, parse_timezone(timezone)?, series))
    }

    pub fn from_config(config: &BucketConfig) -> Result<Self> {
        let granularity = Granularity::resolve(&config.slice, config.granularity_policy)?;
        let timezone = parse_timezone(&config.timezone)?;
        Ok(Self::from_parts(granularity, timezone, config.storage))
    }

    fn from_parts(granularity: Granularity, timezone: Tz, storage: StorageStrategy) -> Self {
        Self {
            buckets: HashMap::new(),
            granularity,
            timezone,
            storage,
        }
    }

    fn new_bucket(&self) -> TimeBucket<T> {
        TimeBucket::from_parts(self.granularity, self.timezone, self.storage)
    }

    /// Pre-create empty buckets for series not yet present.
    pub fn register(&mut self, series: impl IntoIterator<Item = K>) {
        for key in series {
            if !self.buckets.contains_key(&key) {
                let bucket = self.new_bucket();
                self.buckets.insert(key, bucket);
            }
        }
    }

    /// Insert an item into a series, creating its bucket on first use.
    pub fn insert(
        &mut self,
        series: K,
        datum: T,
        timestamp: impl Into<TimeInput>,
    ) -> Result<()> {
        if let Some(bucket) = self.buckets.get_mut(&series) {
            return bucket.insert(datum, timestamp);
        }

        let mut bucket = self.new_bucket();
        bucket.insert(datum, timestamp)?;
        self.buckets.insert(series, bucket);
        Ok(())
    }

    /// True when every series bucket is empty.
    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(TimeBucket::is_empty)
    }

    /// Number of series.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Number of items across all series.
    pub fn total_count(&self) -> usize {
        self.buckets.values().map(TimeBucket::count).sum()
    }

    pub fn get(&self, series: &K) -> Option<&TimeBucket<T>> {
        self.buckets.get(series)
    }

    pub fn get_mut(&mut self, series: &K) -> Option<&mut TimeBucket<T>> {
        self.buckets.get_mut(series)
    }

    pub fn remove(&mut self, series: &K) -> Option<TimeBucket<T>> {
        self.buckets.remove(series)
    }

    /// Iterate series keys with their buckets, in no particular order.
    pub fn series(&self) -> impl Iterator<Item = (&K, &TimeBucket<T>)> {
        self.buckets.iter()
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }
}

// =============================================================================
// Tests
// =============================================================================
