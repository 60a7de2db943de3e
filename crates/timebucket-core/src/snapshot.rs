//! TimeBucket Snapshot
//!
//! Serializable record of a bucket's contents and configuration. Restoring
//! re-inserts every item under its recorded slice key rather than going
//! through timestamp parsing, since field-only keys such as an hour of day
//! cannot be turned back into an instant.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use crate::bucket::TimeBucket;
use crate::datetime::parse_timezone;
use crate::granularity::{Granularity, SliceFormat};
use crate::types::TimeSlice;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use timebucket_common::{BucketError, Result, StorageStrategy};

// =============================================================================
// Snapshot Record
// =============================================================================

/// Bucket contents in ascending slice order plus the configuration needed to
/// rebuild it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketSnapshot<T> {
    pub data: Vec<TimeSlice<T>>,
    pub slice_format: String,
    #[serde(default = "default_interval")]
    pub interval: u32,
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_interval() -> u32 {
    1
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl<T> BucketSnapshot<T> {
    /// Total number of items across all recorded slices.
    pub fn item_count(&self) -> usize {
        self.data.iter().map(TimeSlice::len).sum()
    }
}

// =============================================================================
// Bucket Integration
// =============================================================================

impl<T: Clone + PartialEq> TimeBucket<T> {
    /// Capture the bucket without modifying it.
    pub fn snapshot(&self) -> BucketSnapshot<T> {
        BucketSnapshot {
            data: self.time_slices().collect(),
            slice_format: self.time_format().spec().to_string(),
            interval: self.interval(),
            timezone: self.timezone().name().to_string(),
        }
    }
}

impl<T: Clone + PartialEq + Serialize> TimeBucket<T> {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&self.snapshot())
            .map_err(|e| BucketError::Serialization(e.to_string()))
    }
}

impl<T> TimeBucket<T> {
    /// Rebuild a bucket using the default storage strategy.
    pub fn restore(snapshot: BucketSnapshot<T>) -> Result<Self> {
        Self::restore_with(snapshot, StorageStrategy::default())
    }

    /// Rebuild a bucket on a specific storage strategy.
    pub fn restore_with(snapshot: BucketSnapshot<T>, storage: StorageStrategy) -> Result<Self> {
        let format = SliceFormat::from_spec(&snapshot.slice_format)?;
        let granularity = Granularity::from_parts(format, snapshot.interval)?;
        let timezone = parse_timezone(&snapshot.timezone)?;

        let mut bucket = Self::from_parts(granularity, timezone, storage);
        for slice in snapshot.data {
            let TimeSlice { time, data } = slice;
            for datum in data {
                bucket.insert_at_key(datum, time.clone());
            }
        }

        tracing::debug!(
            items = bucket.count(),
            slices = bucket.slice_count(),
            "restored time bucket"
        );
        Ok(bucket)
    }
}

impl<T: for<'de> Deserialize<'de>> TimeBucket<T> {
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: BucketSnapshot<T> =
            serde_json::from_str(json).map_err(|e| BucketError::Serialization(e.to_string()))?;
        Self::restore(snapshot)
    }
}

impl<T: Clone + PartialEq + Serialize> Serialize for TimeBucket<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.snapshot().serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for TimeBucket<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let snapshot = BucketSnapshot::<T>::deserialize(deserializer)?;
        Self::restore(snapshot).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SliceKey;
    use chrono_tz::Tz;

    fn populated() -> TimeBucket<String> {
        let mut bucket = TimeBucket::with_timezone("minute", Tz::Australia__Sydney);
        bucket.insert("a".to_string(), "2021-01-02 11:00:10").unwrap();
        bucket.insert("b".to_string(), "2021-01-02 11:00:50").unwrap();
        bucket.insert("c".to_string(), "2021-01-02 11:03:00").unwrap();
        bucket
    }

    #[test]
    fn test_snapshot_contents() {
        let bucket = populated();
        let snapshot = bucket.snapshot();

        assert_eq!(snapshot.slice_format, "%Y-%m-%d %H:%M:00");
        assert_eq!(snapshot.interval, 1);
        assert_eq!(snapshot.timezone, "Australia/Sydney");
        assert_eq!(snapshot.data.len(), 2);
        assert_eq!(snapshot.item_count(), 3);
        assert_eq!(snapshot.data[0].time.as_str(), Some("2021-01-02 22:00:00"));
        assert_eq!(bucket.count(), 3);
    }

    #[test]
    fn test_json_round_trip() {
        let bucket = populated();
        let json = bucket.to_json().unwrap();
        let restored: TimeBucket<String> = TimeBucket::from_json(&json).unwrap();

        assert_eq!(restored.count(), bucket.count());
        assert_eq!(restored.slice_count(), bucket.slice_count());
        assert_eq!(restored.next_time_slice_count(), bucket.next_time_slice_count());
        assert_eq!(restored.timezone(), bucket.timezone());
        assert_eq!(restored.snapshot(), bucket.snapshot());
    }

    #[test]
    fn test_record_field_names() {
        let mut bucket = TimeBucket::new("10 minutes");
        bucket.insert(1, 0).unwrap();
        let value = serde_json::to_value(&bucket).unwrap();

        assert_eq!(value["sliceFormat"], "%Y-%m-%d %H:%M:00");
        assert_eq!(value["interval"], 10);
        assert_eq!(value["timezone"], "UTC");
        assert_eq!(value["data"][0]["time"], "1970-01-01 00:00:00");
        assert_eq!(value["data"][0]["data"][0], 1);
    }

    #[test]
    fn test_restore_field_keys_literally() {
        let json = r#"{
            "data": [
                {"time": "03", "data": ["x"]},
                {"time": "17", "data": ["y", "z"]}
            ],
            "sliceFormat": "%H"
        }"#;
        let mut bucket: TimeBucket<String> = TimeBucket::from_json(json).unwrap();

        assert_eq!(bucket.interval(), 1);
        assert_eq!(bucket.timezone(), Tz::UTC);
        assert_eq!(bucket.count(), 3);
        assert_eq!(bucket.extract_time_slice().unwrap().time, SliceKey::from("03"));
    }

    #[test]
    fn test_restore_epoch_keys() {
        let json = r#"{"data":[{"time":100,"data":[1]},{"time":101,"data":[2]}],"sliceFormat":"%s"}"#;
        let bucket: TimeBucket<i32> = serde_json::from_str(json).unwrap();
        assert_eq!(bucket.next_time_slice().unwrap().time, SliceKey::Int(100));
    }

    #[test]
    fn test_restore_with_heap_strategy() {
        let snapshot = populated().snapshot();
        let restored = TimeBucket::restore_with(snapshot, StorageStrategy::Heap).unwrap();
        assert_eq!(restored.storage_strategy(), StorageStrategy::Heap);
        assert_eq!(restored.count(), 3);
    }

    #[test]
    fn test_restore_rejects_bad_records() {
        let unknown_format = r#"{"data":[],"sliceFormat":"%Q"}"#;
        let err = TimeBucket::<i32>::from_json(unknown_format).unwrap_err();
        assert!(matches!(err, BucketError::UnknownSliceFormat(_)));

        let zero_interval = r#"{"data":[],"sliceFormat":"%H","interval":0}"#;
        assert!(TimeBucket::<i32>::from_json(zero_interval).is_err());

        let bad_zone = r#"{"data":[],"sliceFormat":"%H","timezone":"Atlantis/Capital"}"#;
        let err = TimeBucket::<i32>::from_json(bad_zone).unwrap_err();
        assert!(matches!(err, BucketError::UnknownTimezone(_)));

        let err = TimeBucket::<i32>::from_json("{not json").unwrap_err();
        assert!(matches!(err, BucketError::Serialization(_)));
    }
}
