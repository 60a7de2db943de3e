//! TimeBucket Core - Time-Sliced Ordered Buckets
//!
//! Groups timestamped items into ordered time slices at a configurable
//! granularity and hands them back slice by slice, oldest first.
//!
//! Key Features:
//! - Pluggable ordered storage (binary heap or per-priority lists)
//! - Calendar, field and N-minute granularities in any IANA timezone
//! - Non-destructive slice iteration over private copies
//! - Snapshot serialization that round-trips field-only slice keys
//! - Sampling period estimation and gap detection
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

pub mod types;
pub mod storage;
pub mod heap;
pub mod bucketed;
pub mod datetime;
pub mod granularity;
pub mod bucket;
pub mod snapshot;
pub mod estimator;
pub mod multi;

pub use types::{SliceKey, TimeSlice};
pub use storage::{ExtractFlags, Extracted, OrderedStore, TimeOrderedStorage};
pub use heap::HeapStore;
pub use bucketed::BucketedStore;
pub use datetime::TimeInput;
pub use granularity::{Granularity, KeyShape, SliceFormat, SLICE_FORMATS};
pub use bucket::{TimeBucket, TimeIndex, TimeSlices};
pub use snapshot::BucketSnapshot;
pub use estimator::PeriodEstimator;
pub use multi::MultiTimeBucket;

pub use timebucket_common::{
    BucketConfig, BucketError, GranularityPolicy, Result, StorageStrategy,
};
