//! Property-based tests for TimeBucket ordered storage
//!
//! Runs the same invariants against both storage strategies through the
//! shared trait, then checks bucket-level slicing properties on top.

use proptest::prelude::*;
use timebucket_core::{
    OrderedStore, StorageStrategy, TimeBucket, TimeOrderedStorage,
};

const STRATEGIES: [StorageStrategy; 2] = [StorageStrategy::Heap, StorageStrategy::Bucketed];

/// Strategy to generate (value, priority) pairs with many repeated priorities
fn arbitrary_entries(max_len: usize) -> impl Strategy<Value = Vec<(u32, u8)>> {
    prop::collection::vec((any::<u32>(), 0u8..16), 0..max_len)
}

/// Strategy to generate epoch timestamps within a few hours
fn arbitrary_timestamps(max_len: usize) -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(1_600_000_000i64..1_600_010_000, 0..max_len)
}

fn bucket_with(strategy: StorageStrategy, timestamps: &[i64]) -> TimeBucket<usize> {
    let config = timebucket_core::BucketConfig::new("minute").with_storage(strategy);
    let mut bucket = TimeBucket::from_config(&config).unwrap();
    for (i, ts) in timestamps.iter().enumerate() {
        bucket.insert(i, *ts).unwrap();
    }
    bucket
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: count equals the number of inserts regardless of order
    #[test]
    fn count_matches_inserts(entries in arbitrary_entries(200)) {
        for strategy in STRATEGIES {
            let mut store = OrderedStore::new(strategy);
            for (value, priority) in &entries {
                store.insert(*value, *priority);
            }
            prop_assert_eq!(store.len(), entries.len());
            prop_assert_eq!(store.is_empty(), entries.is_empty());
        }
    }

    /// Property: extraction is ascending by priority and FIFO within a priority
    #[test]
    fn extraction_is_stable_sorted(entries in arbitrary_entries(200)) {
        let mut expected: Vec<(usize, u8)> = entries
            .iter()
            .enumerate()
            .map(|(i, (_, priority))| (i, *priority))
            .collect();
        // Stable sort keeps insertion order among equal priorities.
        expected.sort_by_key(|(_, priority)| *priority);

        for strategy in STRATEGIES {
            let mut store = OrderedStore::new(strategy);
            for (i, (_, priority)) in entries.iter().enumerate() {
                store.insert(i, *priority);
            }

            let drained: Vec<(usize, u8)> =
                std::iter::from_fn(|| store.pop_entry()).collect();
            prop_assert_eq!(&drained, &expected, "strategy {}", strategy);
            prop_assert!(store.is_empty());
        }
    }

    /// Property: both strategies agree on every observation while interleaving
    #[test]
    fn strategies_agree_when_interleaved(
        ops in prop::collection::vec(prop::option::of((any::<u16>(), 0u8..8)), 0..300)
    ) {
        let mut heap = OrderedStore::new(StorageStrategy::Heap);
        let mut bucketed = OrderedStore::new(StorageStrategy::Bucketed);

        for op in ops {
            match op {
                Some((value, priority)) => {
                    heap.insert(value, priority);
                    bucketed.insert(value, priority);
                }
                None => {
                    prop_assert_eq!(heap.pop_entry(), bucketed.pop_entry());
                }
            }
            prop_assert_eq!(heap.len(), bucketed.len());
            prop_assert_eq!(heap.priority_count(), bucketed.priority_count());
            prop_assert_eq!(heap.peek_entry(), bucketed.peek_entry());
            prop_assert_eq!(heap.peek_set_count(), bucketed.peek_set_count());
            prop_assert_eq!(heap.sorted_priorities(), bucketed.sorted_priorities());
        }
    }

    /// Property: mutating a clone never affects the original
    #[test]
    fn clones_are_independent(entries in arbitrary_entries(100), extra in any::<u8>()) {
        for strategy in STRATEGIES {
            let mut original = OrderedStore::new(strategy);
            for (value, priority) in &entries {
                original.insert(*value, *priority);
            }
            let before = original.sorted_priorities();

            let mut copy = original.clone();
            copy.insert(0, extra);
            while copy.pop_entry().is_some() {}

            prop_assert_eq!(original.len(), entries.len());
            prop_assert_eq!(original.sorted_priorities(), before);
        }
    }

    /// Property: extracting slices to exhaustion yields strictly ascending
    /// keys and accounts for every inserted item
    #[test]
    fn extracted_slices_ascend(timestamps in arbitrary_timestamps(150)) {
        for strategy in STRATEGIES {
            let mut bucket = bucket_with(strategy, &timestamps);
            let mut keys = Vec::new();
            let mut items = 0;

            while !bucket.is_empty() {
                let pending = bucket.next_time_slice_count();
                let slice = bucket.extract_time_slice().unwrap();
                // Items are distinct indices, so dedup never drops any.
                prop_assert_eq!(slice.len(), pending);
                items += slice.len();
                keys.push(slice.time);
            }

            prop_assert_eq!(items, timestamps.len());
            prop_assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
        }
    }

    /// Property: peeking traversals leave the bucket untouched and repeat
    #[test]
    fn time_slices_are_non_destructive(timestamps in arbitrary_timestamps(150)) {
        for strategy in STRATEGIES {
            let bucket = bucket_with(strategy, &timestamps);

            let first: Vec<_> = bucket.time_slices().collect();
            let second: Vec<_> = bucket.time_slices().collect();

            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.len(), bucket.slice_count());
            prop_assert_eq!(bucket.count(), timestamps.len());
            prop_assert_eq!(bucket.next_time_slice(), first.first().cloned());
        }
    }

    /// Property: the time index is strictly increasing with one entry per slice
    #[test]
    fn time_index_strictly_increases(timestamps in arbitrary_timestamps(150)) {
        let bucket = bucket_with(StorageStrategy::Bucketed, &timestamps);
        let index: Vec<_> = bucket.time_index().collect();

        prop_assert_eq!(index.len(), bucket.slice_count());
        prop_assert!(index.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
