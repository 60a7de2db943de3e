//! TimeBucket Ordered Storage
//!
//! The minimum-priority queue abstraction underneath every time bucket.
//! Values are ordered by an opaque, totally ordered priority; values sharing
//! a priority come back out in insertion order.
//!
//! Two strategies implement the same contract:
//! - [`HeapStore`]: binary min-heap, strictly ordered at all times
//! - [`BucketedStore`]: per-priority lists with a lazily sorted index
//!
//! [`OrderedStore`] selects one of them at construction time.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use crate::bucketed::BucketedStore;
use crate::heap::HeapStore;
use serde::{Deserialize, Serialize};
use std::hash::Hash;
use timebucket_common::{BucketError, Result, StorageStrategy};

// =============================================================================
// Extraction Mode
// =============================================================================

/// What `top`, `current` and `extract` hand back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExtractFlags {
    #[default]
    Data,
    Priority,
    Both,
}

/// A value returned under a given [`ExtractFlags`] mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted<V, P> {
    Data(V),
    Priority(P),
    Both { data: V, priority: P },
}

impl<V, P> Extracted<V, P> {
    pub fn from_entry(flags: ExtractFlags, data: V, priority: P) -> Self {
        match flags {
            ExtractFlags::Data => Self::Data(data),
            ExtractFlags::Priority => Self::Priority(priority),
            ExtractFlags::Both => Self::Both { data, priority },
        }
    }

    pub fn into_data(self) -> Option<V> {
        match self {
            Self::Data(data) | Self::Both { data, .. } => Some(data),
            Self::Priority(_) => None,
        }
    }

    pub fn into_priority(self) -> Option<P> {
        match self {
            Self::Priority(priority) | Self::Both { priority, .. } => Some(priority),
            Self::Data(_) => None,
        }
    }
}

// =============================================================================
// Storage Trait
// =============================================================================

/// Minimum-priority queue with FIFO ordering among equal priorities.
///
/// Invariants every implementation upholds:
/// - `len()` equals the number of inserted minus extracted values
/// - `is_empty()` holds exactly when no priority is present
/// - `peek_entry()` is the first-inserted value of the minimum priority
pub trait TimeOrderedStorage<V, P> {
    /// Insert a value under a priority.
    fn insert(&mut self, value: V, priority: P);

    /// Total number of values across all priorities.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of distinct priorities currently held.
    fn priority_count(&self) -> usize;

    /// Next value to be extracted, with its priority.
    fn peek_entry(&self) -> Option<(&V, &P)>;

    /// Remove and return the next value with its priority.
    fn pop_entry(&mut self) -> Option<(V, P)>;

    /// Number of values sharing the minimum priority.
    fn peek_set_count(&self) -> usize;

    /// Ascending snapshot of the distinct priorities.
    fn sorted_priorities(&self) -> Vec<P>;

    fn extract_flags(&self) -> ExtractFlags;

    fn set_extract_flags(&mut self, flags: ExtractFlags);

    /// Peek under the configured extraction mode.
    fn top(&self) -> Option<Extracted<V, P>>
    where
        V: Clone,
        P: Clone,
    {
        let flags = self.extract_flags();
        self.peek_entry()
            .map(|(value, priority)| Extracted::from_entry(flags, value.clone(), priority.clone()))
    }

    /// Alias of [`TimeOrderedStorage::top`].
    fn current(&self) -> Option<Extracted<V, P>>
    where
        V: Clone,
        P: Clone,
    {
        self.top()
    }

    /// Remove the next value under the configured extraction mode.
    fn extract(&mut self) -> Result<Extracted<V, P>> {
        let flags = self.extract_flags();
        self.pop_entry()
            .map(|(value, priority)| Extracted::from_entry(flags, value, priority))
            .ok_or(BucketError::Empty("ordered store"))
    }
}

// =============================================================================
// Ordered Store
// =============================================================================

/// Storage strategy chosen at construction time.
#[derive(Debug, Clone)]
pub enum OrderedStore<V, P> {
    Heap(HeapStore<V, P>),
    Bucketed(BucketedStore<V, P>),
}

impl<V, P> OrderedStore<V, P>
where
    P: Ord + Hash + Clone,
{
    pub fn new(strategy: StorageStrategy) -> Self {
        match strategy {
            StorageStrategy::Heap => Self::Heap(HeapStore::new()),
            StorageStrategy::Bucketed => Self::Bucketed(BucketedStore::new()),
        }
    }

    pub fn strategy(&self) -> StorageStrategy {
        match self {
            Self::Heap(_) => StorageStrategy::Heap,
            Self::Bucketed(_) => StorageStrategy::Bucketed,
        }
    }
}

impl<V, P> Default for OrderedStore<V, P>
where
    P: Ord + Hash + Clone,
{
    fn default() -> Self {
        Self::new(StorageStrategy::default())
    }
}

impl<V, P> TimeOrderedStorage<V, P> for OrderedStore<V, P>
where
    P: Ord + Hash + Clone,
{
    fn insert(&mut self, value: V, priority: P) {
        match self {
            Self::Heap(store) => store.insert(value, priority),
            Self::Bucketed(store) => store.insert(value, priority),
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::Heap(store) => store.len(),
            Self::Bucketed(store) => store.len(),
        }
    }

    fn priority_count(&self) -> usize {
        match self {
            Self::Heap(store) => store.priority_count(),
            Self::Bucketed(store) => store.priority_count(),
        }
    }

    fn peek_entry(&self) -> Option<(&V, &P)> {
        match self {
            Self::Heap(store) => store.peek_entry(),
            Self::Bucketed(store) => store.peek_entry(),
        }
    }

    fn pop_entry(&mut self) -> Option<(V, P)> {
        match self {
            Self::Heap(store) => store.pop_entry(),
            Self::Bucketed(store) => store.pop_entry(),
        }
    }

    fn peek_set_count(&self) -> usize {
        match self {
            Self::Heap(store) => store.peek_set_count(),
            Self::Bucketed(store) => store.peek_set_count(),
        }
    }

    fn sorted_priorities(&self) -> Vec<P> {
        match self {
            Self::Heap(store) => store.sorted_priorities(),
            Self::Bucketed(store) => store.sorted_priorities(),
        }
    }

    fn extract_flags(&self) -> ExtractFlags {
        match self {
            Self::Heap(store) => store.extract_flags(),
            Self::Bucketed(store) => store.extract_flags(),
        }
    }

    fn set_extract_flags(&mut self, flags: ExtractFlags) {
        match self {
            Self::Heap(store) => store.set_extract_flags(flags),
            Self::Bucketed(store) => store.set_extract_flags(flags),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
