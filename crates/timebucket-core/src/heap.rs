//! TimeBucket Heap Store
//!
//! Binary min-heap over (priority, serial) pairs. The serial increases with
//! every insert and only breaks ties, so equal priorities leave the heap in
//! insertion order.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use crate::storage::{ExtractFlags, TimeOrderedStorage};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::hash::Hash;

// =============================================================================
// Heap Entry
// =============================================================================

#[derive(Debug, Clone)]
struct HeapEntry<V, P> {
    priority: P,
    serial: u64,
    value: V,
}

impl<V, P: Ord> PartialEq for HeapEntry<V, P> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<V, P: Ord> Eq for HeapEntry<V, P> {}

impl<V, P: Ord> PartialOrd for HeapEntry<V, P> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<V, P: Ord> Ord for HeapEntry<V, P> {
    // Reversed: BinaryHeap is a max-heap, we want the lowest (priority, serial) on top.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.serial.cmp(&self.serial))
    }
}

// =============================================================================
// Heap Store
// =============================================================================

/// Heap-backed ordered store.
#[derive(Debug, Clone)]
pub struct HeapStore<V, P> {
    heap: BinaryHeap<HeapEntry<V, P>>,
    counts: HashMap<P, usize>,
    serial: u64,
    flags: ExtractFlags,
}

impl<V, P> HeapStore<V, P>
where
    P: Ord + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            counts: HashMap::new(),
            serial: 0,
            flags: ExtractFlags::default(),
        }
    }
}

impl<V, P> Default for HeapStore<V, P>
where
    P: Ord + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V, P> TimeOrderedStorage<V, P> for HeapStore<V, P>
where
    P: Ord + Hash + Clone,
{
    fn insert(&mut self, value: V, priority: P) {
        *self.counts.entry(priority.clone()).or_insert(0) += 1;
        self.heap.push(HeapEntry {
            priority,
            serial: self.serial,
            value,
        });
        self.serial += 1;
    }

    fn len(&self) -> usize {
        self.heap.len()
    }

    fn priority_count(&self) -> usize {
        self.counts.len()
    }

    fn peek_entry(&self) -> Option<(&V, &P)> {
        self.heap.peek().map(|entry| (&entry.value, &entry.priority))
    }

    fn pop_entry(&mut self) -> Option<(V, P)> {
        let entry = self.heap.pop()?;
        if let Some(count) = self.counts.get_mut(&entry.priority) {
            *count -= 1;
            if *count == 0 {
                self.counts.remove(&entry.priority);
            }
        }
        if self.heap.is_empty() {
            self.serial = 0;
        }
        Some((entry.value, entry.priority))
    }

    fn peek_set_count(&self) -> usize {
        self.heap
            .peek()
            .and_then(|entry| self.counts.get(&entry.priority))
            .copied()
            .unwrap_or(0)
    }

    fn sorted_priorities(&self) -> Vec<P> {
        let mut priorities: Vec<P> = self.counts.keys().cloned().collect();
        priorities.sort_unstable();
        priorities
    }

    fn extract_flags(&self) -> ExtractFlags {
        self.flags
    }

    fn set_extract_flags(&mut self, flags: ExtractFlags) {
        self.flags = flags;
    }
}

// =============================================================================
// Tests
// =============================================================================
