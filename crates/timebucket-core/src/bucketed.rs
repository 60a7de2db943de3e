//! TimeBucket Bucketed Store
//!
//! Ordered store built from one FIFO list per distinct priority plus an index
//! of the distinct priorities. The index is kept in descending order so the
//! minimum sits at the end and can be popped cheaply.
//!
//! Sorting the index is deferred: an insert that lands out of order only
//! marks the index unsorted, and the full re-sort happens the first time a
//! priority drains after such inserts. The current minimum is tracked
//! eagerly, so peeking never needs the sort. When priority cardinality is low
//! relative to item count this uses far less memory than the heap store.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use crate::storage::{ExtractFlags, TimeOrderedStorage};
use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

// =============================================================================
// Bucketed Store
// =============================================================================

/// Bucketed-array-backed ordered store.
#[derive(Debug, Clone)]
pub struct BucketedStore<V, P> {
    /// Priority to index into `values`.
    slots: HashMap<P, usize>,
    values: Vec<VecDeque<V>>,
    free_slots: Vec<usize>,
    /// Distinct priorities, descending when `unsorted` is false.
    priorities: Vec<P>,
    unsorted: bool,
    top: Option<P>,
    total: usize,
    flags: ExtractFlags,
}

impl<V, P> BucketedStore<V, P>
where
    P: Ord + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
            values: Vec::new(),
            free_slots: Vec::new(),
            priorities: Vec::new(),
            unsorted: false,
            top: None,
            total: 0,
            flags: ExtractFlags::default(),
        }
    }

    /// Whether a deferred re-sort of the priority index is pending.
    pub fn needs_sort(&self) -> bool {
        self.unsorted
    }

    fn allocate_slot(&mut self) -> usize {
        match self.free_slots.pop() {
            Some(slot) => slot,
            None => {
                self.values.push(VecDeque::new());
                self.values.len() - 1
            }
        }
    }

    fn resolve_order(&mut self) {
        if self.unsorted {
            tracing::trace!(priorities = self.priorities.len(), "resorting priority index");
            self.priorities.sort_unstable_by(|a, b| b.cmp(a));
            self.unsorted = false;
        }
    }

    /// Drop the drained minimum priority and advance `top`.
    fn retire_top(&mut self, priority: &P, slot: usize) {
        self.slots.remove(priority);
        self.free_slots.push(slot);
        self.resolve_order();
        self.priorities.pop();
        debug_assert!(self.priorities.iter().all(|p| p > priority));
        self.top = self.priorities.last().cloned();

        if self.priorities.is_empty() {
            self.values = Vec::new();
            self.free_slots = Vec::new();
            self.slots = HashMap::new();
        }
    }
}

impl<V, P> Default for BucketedStore<V, P>
where
    P: Ord + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V, P> TimeOrderedStorage<V, P> for BucketedStore<V, P>
where
    P: Ord + Hash + Clone,
{
    fn insert(&mut self, value: V, priority: P) {
        let slot = match self.slots.get(&priority) {
            Some(&slot) => slot,
            None => {
                let slot = self.allocate_slot();
                self.slots.insert(priority.clone(), slot);

                let is_new_min = self.top.as_ref().is_none_or(|top| priority < *top);
                if !is_new_min {
                    self.unsorted = true;
                }
                self.priorities.push(priority.clone());
                if is_new_min {
                    self.top = Some(priority);
                }
                slot
            }
        };

        self.values[slot].push_back(value);
        self.total += 1;
    }

    fn len(&self) -> usize {
        self.total
    }

    fn priority_count(&self) -> usize {
        self.slots.len()
    }

    fn peek_entry(&self) -> Option<(&V, &P)> {
        let top = self.top.as_ref()?;
        let slot = *self.slots.get(top)?;
        self.values[slot].front().map(|value| (value, top))
    }

    fn pop_entry(&mut self) -> Option<(V, P)> {
        let priority = self.top.clone()?;
        let slot = *self.slots.get(&priority)?;
        let value = self.values[slot].pop_front()?;
        self.total -= 1;

        if self.values[slot].is_empty() {
            self.retire_top(&priority, slot);
        }

        Some((value, priority))
    }

    fn peek_set_count(&self) -> usize {
        self.top
            .as_ref()
            .and_then(|top| self.slots.get(top))
            .map(|&slot| self.values[slot].len())
            .unwrap_or(0)
    }

    fn sorted_priorities(&self) -> Vec<P> {
        let mut priorities = self.priorities.clone();
        if self.unsorted {
            priorities.sort_unstable();
        } else {
            priorities.reverse();
        }
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
