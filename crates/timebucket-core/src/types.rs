//! TimeBucket Types
//!
//! Core data types for slicing: the slice key that orders a bucket and the
//! time slice groups handed back to callers.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Slice Key
// =============================================================================

/// Ordering key derived from an instant under a slice format.
///
/// Keys from different formats are never compared with each other; within
/// one bucket every key has the same variant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SliceKey {
    /// Raw epoch seconds.
    Int(i64),
    /// Formatted date/time text.
    Text(String),
}

impl SliceKey {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Int(_) => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for SliceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{}", value),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<i64> for SliceKey {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<String> for SliceKey {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for SliceKey {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

// =============================================================================
// Time Slice
// =============================================================================

/// All items sharing one slice key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSlice<T> {
    pub time: SliceKey,
    pub data: Vec<T>,
}

impl<T> TimeSlice<T> {
    pub fn new(time: SliceKey, data: Vec<T>) -> Self {
        Self { time, data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Drop items equal to an earlier item, keeping first occurrences in order.
///
/// Equality is value equality, so two distinct readings that happen to
/// compare equal collapse into one.
pub fn unique<T: PartialEq>(items: Vec<T>) -> Vec<T> {
    let mut kept: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !kept.contains(&item) {
            kept.push(item);
        }
    }
    kept
}

// =============================================================================
// Tests
// =============================================================================
