//! TimeBucket Types - Shared Enumerations
//!
//! Small configuration enumerations shared between the configuration layer
//! and the bucket engine.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Storage Strategy
// =============================================================================

/// Ordered-store implementation backing a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageStrategy {
    /// Binary min-heap with an insertion serial as tie-breaker.
    Heap,
    /// Per-priority value lists with a lazily sorted priority index.
    #[default]
    Bucketed,
}

impl fmt::Display for StorageStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Heap => write!(f, "heap"),
            Self::Bucketed => write!(f, "bucketed"),
        }
    }
}

// =============================================================================
// Granularity Policy
// =============================================================================

/// How unknown granularity identifiers are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GranularityPolicy {
    /// Unknown identifiers resolve to per-second slices.
    #[default]
    Lenient,
    /// Unknown identifiers are rejected.
    Strict,
}

// =============================================================================
// Tests
// =============================================================================
