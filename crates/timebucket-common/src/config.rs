//! TimeBucket Config - Configuration Structures
//!
//! Configuration for building time buckets. Supports loading from TOML files
//! and programmatic construction, with defaults matching a per-second UTC
//! bucket on the bucketed store.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use crate::types::{GranularityPolicy, StorageStrategy};
use serde::{Deserialize, Serialize};
use std::path::Path;

// =============================================================================
// Bucket Configuration
// =============================================================================

/// Configuration for a time bucket (and for every bucket a multi-series
/// collection creates).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketConfig {
    /// Granularity identifier, e.g. `"minute"` or `"15 minute"`.
    pub slice: String,
    /// IANA timezone name.
    pub timezone: String,
    pub storage: StorageStrategy,
    pub granularity_policy: GranularityPolicy,
}

impl Default for BucketConfig {
    fn default() -> Self {
        Self {
            slice: "second".to_string(),
            timezone: "UTC".to_string(),
            storage: StorageStrategy::default(),
            granularity_policy: GranularityPolicy::default(),
        }
    }
}

impl BucketConfig {
    /// Create a configuration for the given granularity with all other
    /// settings at their defaults.
    pub fn new(slice: impl Into<String>) -> Self {
        Self {
            slice: slice.into(),
            ..Default::default()
        }
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }

    pub fn with_storage(mut self, storage: StorageStrategy) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_granularity_policy(mut self, policy: GranularityPolicy) -> Self {
        self.granularity_policy = policy;
        self
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::BucketError::Configuration(e.to_string()))
    }
}

// =============================================================================
// Tests
// =============================================================================
