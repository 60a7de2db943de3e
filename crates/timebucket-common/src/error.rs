//! TimeBucket Error - Unified Error Types
//!
//! Error handling for every TimeBucket operation. Categorizes failures by
//! origin (empty containers, timestamp parsing, configuration, snapshot
//! codec) and provides helpers for classifying them.
//!
//! Key Features:
//! - Precondition failures for extraction from empty stores and buckets
//! - Parse failures surfaced from the date/time layer
//! - User vs system error classification
//! - Seamless integration with std::io::Error
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

/// Unified error type for all TimeBucket operations.
#[derive(Error, Debug)]
pub enum BucketError {
    // Precondition errors
    #[error("cannot extract from an empty {0}")]
    Empty(&'static str),

    // Input errors
    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("unknown granularity: {0}")]
    UnknownGranularity(String),

    #[error("unknown slice format: {0}")]
    UnknownSliceFormat(String),

    // Serialization errors
    #[error("serialization error: {0}")]
    Serialization(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Type Aliases
// =============================================================================

/// Result type alias for TimeBucket operations.
pub type Result<T> = std::result::Result<T, BucketError>;

// =============================================================================
// Error Classification
// =============================================================================

impl BucketError {
    /// Returns true if the caller could have avoided the error by checking
    /// `is_empty()` first.
    pub fn is_precondition_violation(&self) -> bool {
        matches!(self, BucketError::Empty(_))
    }

    /// Returns true if this is a user error (vs system error).
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            BucketError::Empty(_)
                | BucketError::Parse(_)
                | BucketError::InvalidInput(_)
                | BucketError::UnknownTimezone(_)
                | BucketError::UnknownGranularity(_)
                | BucketError::UnknownSliceFormat(_)
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
