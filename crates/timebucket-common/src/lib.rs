//! TimeBucket Common - Shared Types and Utilities
//!
//! Foundational types, error handling, and configuration used by the
//! TimeBucket engine. Keeps the ambient concerns in one place so the engine
//! crate only deals with ordering and slicing.
//!
//! Key Features:
//! - Unified error type with precondition and user error detection
//! - Storage strategy and granularity policy enumerations
//! - Bucket configuration loadable from TOML
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

pub mod config;
pub mod error;
pub mod types;

pub use config::BucketConfig;
pub use error::{BucketError, Result};
pub use types::*;
