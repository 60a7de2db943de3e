//! TimeBucket Period Estimator
//!
//! Estimates the sampling period of a bucket from the spacing of its slice
//! boundaries, and locates boundaries missing from an expected cadence.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use crate::bucket::TimeBucket;
use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use timebucket_common::{BucketError, Result};

// =============================================================================
// Period Estimator
// =============================================================================

/// Upper bound on the boundaries `missing_boundaries` will walk.
pub const MAX_BOUNDARY_STEPS: i64 = 1_000_000;

/// Median-spacing estimator over a bucket's time index.
#[derive(Debug, Clone, Copy, Default)]
pub struct PeriodEstimator;

impl PeriodEstimator {
    pub fn new() -> Self {
        Self
    }

    /// Estimate the period between consecutive slice boundaries. Zero when
    /// the bucket is empty or has a single boundary.
    pub fn estimate<T>(&self, bucket: &TimeBucket<T>) -> Duration {
        if bucket.is_empty() {
            return Duration::zero();
        }

        let median_secs = median(&self.differences(bucket));
        Duration::milliseconds((median_secs * 1000.0).round() as i64)
    }

    /// Signed differences in seconds between consecutive boundaries.
    pub fn differences<T>(&self, bucket: &TimeBucket<T>) -> Vec<i64> {
        let mut differences = Vec::new();
        let mut previous: Option<i64> = None;
        for boundary in bucket.time_index() {
            let secs = boundary.timestamp();
            if let Some(prev) = previous {
                differences.push(secs - prev);
            }
            previous = Some(secs);
        }
        differences
    }

    /// Boundaries expected every `period` between the first and last index
    /// entries that the bucket does not hold.
    ///
    /// `period` must be at least one second, and the walk may take at most
    /// [`MAX_BOUNDARY_STEPS`] steps.
    pub fn missing_boundaries<T>(
        &self,
        bucket: &TimeBucket<T>,
        period: Duration,
    ) -> Result<Vec<DateTime<Tz>>> {
        if period < Duration::seconds(1) {
            return Err(BucketError::InvalidInput(format!(
                "period must be at least one second, got {}ms",
                period.num_milliseconds()
            )));
        }

        let index: Vec<DateTime<Tz>> = bucket.time_index().collect();
        let (Some(first), Some(last)) = (index.first(), index.last()) else {
            return Ok(Vec::new());
        };

        let steps = (*last - *first).num_milliseconds() / period.num_milliseconds();
        if steps > MAX_BOUNDARY_STEPS {
            return Err(BucketError::InvalidInput(format!(
                "{} boundaries between {} and {} exceeds the limit of {}",
                steps, first, last, MAX_BOUNDARY_STEPS
            )));
        }

        let mut missing = Vec::new();
        let mut expected = first.checked_add_signed(period);
        while let Some(boundary) = expected.filter(|boundary| boundary < last) {
            if index.binary_search(&boundary).is_err() {
                missing.push(boundary);
            }
            expected = boundary.checked_add_signed(period);
        }
        Ok(missing)
    }
}

// =============================================================================
// Statistics
// =============================================================================

/// Median of a series; 0 for an empty one.
pub fn median(values: &[i64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0
    } else {
        sorted[mid] as f64
    }
}

/// Population or sample standard deviation.
pub fn standard_deviation(values: &[f64], sample: bool) -> Result<f64> {
    let n = values.len();
    if n == 0 {
        return Err(BucketError::InvalidInput(
            "standard deviation of an empty series".to_string(),
        ));
    }
    if sample && n < 2 {
        return Err(BucketError::InvalidInput(
            "sample standard deviation needs at least two values".to_string(),
        ));
    }

    let mean = values.iter().sum::<f64>() / n as f64;
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    let divisor = if sample { n - 1 } else { n };
    Ok((sum_sq / divisor as f64).sqrt())
}

// =============================================================================
// Tests
// =============================================================================
