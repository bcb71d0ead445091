//! Threshold Table: classify a level into one of seven severity buckets
//!
//! Partition of [0, 1]:
//! - CRITICAL_LOW  [0.00, 0.05]
//! - WARNING_LOW   (0.05, 0.15]
//! - CAUTION_LOW   (0.15, 0.25)
//! - OPTIMAL       [0.25, 0.75]
//! - CAUTION_HIGH  (0.75, 0.85]
//! - WARNING_HIGH  (0.85, 0.95)
//! - CRITICAL_HIGH [0.95, 1.00]
//!
//! Each bucket owns its upper boundary, with two exceptions: OPTIMAL also
//! owns 0.25 and CRITICAL_HIGH owns 0.95.

use crate::{
    MIN_LEVEL, MAX_LEVEL,
    CRITICAL_LOW_UPPER, WARNING_LOW_UPPER, CAUTION_LOW_UPPER,
    OPTIMAL_UPPER, CAUTION_HIGH_UPPER, WARNING_HIGH_UPPER,
};
use crate::types::{SafetyError, SafetyResult, SeverityBucket};

/// One row of the table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BucketSpec {
    pub bucket: SeverityBucket,
    pub lower: f64,
    pub upper: f64,
    pub includes_lower: bool,
    pub includes_upper: bool,
}

impl BucketSpec {
    /// Does this interval contain `level`?
    pub fn contains(&self, level: f64) -> bool {
        let above = if self.includes_lower { level >= self.lower } else { level > self.lower };
        let below = if self.includes_upper { level <= self.upper } else { level < self.upper };
        above && below
    }
}

static BUCKETS: [BucketSpec; 7] = [
    BucketSpec {
        bucket: SeverityBucket::CriticalLow,
        lower: MIN_LEVEL,
        upper: CRITICAL_LOW_UPPER,
        includes_lower: true,
        includes_upper: true,
    },
    BucketSpec {
        bucket: SeverityBucket::WarningLow,
        lower: CRITICAL_LOW_UPPER,
        upper: WARNING_LOW_UPPER,
        includes_lower: false,
        includes_upper: true,
    },
    BucketSpec {
        bucket: SeverityBucket::CautionLow,
        lower: WARNING_LOW_UPPER,
        upper: CAUTION_LOW_UPPER,
        includes_lower: false,
        includes_upper: false,
    },
    BucketSpec {
        bucket: SeverityBucket::Optimal,
        lower: CAUTION_LOW_UPPER,
        upper: OPTIMAL_UPPER,
        includes_lower: true,
        includes_upper: true,
    },
    BucketSpec {
        bucket: SeverityBucket::CautionHigh,
        lower: OPTIMAL_UPPER,
        upper: CAUTION_HIGH_UPPER,
        includes_lower: false,
        includes_upper: true,
    },
    BucketSpec {
        bucket: SeverityBucket::WarningHigh,
        lower: CAUTION_HIGH_UPPER,
        upper: WARNING_HIGH_UPPER,
        includes_lower: false,
        includes_upper: false,
    },
    BucketSpec {
        bucket: SeverityBucket::CriticalHigh,
        lower: WARNING_HIGH_UPPER,
        upper: MAX_LEVEL,
        includes_lower: true,
        includes_upper: true,
    },
];

/// Fixed, immutable threshold table
#[derive(Debug, Default, Clone, Copy)]
pub struct ThresholdTable;

impl ThresholdTable {
    /// Create the table
    pub fn new() -> Self {
        Self
    }

    /// Classify a level. The caller clamps; anything non-finite or outside
    /// [0, 1] is rejected rather than defaulted.
    pub fn classify(&self, level: f64) -> SafetyResult<SeverityBucket> {
        if !level.is_finite() || !(MIN_LEVEL..=MAX_LEVEL).contains(&level) {
            return Err(SafetyError::InvalidLevel(level));
        }

        self.buckets()
            .iter()
            .find(|spec| spec.contains(level))
            .map(|spec| spec.bucket)
            .ok_or(SafetyError::InvalidLevel(level))
    }

    /// All rows in ascending order
    pub fn buckets(&self) -> &'static [BucketSpec] {
        &BUCKETS
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_shared_boundaries() {
        let table = ThresholdTable::new();
        assert_eq!(table.classify(0.05), Ok(SeverityBucket::CriticalLow));
        assert_eq!(table.classify(0.15), Ok(SeverityBucket::WarningLow));
        assert_eq!(table.classify(0.25), Ok(SeverityBucket::Optimal));
        assert_eq!(table.classify(0.75), Ok(SeverityBucket::Optimal));
        assert_eq!(table.classify(0.85), Ok(SeverityBucket::CautionHigh));
        assert_eq!(table.classify(0.95), Ok(SeverityBucket::CriticalHigh));
    }

    #[test]
    fn test_endpoints() {
        let table = ThresholdTable::new();
        assert_eq!(table.classify(0.0), Ok(SeverityBucket::CriticalLow));
        assert_eq!(table.classify(1.0), Ok(SeverityBucket::CriticalHigh));
    }

    #[test]
    fn test_interior_points() {
        let table = ThresholdTable::new();
        let cases = [
            (0.03, SeverityBucket::CriticalLow),
            (0.10, SeverityBucket::WarningLow),
            (0.20, SeverityBucket::CautionLow),
            (crate::BASELINE, SeverityBucket::Optimal),
            (0.80, SeverityBucket::CautionHigh),
            (0.90, SeverityBucket::WarningHigh),
            (0.97, SeverityBucket::CriticalHigh),
        ];
        for (level, expected) in cases {
            assert_eq!(table.classify(level), Ok(expected), "level {}", level);
        }
    }

    #[test]
    fn test_just_past_boundaries() {
        let table = ThresholdTable::new();
        let eps = 1e-9;
        assert_eq!(table.classify(0.05 + eps), Ok(SeverityBucket::WarningLow));
        assert_eq!(table.classify(0.25 - eps), Ok(SeverityBucket::CautionLow));
        assert_eq!(table.classify(0.75 + eps), Ok(SeverityBucket::CautionHigh));
        assert_eq!(table.classify(0.95 - eps), Ok(SeverityBucket::WarningHigh));
    }

    #[test]
    fn test_upper_boundary_ownership() {
        let table = ThresholdTable::new();
        // every shared boundary goes to the bucket below it, except 0.25 and 0.95
        for pair in table.buckets().windows(2) {
            let boundary = pair[0].upper;
            let expected = if boundary == CAUTION_LOW_UPPER || boundary == WARNING_HIGH_UPPER {
                pair[1].bucket
            } else {
                pair[0].bucket
            };
            assert_eq!(table.classify(boundary), Ok(expected), "boundary {}", boundary);
        }
        assert_eq!(table.classify(0.85 + 1e-9), Ok(SeverityBucket::WarningHigh));
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let table = ThresholdTable::new();
        assert!(matches!(table.classify(f64::NAN), Err(SafetyError::InvalidLevel(_))));
        assert_eq!(table.classify(f64::INFINITY), Err(SafetyError::InvalidLevel(f64::INFINITY)));
        assert_eq!(table.classify(-0.01), Err(SafetyError::InvalidLevel(-0.01)));
        assert_eq!(table.classify(1.01), Err(SafetyError::InvalidLevel(1.01)));
    }

    #[test]
    fn test_rows_tile_the_unit_interval() {
        let table = ThresholdTable::new();
        let rows = table.buckets();
        assert_eq!(rows.first().unwrap().lower, 0.0);
        assert_eq!(rows.last().unwrap().upper, 1.0);
        for pair in rows.windows(2) {
            assert_eq!(pair[0].upper, pair[1].lower);
            // exactly one side owns the shared boundary
            assert_ne!(pair[0].includes_upper, pair[1].includes_lower);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(10_000))]

        #[test]
        fn classify_is_total_over_unit_interval(level in 0.0f64..=1.0) {
            let table = ThresholdTable::new();
            let bucket = table.classify(level);
            prop_assert!(bucket.is_ok());
            let matching = table.buckets().iter().filter(|spec| spec.contains(level)).count();
            prop_assert_eq!(matching, 1);
        }
    }
}
