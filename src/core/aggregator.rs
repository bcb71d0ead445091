//! Aggregator: fold component levels into one system level

use crate::{MIN_LEVEL, MAX_LEVEL};
use crate::types::{AggregationStrategy, SafetyError, SafetyResult};

/// Reduce levels with the given strategy.
///
/// Balanced sums strictly left to right, so the same input order always
/// yields the same bits, and the mean never leaves [min, max].
pub fn aggregate(levels: &[f64], strategy: AggregationStrategy) -> SafetyResult<f64> {
    let (first, rest) = levels.split_first().ok_or(SafetyError::NoComponentsRegistered)?;

    if let Some(bad) = levels
        .iter()
        .find(|l| l.is_nan() || !(MIN_LEVEL..=MAX_LEVEL).contains(*l))
    {
        return Err(SafetyError::InvalidLevel(*bad));
    }

    let value = match strategy {
        AggregationStrategy::Conservative => rest.iter().fold(*first, |acc, &l| acc.min(l)),
        AggregationStrategy::Performance => rest.iter().fold(*first, |acc, &l| acc.max(l)),
        AggregationStrategy::Balanced => {
            let (sum, min, max) = rest
                .iter()
                .fold((*first, *first, *first), |(sum, min, max), &l| (sum + l, min.min(l), max.max(l)));
            // rounding in the sum must not push the mean outside the inputs
            (sum / levels.len() as f64).clamp(min, max)
        }
    };
    Ok(value)
}

// =============================================================================
// TESTS
// =============================================================================
