//! Aggregation strategies

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// How component levels fold into one system level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationStrategy {
    /// Minimum - the weakest component decides
    #[default]
    Conservative,
    /// Arithmetic mean
    Balanced,
    /// Maximum
    Performance,
}

impl AggregationStrategy {
    pub const ALL: [AggregationStrategy; 3] = [
        AggregationStrategy::Conservative,
        AggregationStrategy::Balanced,
        AggregationStrategy::Performance,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AggregationStrategy::Conservative => "conservative",
            AggregationStrategy::Balanced => "balanced",
            AggregationStrategy::Performance => "performance",
        }
    }
}

impl std::fmt::Display for AggregationStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Unrecognised strategy name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown aggregation strategy '{0}' (expected conservative, balanced or performance)")]
pub struct ParseStrategyError(pub String);

impl FromStr for AggregationStrategy {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "conservative" | "min" => Ok(AggregationStrategy::Conservative),
            "balanced" | "mean" => Ok(AggregationStrategy::Balanced),
            "performance" | "max" => Ok(AggregationStrategy::Performance),
            _ => Err(ParseStrategyError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_conservative() {
        assert_eq!(AggregationStrategy::default(), AggregationStrategy::Conservative);
    }

    #[test]
    fn test_parse_names_and_aliases() {
        assert_eq!("Balanced".parse(), Ok(AggregationStrategy::Balanced));
        assert_eq!(" max ".parse(), Ok(AggregationStrategy::Performance));
        assert_eq!("min".parse(), Ok(AggregationStrategy::Conservative));
        assert!("median".parse::<AggregationStrategy>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for strategy in AggregationStrategy::ALL {
            assert_eq!(strategy.to_string().parse(), Ok(strategy));
        }
    }
}
