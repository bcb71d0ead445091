//! Reason codes for audit entries and state changes

use serde::{Deserialize, Serialize};

/// Reason codes for everything the coordinator records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum ReasonCode {
    // =========================================================================
    // R001: Registry
    // =========================================================================
    /// New component added to the registry
    R001_COMPONENT_REGISTERED,

    // =========================================================================
    // R002: Component writes
    // =========================================================================
    /// Component level stored as requested
    R002_LEVEL_UPDATED,
    /// Requested level was outside [0, 1] and clamped
    R002_LEVEL_CLAMPED,

    // =========================================================================
    // R003: Strategy
    // =========================================================================
    /// Aggregation strategy changed
    R003_STRATEGY_CHANGED,

    // =========================================================================
    // R004: Classification
    // =========================================================================
    /// System level crossed into another bucket
    R004_BUCKET_TRANSITION,

    // =========================================================================
    // R005: Emergency
    // =========================================================================
    /// Entered a critical bucket
    R005_EMERGENCY_ENTERED,
    /// Left the critical buckets
    R005_EMERGENCY_CLEARED,

    // =========================================================================
    // R006: Coordinated actions
    // =========================================================================
    /// Every component set to one target level
    R006_HARMONIZED,
    /// Every component reset to the baseline
    R006_EMERGENCY_STABILIZED,
}

impl ReasonCode {
    /// Get the code string (for logging)
    pub fn code(&self) -> &'static str {
        match self {
            Self::R001_COMPONENT_REGISTERED => "R001_COMPONENT_REGISTERED",
            Self::R002_LEVEL_UPDATED => "R002_LEVEL_UPDATED",
            Self::R002_LEVEL_CLAMPED => "R002_LEVEL_CLAMPED",
            Self::R003_STRATEGY_CHANGED => "R003_STRATEGY_CHANGED",
            Self::R004_BUCKET_TRANSITION => "R004_BUCKET_TRANSITION",
            Self::R005_EMERGENCY_ENTERED => "R005_EMERGENCY_ENTERED",
            Self::R005_EMERGENCY_CLEARED => "R005_EMERGENCY_CLEARED",
            Self::R006_HARMONIZED => "R006_HARMONIZED",
            Self::R006_EMERGENCY_STABILIZED => "R006_EMERGENCY_STABILIZED",
        }
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::R001_COMPONENT_REGISTERED => "Component registered",
            Self::R002_LEVEL_UPDATED => "Component level updated",
            Self::R002_LEVEL_CLAMPED => "Component level clamped into [0, 1]",
            Self::R003_STRATEGY_CHANGED => "Aggregation strategy changed",
            Self::R004_BUCKET_TRANSITION => "Severity bucket changed",
            Self::R005_EMERGENCY_ENTERED => "Entered critical bucket",
            Self::R005_EMERGENCY_CLEARED => "Left critical bucket",
            Self::R006_HARMONIZED => "All components harmonized",
            Self::R006_EMERGENCY_STABILIZED => "Emergency stabilization to baseline",
        }
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}
