//! Harmony: safety level harmonization protocol
//!
//! Independent components report a safety level in [0, 1]. The coordinator
//! folds them into one system level with a selectable strategy, classifies
//! that level into one of seven severity buckets and can force every
//! component back to the baseline in an emergency.

pub mod core;
pub mod types;

// =============================================================================
// CONSTANTS [C]
// =============================================================================

/// φ, the one canonical name for the ratio
pub const GOLDEN_RATIO: f64 = 1.618033988749895;

/// Emergency-recovery target and initial level of every default component
pub const BASELINE: f64 = 1.0 / GOLDEN_RATIO;

/// Lowest storable safety level
pub const MIN_LEVEL: f64 = 0.0;

/// Highest storable safety level
pub const MAX_LEVEL: f64 = 1.0;

// =============================================================================
// BUCKET BOUNDARIES [C] - fixed partition of [0, 1]
// =============================================================================

pub const CRITICAL_LOW_UPPER: f64 = 0.05;
pub const WARNING_LOW_UPPER: f64 = 0.15;
pub const CAUTION_LOW_UPPER: f64 = 0.25;
pub const OPTIMAL_UPPER: f64 = 0.75;
pub const CAUTION_HIGH_UPPER: f64 = 0.85;
pub const WARNING_HIGH_UPPER: f64 = 0.95;

// =============================================================================
// DEFAULTS
// =============================================================================

/// Components registered when no configuration names any
pub const DEFAULT_COMPONENTS: [&str; 4] = ["quantum", "launcher", "ai", "financial"];

/// Number of audit entries kept before the oldest are dropped
pub const DEFAULT_AUDIT_CAPACITY: usize = 256;

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";
