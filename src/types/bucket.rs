//! Severity bucket definitions

use colored::Color;
use serde::{Deserialize, Serialize};

/// The seven ordered severity buckets partitioning [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeverityBucket {
    /// [0.00, 0.05] - lockdown
    CriticalLow,
    /// (0.05, 0.15]
    WarningLow,
    /// (0.15, 0.25)
    CautionLow,
    /// [0.25, 0.75] - normal operation
    Optimal,
    /// (0.75, 0.85]
    CautionHigh,
    /// (0.85, 0.95)
    WarningHigh,
    /// [0.95, 1.00] - quarantine
    CriticalHigh,
}

impl SeverityBucket {
    /// All buckets in ascending order
    pub const ALL: [SeverityBucket; 7] = [
        SeverityBucket::CriticalLow,
        SeverityBucket::WarningLow,
        SeverityBucket::CautionLow,
        SeverityBucket::Optimal,
        SeverityBucket::CautionHigh,
        SeverityBucket::WarningHigh,
        SeverityBucket::CriticalHigh,
    ];

    /// Critical buckets raise the emergency flag
    pub fn is_critical(&self) -> bool {
        matches!(self, SeverityBucket::CriticalLow | SeverityBucket::CriticalHigh)
    }

    /// Operating-mode descriptor attached to this bucket
    pub fn operating_mode(&self) -> &'static OperatingMode {
        match self {
            SeverityBucket::CriticalLow => &LOCKDOWN,
            SeverityBucket::WarningLow => &RESTRICTED,
            SeverityBucket::CautionLow => &GUARDED,
            SeverityBucket::Optimal => &NOMINAL,
            SeverityBucket::CautionHigh => &ELEVATED,
            SeverityBucket::WarningHigh => &THROTTLED,
            SeverityBucket::CriticalHigh => &QUARANTINE,
        }
    }

    /// Terminal color
    pub fn color(&self) -> Color {
        match self {
            SeverityBucket::CriticalLow | SeverityBucket::CriticalHigh => Color::Red,
            SeverityBucket::WarningLow | SeverityBucket::WarningHigh => Color::Yellow,
            SeverityBucket::CautionLow | SeverityBucket::CautionHigh => Color::Cyan,
            SeverityBucket::Optimal => Color::Green,
        }
    }

    /// Get emoji for bucket
    pub fn emoji(&self) -> &'static str {
        match self {
            SeverityBucket::CriticalLow | SeverityBucket::CriticalHigh => "🔴",
            SeverityBucket::WarningLow | SeverityBucket::WarningHigh => "🟠",
            SeverityBucket::CautionLow | SeverityBucket::CautionHigh => "🟡",
            SeverityBucket::Optimal => "🟢",
        }
    }
}

impl std::fmt::Display for SeverityBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SeverityBucket::CriticalLow => "CRITICAL_LOW",
            SeverityBucket::WarningLow => "WARNING_LOW",
            SeverityBucket::CautionLow => "CAUTION_LOW",
            SeverityBucket::Optimal => "OPTIMAL",
            SeverityBucket::CautionHigh => "CAUTION_HIGH",
            SeverityBucket::WarningHigh => "WARNING_HIGH",
            SeverityBucket::CriticalHigh => "CRITICAL_HIGH",
        };
        write!(f, "{}", name)
    }
}

/// Capabilities an operating mode leaves enabled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Observe,
    Compute,
    Transact,
    Learn,
    Reconfigure,
}

/// Descriptive operating policy for a bucket. Carries no behavior.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperatingMode {
    pub tag: &'static str,
    pub max_concurrent_operations: u32,
    /// Fraction of resources components may use (0.0-1.0)
    pub resource_ceiling: f64,
    pub capabilities: &'static [Capability],
}

impl OperatingMode {
    pub fn allows(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

static LOCKDOWN: OperatingMode = OperatingMode {
    tag: "lockdown",
    max_concurrent_operations: 0,
    resource_ceiling: 0.05,
    capabilities: &[Capability::Observe],
};

static RESTRICTED: OperatingMode = OperatingMode {
    tag: "restricted",
    max_concurrent_operations: 2,
    resource_ceiling: 0.15,
    capabilities: &[Capability::Observe, Capability::Compute],
};

static GUARDED: OperatingMode = OperatingMode {
    tag: "guarded",
    max_concurrent_operations: 8,
    resource_ceiling: 0.25,
    capabilities: &[Capability::Observe, Capability::Compute, Capability::Transact],
};

static NOMINAL: OperatingMode = OperatingMode {
    tag: "nominal",
    max_concurrent_operations: 32,
    resource_ceiling: 0.75,
    capabilities: &[
        Capability::Observe,
        Capability::Compute,
        Capability::Transact,
        Capability::Learn,
        Capability::Reconfigure,
    ],
};

static ELEVATED: OperatingMode = OperatingMode {
    tag: "elevated",
    max_concurrent_operations: 16,
    resource_ceiling: 0.85,
    capabilities: &[
        Capability::Observe,
        Capability::Compute,
        Capability::Transact,
        Capability::Learn,
    ],
};

static THROTTLED: OperatingMode = OperatingMode {
    tag: "throttled",
    max_concurrent_operations: 4,
    resource_ceiling: 0.95,
    capabilities: &[Capability::Observe, Capability::Compute],
};

static QUARANTINE: OperatingMode = OperatingMode {
    tag: "quarantine",
    max_concurrent_operations: 0,
    resource_ceiling: 0.05,
    capabilities: &[Capability::Observe],
};
