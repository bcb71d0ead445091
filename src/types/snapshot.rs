//! Read-only view of the coordinator state
//!
//! This is what surrounding modules poll. Taking one has no side effects.

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use crate::types::{AggregationStrategy, ComponentSafetyLevel, SeverityBucket};

/// Point-in-time snapshot of the system state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSnapshot {
    pub timestamp: DateTime<Utc>,
    pub system_level: f64,
    pub bucket: SeverityBucket,
    pub emergency_active: bool,
    pub strategy: AggregationStrategy,
    /// Component levels in registration order
    pub components: Vec<ComponentSafetyLevel>,
}

impl SystemSnapshot {
    /// Compare everything except the timestamp
    pub fn same_state(&self, other: &SystemSnapshot) -> bool {
        self.system_level == other.system_level
            && self.bucket == other.bucket
            && self.emergency_active == other.emergency_active
            && self.strategy == other.strategy
            && self.components == other.components
    }

    /// Format for terminal display (with colors)
    pub fn to_terminal_string(&self) -> String {
        let headline = format!(
            "{} level={:.3} | bucket={} | strategy={} | mode={}",
            self.bucket.emoji(),
            self.system_level,
            self.bucket,
            self.strategy,
            self.bucket.operating_mode().tag,
        )
        .color(self.bucket.color());

        let mut out = headline.to_string();
        if self.emergency_active {
            out.push_str(&format!(" {}", "EMERGENCY".red().bold()));
        }
        for component in &self.components {
            out.push_str(&format!(
                "\n  {} {:<12} {:.3}",
                "└─".dimmed(),
                component.component_id,
                component.level
            ));
        }
        out
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        let components = self
            .components
            .iter()
            .map(|c| format!("{}={:.3}", c.component_id, c.level))
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "level={:.3} | bucket={} | emergency={} | strategy={} | components={}",
            self.system_level, self.bucket, self.emergency_active, self.strategy, components
        )
    }
}
