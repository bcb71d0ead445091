//! Component levels and classification results

use serde::{Deserialize, Serialize};
use crate::types::SeverityBucket;

/// One component's safety level (always within [0, 1])
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSafetyLevel {
    pub component_id: String,
    pub level: f64,
}

impl ComponentSafetyLevel {
    pub fn new(component_id: impl Into<String>, level: f64) -> Self {
        Self {
            component_id: component_id.into(),
            level,
        }
    }
}

/// Aggregated system level and the bucket it falls in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub system_level: f64,
    pub bucket: SeverityBucket,
}

impl Classification {
    /// Emergency is active exactly when the bucket is critical
    pub fn emergency_active(&self) -> bool {
        self.bucket.is_critical()
    }
}
