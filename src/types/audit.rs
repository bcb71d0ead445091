//! Audit trail entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::types::{ReasonCode, SeverityBucket};

/// One recorded coordinator event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub reason: ReasonCode,
    /// Free text: component id, emergency reason, old → new bucket
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// System level after the event
    pub system_level: f64,
    /// Bucket after the event
    pub bucket: SeverityBucket,
}

impl AuditEntry {
    pub fn new(
        reason: ReasonCode,
        note: Option<String>,
        system_level: f64,
        bucket: SeverityBucket,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            reason,
            note,
            system_level,
            bucket,
        }
    }

    /// Single-line rendering
    pub fn to_line(&self) -> String {
        let note = self.note.as_deref().map(|n| format!(" ({})", n)).unwrap_or_default();
        format!(
            "{} {}{} | level={:.3} | bucket={}",
            self.timestamp.format("%H:%M:%S%.3f"),
            self.reason.code(),
            note,
            self.system_level,
            self.bucket
        )
    }
}
