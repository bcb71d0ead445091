//! Core types for Harmony

mod bucket;
mod strategy;
mod level;
mod reason;
mod audit;
mod snapshot;
mod error;

pub use bucket::{SeverityBucket, OperatingMode, Capability};
pub use strategy::{AggregationStrategy, ParseStrategyError};
pub use level::{ComponentSafetyLevel, Classification};
pub use reason::ReasonCode;
pub use audit::AuditEntry;
pub use snapshot::SystemSnapshot;
pub use error::{SafetyError, SafetyResult};
