//! Core modules for Harmony

pub mod thresholds;
pub mod registry;
pub mod aggregator;
pub mod audit;
pub mod config;
pub mod coordinator;
pub mod command;
pub mod api;

pub use thresholds::{ThresholdTable, BucketSpec};
pub use registry::{ComponentRegistry, clamp_level};
pub use aggregator::aggregate;
pub use audit::AuditLog;
pub use config::{CoordinatorConfig, ComponentConfig, ConfigError};
pub use coordinator::SafetyCoordinator;
pub use command::{Command, CommandParser, CommandError};
pub use api::{create_router, run_server};
