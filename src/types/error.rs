//! Error kinds surfaced by the core

use thiserror::Error;

/// Errors from registry, aggregator, threshold table and coordinator.
///
/// All are fatal to the call that raised them and never leave the
/// coordinator partially mutated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SafetyError {
    #[error("invalid safety level {0}: must be a finite value in [0, 1]")]
    InvalidLevel(f64),

    #[error("unknown component '{0}'")]
    UnknownComponent(String),

    #[error("component '{0}' is already registered")]
    DuplicateComponent(String),

    #[error("no components registered")]
    NoComponentsRegistered,
}

impl SafetyError {
    /// Stable machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            SafetyError::InvalidLevel(_) => "InvalidLevel",
            SafetyError::UnknownComponent(_) => "UnknownComponent",
            SafetyError::DuplicateComponent(_) => "DuplicateComponent",
            SafetyError::NoComponentsRegistered => "NoComponentsRegistered",
        }
    }
}

pub type SafetyResult<T> = Result<T, SafetyError>;
