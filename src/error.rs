//! Error types for zone resolution and cache configuration

use thiserror::Error;

/// Why a name could not be turned into a [`Location`](crate::Location)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// The name is well-formed but not present in the zone database
    UnknownZone,
    /// The name can never be a zone identifier (path traversal, absolute path)
    InvalidName,
}

/// Error returned by [`TzdbResolver`](crate::TzdbResolver) and forwarded as-is by the cache
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("{}", describe(.name, .reason))]
    ResolutionFailed { name: String, reason: FailureReason },
}

impl ResolveError {
    pub fn unknown_zone(name: impl Into<String>) -> Self {
        Self::ResolutionFailed {
            name: name.into(),
            reason: FailureReason::UnknownZone,
        }
    }

    pub fn invalid_name(name: impl Into<String>) -> Self {
        Self::ResolutionFailed {
            name: name.into(),
            reason: FailureReason::InvalidName,
        }
    }

    /// The identifier that failed to resolve
    pub fn name(&self) -> &str {
        match self {
            Self::ResolutionFailed { name, .. } => name,
        }
    }

    pub fn reason(&self) -> FailureReason {
        match self {
            Self::ResolutionFailed { reason, .. } => *reason,
        }
    }
}

fn describe(name: &str, reason: &FailureReason) -> String {
    match reason {
        FailureReason::UnknownZone => format!("unknown time zone {name}"),
        FailureReason::InvalidName => format!("invalid time zone name {name:?}"),
    }
}

/// Errors raised while configuring a cache
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid cache configuration: {0}")]
    Invalid(#[from] serde_json::Error),

    #[error("Default location cache already initialized")]
    AlreadyInitialized,
}
