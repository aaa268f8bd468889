//! Configuration error types.

use thiserror::Error;

use crate::backend::BackendError;
use crate::cache::Tier;

/// Errors that can occur while loading configuration or building a coordinator.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A boolean variable held something other than true/false/1/0/yes/no/on/off.
    #[error("invalid boolean '{value}' for {var}")]
    InvalidBool { var: &'static str, value: String },

    /// A numeric variable could not be parsed.
    #[error("failed to parse {var} '{value}': {source}")]
    InvalidNumber {
        var: &'static str,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// A numeric setting must be greater than zero.
    #[error("{var} must be greater than zero")]
    ZeroValue { var: &'static str },

    /// The backend type name is not known to the factory.
    #[error("unsupported {tier} cache backend type '{name}'")]
    UnknownBackend { tier: Tier, name: String },

    /// The factory recognized the type but the adapter could not be built.
    #[error("failed to initialize {tier} cache backend: {source}")]
    BackendInit {
        tier: Tier,
        #[source]
        source: BackendError,
    },
}
