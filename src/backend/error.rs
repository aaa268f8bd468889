use thiserror::Error;

#[derive(Debug, Error)]
/// Failures reported by a cache backend.
///
/// A missing key is not an error at this layer; backends report it as
/// `Ok(None)` from [`super::CacheBackend::get`].
pub enum BackendError {
    /// Could not obtain a connection to the store.
    #[error("connection failed: {reason}")]
    Connection {
        /// Error message.
        reason: String,
    },

    /// The store rejected or failed a command.
    #[error("command {command} failed: {reason}")]
    Command {
        /// Command name (`GET`, `SET`, ...).
        command: &'static str,
        /// Error message.
        reason: String,
    },

    /// A value could not be encoded or decoded.
    #[error("value serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backend is not able to serve requests.
    #[error("backend unavailable: {reason}")]
    Unavailable {
        /// Error message.
        reason: String,
    },
}

impl BackendError {
    pub(crate) fn command(command: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Command {
            command,
            reason: err.to_string(),
        }
    }
}

/// Convenience result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;
