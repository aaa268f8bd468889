use thiserror::Error;

use super::options::Tier;
use crate::backend::BackendError;
use crate::constants::KEY_NOT_FOUND_MESSAGE;

/// Operations that require at least one selected tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierOperation {
    Get,
    Set,
}

impl TierOperation {
    pub fn requirement(&self) -> &'static str {
        match self {
            TierOperation::Get => "local or remote must be specified when getting from cache",
            TierOperation::Set => "local or remote must be specified when setting to cache",
        }
    }
}

#[derive(Debug, Error)]
/// Errors returned by [`super::TieredCache`].
pub enum CacheError {
    /// The key is absent from every tier that was consulted.
    ///
    /// Expected during normal operation; callers branch on it.
    #[error("{}", key_not_found_message(.message))]
    KeyNotFound {
        /// Optional custom message.
        message: Option<String>,
    },

    /// `get`/`set` resolved to neither tier.
    #[error("{}", .operation.requirement())]
    TierSelection { operation: TierOperation },

    /// A backend failed; relayed as reported.
    #[error("{tier} cache failed: {source}")]
    Backend {
        tier: Tier,
        #[source]
        source: BackendError,
    },
}

fn key_not_found_message(message: &Option<String>) -> &str {
    message.as_deref().unwrap_or(KEY_NOT_FOUND_MESSAGE)
}

impl CacheError {
    pub fn key_not_found() -> Self {
        Self::KeyNotFound { message: None }
    }

    pub fn key_not_found_with(message: impl Into<String>) -> Self {
        Self::KeyNotFound {
            message: Some(message.into()),
        }
    }

    pub(crate) fn backend(tier: Tier, source: BackendError) -> Self {
        Self::Backend { tier, source }
    }

    #[inline]
    pub fn is_key_not_found(&self) -> bool {
        matches!(self, Self::KeyNotFound { .. })
    }

    #[inline]
    pub fn is_tier_selection(&self) -> bool {
        matches!(self, Self::TierSelection { .. })
    }

    /// Tier whose backend failed, for [`CacheError::Backend`].
    pub fn tier(&self) -> Option<Tier> {
        match self {
            Self::Backend { tier, .. } => Some(*tier),
            _ => None,
        }
    }
}

/// Convenience result type for coordinator operations.
pub type CacheResult<T> = Result<T, CacheError>;
