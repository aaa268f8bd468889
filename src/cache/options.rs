//! Tier selection and per-call / per-instance options.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::backend::BackendOptions;

/// One of the two cache tiers a coordinator addresses.
///
/// Ordered local-before-remote; fan-out results follow this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Local,
    Remote,
}

impl Tier {
    pub const ALL: [Tier; 2] = [Tier::Local, Tier::Remote];

    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Local => "local",
            Tier::Remote => "remote",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully resolved tiers for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TierSelection {
    pub use_local: bool,
    pub use_remote: bool,
}

impl TierSelection {
    pub const BOTH: Self = Self::new(true, true);
    pub const LOCAL_ONLY: Self = Self::new(true, false);
    pub const REMOTE_ONLY: Self = Self::new(false, true);
    pub const NONE: Self = Self::new(false, false);

    pub const fn new(use_local: bool, use_remote: bool) -> Self {
        Self {
            use_local,
            use_remote,
        }
    }

    #[inline]
    pub fn includes(&self, tier: Tier) -> bool {
        match tier {
            Tier::Local => self.use_local,
            Tier::Remote => self.use_remote,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        !self.use_local && !self.use_remote
    }

    /// Selected tiers, local first.
    pub fn tiers(self) -> impl Iterator<Item = Tier> {
        Tier::ALL.into_iter().filter(move |tier| self.includes(*tier))
    }
}

impl Default for TierSelection {
    fn default() -> Self {
        Self::BOTH
    }
}

/// Options for a single coordinator call.
///
/// Unset tier flags fall back to the coordinator's defaults. Deserializes from
/// `{"useLocalCache": .., "useRemoteCache": .., "setLocal": ..}`; unknown
/// fields are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CallOptions {
    pub use_local_cache: Option<bool>,
    pub use_remote_cache: Option<bool>,
    /// `get` only: copy a remote hit into the local tier.
    pub set_local: bool,
}

impl CallOptions {
    pub const fn tiers(use_local: bool, use_remote: bool) -> Self {
        Self {
            use_local_cache: Some(use_local),
            use_remote_cache: Some(use_remote),
            set_local: false,
        }
    }

    pub const fn local_only() -> Self {
        Self::tiers(true, false)
    }

    pub const fn remote_only() -> Self {
        Self::tiers(false, true)
    }

    pub const fn both() -> Self {
        Self::tiers(true, true)
    }

    pub const fn neither() -> Self {
        Self::tiers(false, false)
    }

    /// Default tiers with promotion of remote hits into local.
    pub const fn promote() -> Self {
        Self {
            use_local_cache: None,
            use_remote_cache: None,
            set_local: true,
        }
    }

    pub const fn with_set_local(mut self, set_local: bool) -> Self {
        self.set_local = set_local;
        self
    }
}

/// Instance-level options fixed at construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheOptions {
    /// Default for `use_local_cache` when a call does not set it. Unset → `true`.
    pub use_local_cache: Option<bool>,
    /// Default for `use_remote_cache` when a call does not set it. Unset → `true`.
    pub use_remote_cache: Option<bool>,
    /// TTL applied by `set` when the call passes none.
    pub ttl: Option<Duration>,
    /// Factory options for a local tier given by type name.
    pub local_options: BackendOptions,
    /// Factory options for a remote tier given by type name.
    pub remote_options: BackendOptions,
    /// Turns every operation into a no-op (reads miss).
    pub disabled: bool,
}

impl CacheOptions {
    pub fn with_tiers(mut self, use_local: bool, use_remote: bool) -> Self {
        self.use_local_cache = Some(use_local);
        self.use_remote_cache = Some(use_remote);
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub(crate) fn default_selection(&self) -> TierSelection {
        TierSelection::new(
            self.use_local_cache.unwrap_or(true),
            self.use_remote_cache.unwrap_or(true),
        )
    }
}
