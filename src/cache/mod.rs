//! Tier coordination: option resolution, read-through, write-through, fan-out.

pub mod error;
pub mod options;
pub mod tiered;


pub use error::{CacheError, CacheResult, TierOperation};
pub use options::{CacheOptions, CallOptions, Tier, TierSelection};
pub use tiered::{BackendSpec, TieredCache};
