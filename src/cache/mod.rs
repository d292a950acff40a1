//! Vetrina cache system.
//!
//! Resolved templates are cached at three levels:
//!
//! - **Session map**: per-session resolved bundles, synchronous reads.
//! - **Distributed tier**: Redis, shared across instances.
//! - **Local tier**: in-process fallback used when the distributed tier is
//!   unreachable, with a staleness window on read.
//!
//! The distributed and local tiers sit behind the same [`CacheTier`]
//! interface and are consulted through an ordered [`TierChain`]. The store
//! stays authoritative: every tier write is best-effort cache-aside and
//! entries live until explicitly invalidated.

mod chain;
mod keys;
mod local;
pub(crate) mod lock;
mod redis;
mod session_map;
mod tier;

pub use chain::TierChain;
pub use keys::CacheKey;
pub use local::{DEFAULT_STALENESS, LocalTier};
pub use redis::{DEFAULT_OP_TIMEOUT, RedisTier};
pub use session_map::{DEFAULT_SESSION_CAPACITY, SessionMap};
pub use tier::{CacheTier, TierError};
