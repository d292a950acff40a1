//! The cache-tier interface.

use async_trait::async_trait;
use thiserror::Error;

use super::keys::CacheKey;

/// A tier failure. Tiers fail soft: the chain logs, counts, and moves on,
/// so these never surface through an API response.
#[derive(Debug, Error)]
pub enum TierError {
    #[error("cache tier unavailable: {0}")]
    Unavailable(String),
    #[error("cache tier operation timed out")]
    Timeout,
}

/// One cache tier. Values are serialized JSON documents; tiers store and
/// return them opaquely.
#[async_trait]
pub trait CacheTier: Send + Sync {
    fn name(&self) -> &'static str;

    async fn get(&self, key: &CacheKey) -> Result<Option<String>, TierError>;

    async fn set(&self, key: &CacheKey, value: &str) -> Result<(), TierError>;

    async fn delete(&self, key: &CacheKey) -> Result<(), TierError>;
}
