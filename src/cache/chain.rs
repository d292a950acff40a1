//! Ordered cache-tier chain.
//!
//! Read policy: tiers are consulted in order, and a clean miss on a healthy
//! tier ends the read. Later tiers are fallbacks for tier *failure*, not
//! for misses: a miss on the distributed tier means the entry was
//! invalidated everywhere, so asking the local tier could only resurface
//! stale data.
//!
//! Write policy: the first tier that accepts the value wins. Deletes are
//! attempted on every tier since an entry may live in any of them.

use std::sync::Arc;

use metrics::counter;
use tracing::warn;

use super::keys::CacheKey;
use super::tier::CacheTier;

#[derive(Clone)]
pub struct TierChain {
    tiers: Arc<[Arc<dyn CacheTier>]>,
}

impl TierChain {
    pub fn new(tiers: Vec<Arc<dyn CacheTier>>) -> Self {
        Self {
            tiers: tiers.into(),
        }
    }

    pub async fn get(&self, key: &CacheKey) -> Option<String> {
        for tier in self.tiers.iter() {
            match tier.get(key).await {
                Ok(Some(value)) => {
                    counter!("vetrina_cache_hit_total", "tier" => tier.name()).increment(1);
                    return Some(value);
                }
                Ok(None) => {
                    counter!("vetrina_cache_miss_total", "tier" => tier.name()).increment(1);
                    return None;
                }
                Err(error) => {
                    counter!("vetrina_cache_error_total", "tier" => tier.name()).increment(1);
                    warn!(
                        tier = tier.name(),
                        key = %key.render(),
                        error = %error,
                        "cache tier read failed, trying next tier"
                    );
                }
            }
        }
        None
    }

    pub async fn set(&self, key: &CacheKey, value: &str) {
        for tier in self.tiers.iter() {
            match tier.set(key, value).await {
                Ok(()) => return,
                Err(error) => {
                    counter!("vetrina_cache_error_total", "tier" => tier.name()).increment(1);
                    warn!(
                        tier = tier.name(),
                        key = %key.render(),
                        error = %error,
                        "cache tier write failed, trying next tier"
                    );
                }
            }
        }
    }

    pub async fn delete(&self, key: &CacheKey) {
        for tier in self.tiers.iter() {
            if let Err(error) = tier.delete(key).await {
                warn!(
                    tier = tier.name(),
                    key = %key.render(),
                    error = %error,
                    "cache tier delete failed"
                );
            }
        }
    }
}
