//! In-process fallback tier.
//!
//! Stands in when the distributed tier is unreachable. Entries embed their
//! write time and are dropped on read once they pass the staleness window;
//! a restart empties the tier, which is acceptable for a fallback.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use super::keys::CacheKey;
use super::tier::{CacheTier, TierError};

pub const DEFAULT_STALENESS: Duration = Duration::from_secs(5 * 60);

struct LocalEntry {
    value: String,
    stored_at: Instant,
}

pub struct LocalTier {
    entries: DashMap<String, LocalEntry>,
    staleness: Duration,
}

impl LocalTier {
    pub fn new(staleness: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            staleness,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for LocalTier {
    fn default() -> Self {
        Self::new(DEFAULT_STALENESS)
    }
}

#[async_trait]
impl CacheTier for LocalTier {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn get(&self, key: &CacheKey) -> Result<Option<String>, TierError> {
        let rendered = key.render();
        let expired = match self.entries.get(&rendered) {
            Some(entry) if entry.stored_at.elapsed() < self.staleness => {
                return Ok(Some(entry.value.clone()));
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove(&rendered);
        }
        Ok(None)
    }

    async fn set(&self, key: &CacheKey, value: &str) -> Result<(), TierError> {
        self.entries.insert(
            key.render(),
            LocalEntry {
                value: value.to_string(),
                stored_at: Instant::now(),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &CacheKey) -> Result<(), TierError> {
        self.entries.remove(&key.render());
        Ok(())
    }
}
