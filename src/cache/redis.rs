//! Distributed cache tier backed by Redis.
//!
//! Every operation runs on a multiplexed async connection under a hard
//! timeout. Entries carry no TTL: they live until a save, refresh, or
//! logout deletes them. Failures surface as [`TierError`] and the chain
//! falls back to the local tier.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use tokio::time::timeout;

use super::keys::CacheKey;
use super::tier::{CacheTier, TierError};

pub const DEFAULT_OP_TIMEOUT: Duration = Duration::from_millis(500);

pub struct RedisTier {
    client: redis::Client,
    op_timeout: Duration,
}

impl RedisTier {
    pub fn connect(url: &str, op_timeout: Duration) -> Result<Self, TierError> {
        let client =
            redis::Client::open(url).map_err(|err| TierError::Unavailable(err.to_string()))?;
        Ok(Self { client, op_timeout })
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, TierError> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|err| TierError::Unavailable(err.to_string()))
    }
}

#[async_trait]
impl CacheTier for RedisTier {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &CacheKey) -> Result<Option<String>, TierError> {
        let op = async {
            let mut conn = self.connection().await?;
            conn.get::<_, Option<String>>(key.render())
                .await
                .map_err(|err| TierError::Unavailable(err.to_string()))
        };
        timeout(self.op_timeout, op)
            .await
            .map_err(|_| TierError::Timeout)?
    }

    async fn set(&self, key: &CacheKey, value: &str) -> Result<(), TierError> {
        let op = async {
            let mut conn = self.connection().await?;
            conn.set::<_, _, ()>(key.render(), value)
                .await
                .map_err(|err| TierError::Unavailable(err.to_string()))
        };
        timeout(self.op_timeout, op)
            .await
            .map_err(|_| TierError::Timeout)?
    }

    async fn delete(&self, key: &CacheKey) -> Result<(), TierError> {
        let op = async {
            let mut conn = self.connection().await?;
            conn.del::<_, i64>(key.render())
                .await
                .map(|_| ())
                .map_err(|err| TierError::Unavailable(err.to_string()))
        };
        timeout(self.op_timeout, op)
            .await
            .map_err(|_| TierError::Timeout)?
    }
}
