use crate::utils::Interrupted;
use deadpool_redis::PoolError;
use redis::RedisError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("cache pool error: {0}")]
    Pool(#[from] PoolError),

    #[error("redis error: {0}")]
    Redis(#[from] RedisError),

    #[error("cache operation interrupted: {0}")]
    Interrupted(#[from] Interrupted),

    #[error("cache backend error: {0}")]
    Backend(String),
}

impl CacheError {
    /// True when the shared tier could not be reached, as opposed to a bad
    /// payload.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Pool(_) | Self::Redis(_) | Self::Backend(_))
    }
}
