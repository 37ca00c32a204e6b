use crate::{cache::CacheCommand, errors::CacheError, utils::OpContext};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub type DynDistributedCache = Arc<dyn DistributedCacheTrait + Send + Sync>;

/// Shared key/value tier sitting behind the process-local cache.
///
/// A missing key is `Ok(None)`; connectivity problems are always `Err`, so
/// callers can tell "not cached" apart from "cache unavailable".
#[async_trait]
pub trait DistributedCacheTrait: Send + Sync {
    async fn get(&self, ctx: &OpContext, key: &str) -> Result<Option<String>, CacheError>;

    /// Runs every command in one atomic batch. Either all of them are applied
    /// or the call fails.
    async fn exec_atomic(&self, ctx: &OpContext, commands: Vec<CacheCommand>)
    -> Result<(), CacheError>;

    async fn set_ex(
        &self,
        ctx: &OpContext,
        key: &str,
        value: String,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        self.exec_atomic(ctx, vec![CacheCommand::set_ex(key, value, ttl)])
            .await
    }

    async fn del(&self, ctx: &OpContext, key: &str) -> Result<(), CacheError> {
        self.exec_atomic(ctx, vec![CacheCommand::del(key)]).await
    }

    async fn sadd(&self, ctx: &OpContext, key: &str, member: &str) -> Result<(), CacheError> {
        self.exec_atomic(ctx, vec![CacheCommand::sadd(key, member)])
            .await
    }

    async fn srem(&self, ctx: &OpContext, key: &str, member: &str) -> Result<(), CacheError> {
        self.exec_atomic(ctx, vec![CacheCommand::srem(key, member)])
            .await
    }
}
