use crate::{
    abstract_trait::DistributedCacheTrait, cache::CacheCommand, errors::CacheError,
    utils::OpContext,
};
use async_trait::async_trait;
use deadpool_redis::{Connection, Pool};
use std::sync::Arc;
use tracing::{debug, error};

/// Redis-backed distributed tier. Batches go out as a `MULTI`/`EXEC` pipeline.
#[derive(Clone)]
pub struct RedisCacheStore {
    redis_pool: Arc<Pool>,
}

impl RedisCacheStore {
    pub fn new(redis_pool: Pool) -> Self {
        Self {
            redis_pool: Arc::new(redis_pool),
        }
    }

    async fn get_conn(&self) -> Result<Connection, CacheError> {
        self.redis_pool.get().await.map_err(|e| {
            error!("Failed to get Redis pooled connection: {:?}", e);
            CacheError::from(e)
        })
    }

    fn build_pipeline(commands: &[CacheCommand]) -> redis::Pipeline {
        let mut pipe = redis::pipe();
        pipe.atomic();

        for command in commands {
            match command {
                CacheCommand::SetEx { key, value, ttl } => {
                    pipe.cmd("SET")
                        .arg(key)
                        .arg(value)
                        .arg("EX")
                        .arg(ttl.as_secs().max(1))
                        .ignore();
                }
                CacheCommand::Del { key } => {
                    pipe.cmd("DEL").arg(key).ignore();
                }
                CacheCommand::SAdd { key, member } => {
                    pipe.cmd("SADD").arg(key).arg(member).ignore();
                }
                CacheCommand::SRem { key, member } => {
                    pipe.cmd("SREM").arg(key).arg(member).ignore();
                }
            }
        }

        pipe
    }
}

#[async_trait]
impl DistributedCacheTrait for RedisCacheStore {
    async fn get(&self, ctx: &OpContext, key: &str) -> Result<Option<String>, CacheError> {
        ctx.run(async {
            let mut conn = self.get_conn().await?;
            let value: Option<String> = redis::cmd("GET")
                .arg(key)
                .query_async(&mut conn)
                .await
                .map_err(|e| {
                    error!("Redis get error for key '{}': {:?}", key, e);
                    CacheError::from(e)
                })?;

            if value.is_none() {
                debug!("Cache miss for key: {key}");
            }

            Ok::<_, CacheError>(value)
        })
        .await?
    }

    async fn exec_atomic(
        &self,
        ctx: &OpContext,
        commands: Vec<CacheCommand>,
    ) -> Result<(), CacheError> {
        if commands.is_empty() {
            return Ok(());
        }

        let pipe = Self::build_pipeline(&commands);

        ctx.run(async {
            let mut conn = self.get_conn().await?;
            pipe.query_async::<()>(&mut conn).await.map_err(|e| {
                error!("Failed to execute cache batch of {} commands: {:?}", commands.len(), e);
                CacheError::from(e)
            })?;

            debug!(
                "Applied cache batch on keys {:?}",
                commands.iter().map(CacheCommand::key).collect::<Vec<_>>()
            );
            Ok::<_, CacheError>(())
        })
        .await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn pipeline_is_atomic_and_carries_ttl() {
        let pipe = RedisCacheStore::build_pipeline(&[
            CacheCommand::set_ex("order:1", "{}", Duration::from_secs(1800)),
            CacheCommand::sadd("user:u1:orders", "1"),
        ]);

        let packed = String::from_utf8_lossy(&pipe.get_packed_pipeline()).to_string();
        assert!(packed.contains("MULTI"));
        assert!(packed.contains("EXEC"));
        assert!(packed.contains("1800"));
        assert!(packed.contains("SADD"));
    }
}
