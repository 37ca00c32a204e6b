use crate::{
    abstract_trait::DynOrderStore,
    config::Config,
    di::{DependenciesInject, DependenciesInjectDeps},
    repository::store::PgOrderStore,
};
use anyhow::{Context, Result};
use prometheus_client::registry::Registry;
use shared::{
    abstract_trait::{DynDistributedCache, DynJwtService},
    cache::{MemoryCacheStore, RedisCacheStore},
    config::{ConnectionPool, JwtConfig, RedisClient},
    utils::OpContext,
};
use std::{fmt, sync::Arc, time::Duration};
use tokio::sync::Mutex;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub jwt_config: DynJwtService,
    pub di_container: DependenciesInject,
    pub registry: Arc<Mutex<Registry>>,
    /// Parent of every request context; cancelled once the server stops.
    pub root_ctx: OpContext,
    pub request_timeout: Duration,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("deps", &self.di_container)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl AppState {
    pub async fn new(pool: ConnectionPool, config: &Config) -> Result<Self> {
        let remote_cache: DynDistributedCache = match &config.redis {
            Some(redis_config) => {
                let redis =
                    RedisClient::new(redis_config).context("Failed to connect to Redis")?;
                redis
                    .ping()
                    .await
                    .context("Failed to ping Redis server")?;
                info!("✅ Redis cache ready at {}:{}", redis_config.host, redis_config.port);
                Arc::new(RedisCacheStore::new(redis.pool)) as DynDistributedCache
            }
            None => {
                warn!("⚠️ REDIS_HOST not set, using an in-process distributed cache");
                Arc::new(MemoryCacheStore::new()) as DynDistributedCache
            }
        };

        let store: DynOrderStore = Arc::new(PgOrderStore::new(pool));

        let deps = DependenciesInjectDeps {
            store,
            remote_cache,
            cache_ttl: config.cache_ttl,
            write_policy: config.cache_write_policy,
        };

        Ok(Self::with_deps(
            deps,
            &config.jwt_secret,
            config.request_timeout,
        ))
    }

    pub fn with_deps(
        deps: DependenciesInjectDeps,
        jwt_secret: &str,
        request_timeout: Duration,
    ) -> Self {
        let jwt_config = Arc::new(JwtConfig::new(jwt_secret)) as DynJwtService;
        let mut registry = Registry::default();

        let di_container = DependenciesInject::new(deps, &mut registry);

        Self {
            jwt_config,
            di_container,
            registry: Arc::new(Mutex::new(registry)),
            root_ctx: OpContext::background(),
            request_timeout,
        }
    }
}
