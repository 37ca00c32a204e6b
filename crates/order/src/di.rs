use crate::{
    abstract_trait::{DynOrderRepository, DynOrderService, DynOrderStore},
    cache::{CacheWritePolicy, OrderCache},
    repository::OrderRepository,
    service::OrderService,
};
use prometheus_client::registry::Registry;
use shared::abstract_trait::DynDistributedCache;
use std::{fmt, sync::Arc, time::Duration};

#[derive(Clone)]
pub struct DependenciesInject {
    pub order_service: DynOrderService,
    pub order_repository: DynOrderRepository,
    pub order_cache: Arc<OrderCache>,
}

impl fmt::Debug for DependenciesInject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependenciesInject")
            .field("order_service", &"OrderService")
            .field("order_repository", &"OrderRepository")
            .field("order_cache", &self.order_cache)
            .finish()
    }
}

#[derive(Clone)]
pub struct DependenciesInjectDeps {
    pub store: DynOrderStore,
    pub remote_cache: DynDistributedCache,
    pub cache_ttl: Duration,
    pub write_policy: CacheWritePolicy,
}

impl DependenciesInject {
    pub fn new(deps: DependenciesInjectDeps, registry: &mut Registry) -> Self {
        let DependenciesInjectDeps {
            store,
            remote_cache,
            cache_ttl,
            write_policy,
        } = deps;

        let order_cache = Arc::new(OrderCache::new(remote_cache, cache_ttl));

        let order_repository: DynOrderRepository = Arc::new(OrderRepository::new(
            store,
            order_cache.clone(),
            write_policy,
        ));

        let order_service: DynOrderService =
            Arc::new(OrderService::new(order_repository.clone(), registry));

        Self {
            order_service,
            order_repository,
            order_cache,
        }
    }
}
