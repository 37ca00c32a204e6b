#![allow(dead_code)]

use order::{
    abstract_trait::{DynOrderRepository, DynOrderService},
    cache::{CacheWritePolicy, OrderCache},
    di::{DependenciesInject, DependenciesInjectDeps},
    domain::requests::order::{CreateOrderItemRequest, CreateOrderRequest},
    repository::store::MemoryOrderStore,
};
use prometheus_client::registry::Registry;
use rust_decimal::Decimal;
use shared::cache::MemoryCacheStore;
use std::sync::Arc;

pub struct Harness {
    pub store: MemoryOrderStore,
    pub remote: MemoryCacheStore,
    pub cache: Arc<OrderCache>,
    pub repository: DynOrderRepository,
    pub service: DynOrderService,
    pub registry: Registry,
}

pub fn harness(write_policy: CacheWritePolicy) -> Harness {
    let store = MemoryOrderStore::new();
    let remote = MemoryCacheStore::new();
    let mut registry = Registry::default();

    let deps = DependenciesInjectDeps {
        store: Arc::new(store.clone()),
        remote_cache: Arc::new(remote.clone()),
        cache_ttl: OrderCache::DEFAULT_TTL,
        write_policy,
    };
    let di = DependenciesInject::new(deps, &mut registry);

    Harness {
        store,
        remote,
        cache: di.order_cache,
        repository: di.order_repository,
        service: di.order_service,
        registry,
    }
}

pub fn item(product_id: &str, quantity: i32, price: Decimal) -> CreateOrderItemRequest {
    CreateOrderItemRequest {
        product_id: product_id.to_string(),
        quantity,
        price,
    }
}

/// Two of p1 at 10.00 plus one p2 at 5.00.
pub fn sample_request() -> CreateOrderRequest {
    CreateOrderRequest {
        items: vec![
            item("p1", 2, Decimal::new(1000, 2)),
            item("p2", 1, Decimal::new(500, 2)),
        ],
        status: None,
    }
}
