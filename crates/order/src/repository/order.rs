use crate::{
    abstract_trait::{DynOrderStore, OrderRepositoryTrait},
    cache::{CacheLookup, CacheWritePolicy, OrderCache},
    model::Order,
};
use async_trait::async_trait;
use shared::{
    errors::{CacheError, ServiceError},
    utils::OpContext,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Keeps the durable store and the two cache tiers in step: reads go
/// cache-aside, every successful store write is mirrored into the cache.
#[derive(Clone)]
pub struct OrderRepository {
    store: DynOrderStore,
    cache: Arc<OrderCache>,
    write_policy: CacheWritePolicy,
}

impl OrderRepository {
    pub fn new(store: DynOrderStore, cache: Arc<OrderCache>, write_policy: CacheWritePolicy) -> Self {
        Self {
            store,
            cache,
            write_policy,
        }
    }

    async fn write_through(
        &self,
        ctx: &OpContext,
        order: &Order,
        context: &'static str,
    ) -> Result<(), ServiceError> {
        let Err(e) = self.cache.set_order(ctx, order).await else {
            return Ok(());
        };

        self.cache.evict_local(order.id);

        match self.write_policy {
            CacheWritePolicy::Strict => {
                error!("❌ Cache write-through failed for order {}: {e}", order.id);
                Err(ServiceError::cache(context)(e))
            }
            CacheWritePolicy::BestEffort => {
                warn!(
                    "⚠️ Cache write-through failed for order {}, continuing: {e}",
                    order.id
                );
                Ok(())
            }
        }
    }
}

#[async_trait]
impl OrderRepositoryTrait for OrderRepository {
    async fn list_by_user(
        &self,
        ctx: &OpContext,
        user_id: &str,
    ) -> Result<Vec<Order>, ServiceError> {
        self.store
            .list_by_user(ctx, user_id)
            .await
            .map_err(ServiceError::store("failed to list orders"))
    }

    async fn create(&self, ctx: &OpContext, mut order: Order) -> Result<Order, ServiceError> {
        order.id = Uuid::new_v4();
        for item in &mut order.items {
            item.id = Uuid::new_v4();
            item.order_id = order.id;
        }

        let created = self
            .store
            .insert(ctx, &order)
            .await
            .map_err(ServiceError::store("failed to create order"))?;

        self.write_through(ctx, &created, "failed to cache created order")
            .await?;

        info!("✅ Order {} created and cached", created.id);
        Ok(created)
    }

    async fn get_by_id(&self, ctx: &OpContext, id: Uuid) -> Result<Order, ServiceError> {
        match self.cache.get_order(ctx, id).await {
            CacheLookup::Hit(order) => return Ok(order),
            CacheLookup::Miss => {}
            CacheLookup::Unavailable(CacheError::Interrupted(reason)) => {
                return Err(ServiceError::cache("failed to read order cache")(
                    CacheError::Interrupted(reason),
                ));
            }
            CacheLookup::Unavailable(e) => {
                warn!("⚠️ Cache unavailable for order {id}, reading from store: {e}");
            }
        }

        let order = self
            .store
            .find_by_id(ctx, id)
            .await
            .map_err(ServiceError::store("failed to get order"))?
            .ok_or(ServiceError::OrderNotFound)?;

        // Repopulating after a read never fails the read.
        if let Err(e) = self.cache.set_order(ctx, &order).await {
            self.cache.evict_local(order.id);
            warn!("⚠️ Could not repopulate cache for order {id}: {e}");
        }

        Ok(order)
    }

    async fn update(&self, ctx: &OpContext, order: &Order) -> Result<Order, ServiceError> {
        let updated = self
            .store
            .update(ctx, order)
            .await
            .map_err(ServiceError::store("failed to update order"))?;

        self.write_through(ctx, &updated, "failed to cache updated order")
            .await?;

        Ok(updated)
    }

    async fn delete(&self, ctx: &OpContext, id: Uuid) -> Result<(), ServiceError> {
        let order = self
            .store
            .find_by_id(ctx, id)
            .await
            .map_err(ServiceError::store("failed to load order for delete"))?
            .ok_or(ServiceError::OrderNotFound)?;

        self.store
            .soft_delete(ctx, id)
            .await
            .map_err(ServiceError::store("failed to delete order"))?;

        if let Err(e) = self.cache.delete_order(ctx, id, &order.user_id).await {
            self.cache.tombstone(id);
            match self.write_policy {
                CacheWritePolicy::Strict => {
                    error!("❌ Cache eviction failed for order {id}: {e}");
                    return Err(ServiceError::cache("failed to evict deleted order")(e));
                }
                CacheWritePolicy::BestEffort => {
                    warn!("⚠️ Cache eviction failed for order {id}, continuing: {e}");
                }
            }
        }

        info!("🗑️ Order {id} deleted");
        Ok(())
    }
}
