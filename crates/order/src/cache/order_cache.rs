use crate::model::Order;
use dashmap::DashMap;
use shared::{
    abstract_trait::DynDistributedCache, cache::CacheCommand, errors::CacheError,
    utils::OpContext,
};
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;

/// Outcome of a cache lookup. `Unavailable` means the cache could not answer,
/// which says nothing about whether the order exists.
#[derive(Debug)]
pub enum CacheLookup {
    Hit(Order),
    Miss,
    Unavailable(CacheError),
}

struct LocalEntry {
    order: Order,
    inserted_at: Instant,
}

/// Process-local map in front of the shared distributed tier.
///
/// Local entries are only written after the remote batch is confirmed, and
/// they expire after the same TTL as remote ones. Tombstones mark orders this
/// process deleted while the remote tier could not be cleared, and last as
/// long as the stale remote entry can.
pub struct OrderCache {
    local: DashMap<Uuid, LocalEntry>,
    tombstones: DashMap<Uuid, Instant>,
    remote: DynDistributedCache,
    ttl: Duration,
}

impl fmt::Debug for OrderCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderCache")
            .field("local_entries", &self.local.len())
            .field("tombstones", &self.tombstones.len())
            .field("ttl", &self.ttl)
            .finish()
    }
}

fn order_key(id: Uuid) -> String {
    format!("order:{id}")
}

fn user_orders_key(user_id: &str) -> String {
    format!("user:{user_id}:orders")
}

impl OrderCache {
    pub const DEFAULT_TTL: Duration = Duration::from_secs(1800);

    pub fn new(remote: DynDistributedCache, ttl: Duration) -> Self {
        Self {
            local: DashMap::new(),
            tombstones: DashMap::new(),
            remote,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get_order(&self, ctx: &OpContext, id: Uuid) -> CacheLookup {
        if self.is_tombstoned(id) {
            debug!("🪦 Order {id} was deleted here, skipping cache");
            return CacheLookup::Miss;
        }

        if let Some(order) = self.local_get(id) {
            debug!("🔥 Local cache hit for order {id}");
            return CacheLookup::Hit(order);
        }

        let key = order_key(id);
        let raw = match self.remote.get(ctx, &key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return CacheLookup::Miss,
            Err(e) => {
                warn!("⚠️ Distributed cache read failed for {key}: {e}");
                return CacheLookup::Unavailable(e);
            }
        };

        let order: Order = match serde_json::from_str(&raw) {
            Ok(order) => order,
            Err(e) => {
                warn!("⚠️ Undecodable cache entry at {key}: {e}");
                return CacheLookup::Unavailable(CacheError::from(e));
            }
        };

        if order.is_deleted {
            return CacheLookup::Miss;
        }

        self.local_put(order.clone());
        CacheLookup::Hit(order)
    }

    pub async fn set_order(&self, ctx: &OpContext, order: &Order) -> Result<(), CacheError> {
        let payload = serde_json::to_string(order)?;

        self.remote
            .exec_atomic(
                ctx,
                vec![
                    CacheCommand::set_ex(order_key(order.id), payload, self.ttl),
                    CacheCommand::sadd(user_orders_key(&order.user_id), order.id.to_string()),
                ],
            )
            .await?;

        self.local_put(order.clone());
        debug!("💾 Cached order {}", order.id);
        Ok(())
    }

    pub async fn delete_order(
        &self,
        ctx: &OpContext,
        id: Uuid,
        user_id: &str,
    ) -> Result<(), CacheError> {
        self.remote
            .exec_atomic(
                ctx,
                vec![
                    CacheCommand::del(order_key(id)),
                    CacheCommand::srem(user_orders_key(user_id), id.to_string()),
                ],
            )
            .await?;

        self.local.remove(&id);
        debug!("🧹 Evicted order {id} from cache");
        Ok(())
    }

    /// Drops the local copy only. The remote entry ages out on its TTL.
    pub fn evict_local(&self, id: Uuid) {
        self.local.remove(&id);
    }

    /// Evicts the local copy and hides any remote copy from this process
    /// until the TTL has passed.
    pub fn tombstone(&self, id: Uuid) {
        let now = Instant::now();
        self.tombstones
            .retain(|_, marked_at| now.duration_since(*marked_at) < self.ttl);
        self.tombstones.insert(id, now);
        self.local.remove(&id);
    }

    fn is_tombstoned(&self, id: Uuid) -> bool {
        let expired = match self.tombstones.get(&id) {
            Some(marked_at) => marked_at.elapsed() >= self.ttl,
            None => return false,
        };

        if expired {
            self.tombstones.remove(&id);
        }
        !expired
    }

    pub fn contains_local(&self, id: Uuid) -> bool {
        self.local_get(id).is_some()
    }

    fn local_get(&self, id: Uuid) -> Option<Order> {
        {
            let entry = self.local.get(&id)?;
            if entry.inserted_at.elapsed() < self.ttl && !entry.order.is_deleted {
                return Some(entry.order.clone());
            }
        }

        self.local.remove(&id);
        None
    }

    fn local_put(&self, order: Order) {
        self.local.insert(
            order.id,
            LocalEntry {
                order,
                inserted_at: Instant::now(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OrderItem;
    use rust_decimal::Decimal;
    use shared::{abstract_trait::DistributedCacheTrait, cache::MemoryCacheStore};
    use std::sync::Arc;

    fn stored_order(user_id: &str) -> Order {
        let mut order = Order::new(user_id, vec![OrderItem::new("p1", 2, Decimal::from(10))]);
        order.id = Uuid::new_v4();
        order
    }

    fn setup() -> (OrderCache, MemoryCacheStore) {
        let remote = MemoryCacheStore::new();
        let cache = OrderCache::new(Arc::new(remote.clone()), OrderCache::DEFAULT_TTL);
        (cache, remote)
    }

    #[tokio::test]
    async fn set_then_get_is_a_local_hit() {
        let (cache, remote) = setup();
        let ctx = OpContext::background();
        let order = stored_order("u1");

        cache.set_order(&ctx, &order).await.unwrap();
        remote.set_available(false);

        match cache.get_order(&ctx, order.id).await {
            CacheLookup::Hit(found) => assert_eq!(found, order),
            other => panic!("expected hit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn set_writes_value_and_user_index() {
        let (cache, remote) = setup();
        let ctx = OpContext::background();
        let order = stored_order("u1");

        cache.set_order(&ctx, &order).await.unwrap();

        assert!(remote.get(&ctx, &order_key(order.id)).await.unwrap().is_some());
        assert_eq!(
            remote.members(&user_orders_key("u1")).await,
            vec![order.id.to_string()]
        );
    }

    #[tokio::test]
    async fn remote_hit_repopulates_local() {
        let (cache, remote) = setup();
        let ctx = OpContext::background();
        let order = stored_order("u1");

        remote
            .set_ex(
                &ctx,
                &order_key(order.id),
                serde_json::to_string(&order).unwrap(),
                Duration::from_secs(60),
            )
            .await
            .unwrap();

        assert!(!cache.contains_local(order.id));
        assert!(matches!(
            cache.get_order(&ctx, order.id).await,
            CacheLookup::Hit(_)
        ));
        assert!(cache.contains_local(order.id));
    }

    #[tokio::test]
    async fn absent_key_is_a_miss() {
        let (cache, _) = setup();
        let ctx = OpContext::background();

        assert!(matches!(
            cache.get_order(&ctx, Uuid::new_v4()).await,
            CacheLookup::Miss
        ));
    }

    #[tokio::test]
    async fn garbage_payload_is_unavailable_not_miss() {
        let (cache, remote) = setup();
        let ctx = OpContext::background();
        let id = Uuid::new_v4();

        remote
            .set_ex(&ctx, &order_key(id), "{not json".into(), Duration::from_secs(60))
            .await
            .unwrap();

        assert!(matches!(
            cache.get_order(&ctx, id).await,
            CacheLookup::Unavailable(CacheError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_remote_is_unavailable() {
        let (cache, remote) = setup();
        let ctx = OpContext::background();
        remote.set_available(false);

        assert!(matches!(
            cache.get_order(&ctx, Uuid::new_v4()).await,
            CacheLookup::Unavailable(_)
        ));
    }

    #[tokio::test]
    async fn failed_set_leaves_local_untouched() {
        let (cache, remote) = setup();
        let ctx = OpContext::background();
        let order = stored_order("u1");
        remote.set_available(false);

        assert!(cache.set_order(&ctx, &order).await.is_err());
        assert!(!cache.contains_local(order.id));
    }

    #[tokio::test]
    async fn delete_clears_both_tiers() {
        let (cache, remote) = setup();
        let ctx = OpContext::background();
        let order = stored_order("u1");

        cache.set_order(&ctx, &order).await.unwrap();
        cache.delete_order(&ctx, order.id, "u1").await.unwrap();

        assert!(matches!(
            cache.get_order(&ctx, order.id).await,
            CacheLookup::Miss
        ));
        assert!(remote.members(&user_orders_key("u1")).await.is_empty());
    }

    #[tokio::test]
    async fn failed_delete_keeps_local_entry() {
        let (cache, remote) = setup();
        let ctx = OpContext::background();
        let order = stored_order("u1");

        cache.set_order(&ctx, &order).await.unwrap();
        remote.set_available(false);

        assert!(cache.delete_order(&ctx, order.id, "u1").await.is_err());
        assert!(cache.contains_local(order.id));
    }

    #[tokio::test]
    async fn local_entries_expire_with_ttl() {
        let remote = MemoryCacheStore::new();
        let cache = OrderCache::new(Arc::new(remote.clone()), Duration::from_millis(20));
        let ctx = OpContext::background();
        let order = stored_order("u1");

        cache.set_order(&ctx, &order).await.unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;

        assert!(!cache.contains_local(order.id));
    }

    #[tokio::test]
    async fn deleted_orders_are_never_hits() {
        let (cache, _) = setup();
        let ctx = OpContext::background();
        let mut order = stored_order("u1");
        order.soft_delete(chrono::Utc::now());

        cache.set_order(&ctx, &order).await.unwrap();

        assert!(matches!(
            cache.get_order(&ctx, order.id).await,
            CacheLookup::Miss
        ));
    }

    #[tokio::test]
    async fn evict_local_keeps_remote_copy() {
        let (cache, remote) = setup();
        let ctx = OpContext::background();
        let order = stored_order("u1");

        cache.set_order(&ctx, &order).await.unwrap();
        cache.evict_local(order.id);

        assert!(!cache.contains_local(order.id));
        assert!(remote.get(&ctx, &order_key(order.id)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn tombstone_hides_stale_remote_copy() {
        let (cache, remote) = setup();
        let ctx = OpContext::background();
        let order = stored_order("u1");

        cache.set_order(&ctx, &order).await.unwrap();
        cache.tombstone(order.id);

        assert!(!cache.contains_local(order.id));
        assert!(remote.get(&ctx, &order_key(order.id)).await.unwrap().is_some());
        assert!(matches!(
            cache.get_order(&ctx, order.id).await,
            CacheLookup::Miss
        ));
    }

    #[tokio::test]
    async fn tombstones_expire_with_ttl() {
        let remote = MemoryCacheStore::new();
        let cache = OrderCache::new(Arc::new(remote.clone()), Duration::from_millis(20));
        let ctx = OpContext::background();
        let order = stored_order("u1");

        cache.tombstone(order.id);
        tokio::time::sleep(Duration::from_millis(40)).await;
        remote
            .set_ex(
                &ctx,
                &order_key(order.id),
                serde_json::to_string(&order).unwrap(),
                Duration::from_secs(60),
            )
            .await
            .unwrap();

        assert!(matches!(
            cache.get_order(&ctx, order.id).await,
            CacheLookup::Hit(_)
        ));
    }
}
