mod common;

use common::harness;
use order::{
    cache::{CacheLookup, CacheWritePolicy},
    model::{Order, OrderItem, OrderStatus},
};
use rust_decimal::Decimal;
use shared::{
    errors::{CacheError, RepositoryError, ServiceError},
    utils::{Interrupted, OpContext},
};
use std::time::Duration;
use uuid::Uuid;

fn new_order(user_id: &str) -> Order {
    Order::new(
        user_id,
        vec![
            OrderItem::new("p1", 2, Decimal::new(1000, 2)),
            OrderItem::new("p2", 1, Decimal::new(500, 2)),
        ],
    )
}

#[tokio::test]
async fn create_assigns_ids_and_writes_through() {
    let h = harness(CacheWritePolicy::Strict);
    let ctx = OpContext::background();

    let created = h.repository.create(&ctx, new_order("u1")).await.unwrap();

    assert_ne!(created.id, Uuid::nil());
    assert!(created.items.iter().all(|i| i.id != Uuid::nil()));
    assert!(h.cache.contains_local(created.id));
    assert_eq!(
        h.remote.members("user:u1:orders").await,
        vec![created.id.to_string()]
    );
}

#[tokio::test]
async fn cached_order_is_served_without_the_store() {
    let h = harness(CacheWritePolicy::Strict);
    let ctx = OpContext::background();
    let created = h.repository.create(&ctx, new_order("u1")).await.unwrap();

    h.store.reset_calls();
    let found = h.repository.get_by_id(&ctx, created.id).await.unwrap();

    assert_eq!(found, created);
    assert_eq!(h.store.calls(), 0);
}

#[tokio::test]
async fn cache_miss_reads_store_and_repopulates() {
    let h = harness(CacheWritePolicy::Strict);
    let ctx = OpContext::background();
    let created = h.repository.create(&ctx, new_order("u1")).await.unwrap();
    h.cache.delete_order(&ctx, created.id, "u1").await.unwrap();

    h.store.reset_calls();
    let found = h.repository.get_by_id(&ctx, created.id).await.unwrap();

    assert_eq!(found.id, created.id);
    assert_eq!(h.store.calls(), 1);
    assert!(h.cache.contains_local(created.id));
}

#[tokio::test]
async fn delete_makes_order_unreachable_everywhere() {
    let h = harness(CacheWritePolicy::Strict);
    let ctx = OpContext::background();
    let created = h.repository.create(&ctx, new_order("u1")).await.unwrap();

    h.repository.delete(&ctx, created.id).await.unwrap();

    assert!(!h.cache.contains_local(created.id));
    assert!(matches!(
        h.cache.get_order(&ctx, created.id).await,
        CacheLookup::Miss
    ));
    assert!(matches!(
        h.repository.get_by_id(&ctx, created.id).await,
        Err(ServiceError::OrderNotFound)
    ));
    assert!(h.remote.members("user:u1:orders").await.is_empty());
    assert!(h.store.raw(created.id).await.unwrap().is_deleted);
}

#[tokio::test]
async fn delete_of_missing_order_is_not_found() {
    let h = harness(CacheWritePolicy::Strict);
    let ctx = OpContext::background();

    assert!(matches!(
        h.repository.delete(&ctx, Uuid::new_v4()).await,
        Err(ServiceError::OrderNotFound)
    ));
}

#[tokio::test]
async fn unavailable_cache_degrades_reads_to_the_store() {
    let h = harness(CacheWritePolicy::Strict);
    let ctx = OpContext::background();
    let created = h.repository.create(&ctx, new_order("u1")).await.unwrap();
    h.cache.evict_local(created.id);
    h.remote.set_available(false);

    let found = h.repository.get_by_id(&ctx, created.id).await.unwrap();

    assert_eq!(found.id, created.id);
    assert!(!h.cache.contains_local(created.id));
}

#[tokio::test]
async fn strict_policy_fails_when_write_through_fails() {
    let h = harness(CacheWritePolicy::Strict);
    let ctx = OpContext::background();
    h.remote.set_available(false);

    let err = h
        .repository
        .create(&ctx, new_order("u1"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Cache {
            source: CacheError::Backend(_),
            ..
        }
    ));
}

#[tokio::test]
async fn best_effort_policy_succeeds_and_drops_local_copy() {
    let h = harness(CacheWritePolicy::BestEffort);
    let ctx = OpContext::background();
    let created = h.repository.create(&ctx, new_order("u1")).await.unwrap();
    assert!(h.cache.contains_local(created.id));
    h.remote.set_available(false);

    let mut paid = created.clone();
    paid.status = OrderStatus::Paid;
    let updated = h.repository.update(&ctx, &paid).await.unwrap();

    assert_eq!(updated.status, OrderStatus::Paid);
    assert!(!h.cache.contains_local(created.id));
}

#[tokio::test]
async fn best_effort_delete_survives_cache_outage() {
    let h = harness(CacheWritePolicy::BestEffort);
    let ctx = OpContext::background();
    let created = h.repository.create(&ctx, new_order("u1")).await.unwrap();
    h.remote.set_available(false);

    h.repository.delete(&ctx, created.id).await.unwrap();

    assert!(!h.cache.contains_local(created.id));
    assert!(h.store.raw(created.id).await.unwrap().is_deleted);

    h.remote.set_available(true);
    let err = h.repository.get_by_id(&ctx, created.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::OrderNotFound));
}

#[tokio::test]
async fn strict_update_failure_never_serves_the_old_local_view() {
    let h = harness(CacheWritePolicy::Strict);
    let ctx = OpContext::background();
    let created = h.repository.create(&ctx, new_order("u1")).await.unwrap();
    h.remote.set_available(false);

    let mut paid = created.clone();
    paid.status = OrderStatus::Paid;
    assert!(h.repository.update(&ctx, &paid).await.is_err());

    assert!(!h.cache.contains_local(created.id));
    assert_eq!(h.store.raw(created.id).await.unwrap().status, OrderStatus::Paid);
}

#[tokio::test]
async fn store_failures_carry_the_failing_step() {
    let h = harness(CacheWritePolicy::Strict);
    let ctx = OpContext::background();
    h.store.set_failing(true);

    let err = h
        .repository
        .create(&ctx, new_order("u1"))
        .await
        .unwrap_err();

    match err {
        ServiceError::Store { context, source } => {
            assert_eq!(context, "failed to create order");
            assert!(matches!(source, RepositoryError::Custom(_)));
        }
        other => panic!("expected store error, got {other:?}"),
    }
}

#[tokio::test]
async fn cancelled_context_interrupts_the_call() {
    let h = harness(CacheWritePolicy::Strict);
    let ctx = OpContext::background();
    ctx.cancel();

    let err = h
        .repository
        .get_by_id(&ctx, Uuid::new_v4())
        .await
        .unwrap_err();

    assert_eq!(err.interrupted(), Some(Interrupted::Cancelled));
}

#[tokio::test]
async fn slow_store_hits_the_deadline() {
    let h = harness(CacheWritePolicy::Strict);
    h.store.set_latency(Some(Duration::from_secs(5))).await;
    let ctx = OpContext::with_timeout(Duration::from_millis(20));

    let err = h.repository.list_by_user(&ctx, "u1").await.unwrap_err();

    assert_eq!(err.interrupted(), Some(Interrupted::DeadlineExceeded));
}
