use crate::{abstract_trait::OrderStoreTrait, model::Order};
use async_trait::async_trait;
use chrono::Utc;
use shared::{errors::RepositoryError, utils::OpContext};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

struct StoredOrder {
    seq: u64,
    order: Order,
}

#[derive(Default)]
struct Tables {
    next_seq: u64,
    orders: HashMap<Uuid, StoredOrder>,
}

/// In-process order store for local development and tests. Counts every
/// call and can be told to fail or stall.
#[derive(Clone, Default)]
pub struct MemoryOrderStore {
    tables: Arc<RwLock<Tables>>,
    failing: Arc<AtomicBool>,
    calls: Arc<AtomicUsize>,
    latency: Arc<RwLock<Option<Duration>>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every call returns a store error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Adds an artificial delay to every call.
    pub async fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.write().await = latency;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn reset_calls(&self) {
        self.calls.store(0, Ordering::SeqCst);
    }

    /// Raw row, soft-deleted or not.
    pub async fn raw(&self, id: Uuid) -> Option<Order> {
        self.tables
            .read()
            .await
            .orders
            .get(&id)
            .map(|stored| stored.order.clone())
    }

    async fn enter(&self, ctx: &OpContext, op: &str) -> Result<(), RepositoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let latency = *self.latency.read().await;
        if let Some(latency) = latency {
            ctx.run(tokio::time::sleep(latency)).await?;
        } else if let Some(reason) = ctx.interrupted() {
            return Err(reason.into());
        }

        if self.failing.load(Ordering::SeqCst) {
            warn!("Memory store failing on {op}");
            return Err(RepositoryError::Custom(format!("memory store failure on {op}")));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderStoreTrait for MemoryOrderStore {
    async fn insert(&self, ctx: &OpContext, order: &Order) -> Result<Order, RepositoryError> {
        self.enter(ctx, "insert").await?;

        let mut tables = self.tables.write().await;
        if tables.orders.contains_key(&order.id) {
            return Err(RepositoryError::Custom(format!(
                "duplicate order id {}",
                order.id
            )));
        }

        let now = Utc::now();
        let mut stored = order.clone();
        stored.created_at = Some(now);
        stored.updated_at = Some(now);
        for item in &mut stored.items {
            item.order_id = order.id;
            item.created_at = Some(now);
            item.updated_at = Some(now);
        }

        let seq = tables.next_seq;
        tables.next_seq += 1;
        tables.orders.insert(
            order.id,
            StoredOrder {
                seq,
                order: stored.clone(),
            },
        );

        info!("✅ Created order {} for user {}", order.id, order.user_id);
        Ok(stored)
    }

    async fn find_by_id(
        &self,
        ctx: &OpContext,
        id: Uuid,
    ) -> Result<Option<Order>, RepositoryError> {
        self.enter(ctx, "find_by_id").await?;

        let tables = self.tables.read().await;
        Ok(tables
            .orders
            .get(&id)
            .filter(|stored| !stored.order.is_deleted)
            .map(|stored| stored.order.clone()))
    }

    async fn update(&self, ctx: &OpContext, order: &Order) -> Result<Order, RepositoryError> {
        self.enter(ctx, "update").await?;

        let mut tables = self.tables.write().await;
        let stored = tables
            .orders
            .get_mut(&order.id)
            .filter(|stored| !stored.order.is_deleted)
            .ok_or(RepositoryError::NotFound)?;

        stored.order.status = order.status;
        stored.order.amount = order.amount;
        stored.order.updated_at = Some(Utc::now());

        Ok(stored.order.clone())
    }

    async fn soft_delete(&self, ctx: &OpContext, id: Uuid) -> Result<(), RepositoryError> {
        self.enter(ctx, "soft_delete").await?;

        let mut tables = self.tables.write().await;
        let stored = tables
            .orders
            .get_mut(&id)
            .filter(|stored| !stored.order.is_deleted)
            .ok_or(RepositoryError::NotFound)?;

        let now = Utc::now();
        stored.order.soft_delete(now);
        stored.order.updated_at = Some(now);
        Ok(())
    }

    async fn list_by_user(
        &self,
        ctx: &OpContext,
        user_id: &str,
    ) -> Result<Vec<Order>, RepositoryError> {
        self.enter(ctx, "list_by_user").await?;

        let tables = self.tables.read().await;
        let mut matching: Vec<&StoredOrder> = tables
            .orders
            .values()
            .filter(|stored| stored.order.user_id == user_id && !stored.order.is_deleted)
            .collect();
        matching.sort_by(|a, b| b.seq.cmp(&a.seq));

        Ok(matching.into_iter().map(|s| s.order.clone()).collect())
    }
}
