use crate::model::Order;
use async_trait::async_trait;
use shared::{errors::RepositoryError, utils::OpContext};
use std::sync::Arc;
use uuid::Uuid;

pub type DynOrderStore = Arc<dyn OrderStoreTrait + Send + Sync>;

/// Durable storage for orders and their line items.
///
/// Soft-deleted orders are invisible to every read. A missing row is
/// `Ok(None)` on lookups and `RepositoryError::NotFound` on writes.
#[async_trait]
pub trait OrderStoreTrait {
    /// Persists the order row and all of its items in one transaction and
    /// returns the stored order with timestamps filled in.
    async fn insert(&self, ctx: &OpContext, order: &Order) -> Result<Order, RepositoryError>;

    async fn find_by_id(&self, ctx: &OpContext, id: Uuid)
    -> Result<Option<Order>, RepositoryError>;

    /// Writes status, amount and `updated_at`. Items are left untouched.
    async fn update(&self, ctx: &OpContext, order: &Order) -> Result<Order, RepositoryError>;

    async fn soft_delete(&self, ctx: &OpContext, id: Uuid) -> Result<(), RepositoryError>;

    /// Newest first.
    async fn list_by_user(
        &self,
        ctx: &OpContext,
        user_id: &str,
    ) -> Result<Vec<Order>, RepositoryError>;
}
