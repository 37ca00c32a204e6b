use crate::model::Order;
use async_trait::async_trait;
use shared::{errors::ServiceError, utils::OpContext};
use std::sync::Arc;
use uuid::Uuid;

pub type DynOrderRepository = Arc<dyn OrderRepositoryTrait + Send + Sync>;

#[async_trait]
pub trait OrderRepositoryTrait {
    async fn list_by_user(&self, ctx: &OpContext, user_id: &str)
    -> Result<Vec<Order>, ServiceError>;
    async fn create(&self, ctx: &OpContext, order: Order) -> Result<Order, ServiceError>;
    async fn get_by_id(&self, ctx: &OpContext, id: Uuid) -> Result<Order, ServiceError>;
    async fn update(&self, ctx: &OpContext, order: &Order) -> Result<Order, ServiceError>;
    async fn delete(&self, ctx: &OpContext, id: Uuid) -> Result<(), ServiceError>;
}
