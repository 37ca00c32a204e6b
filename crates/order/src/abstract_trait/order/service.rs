use crate::{
    domain::requests::order::CreateOrderRequest,
    model::{Order, OrderStatus},
};
use async_trait::async_trait;
use shared::{errors::ServiceError, utils::OpContext};
use std::sync::Arc;
use uuid::Uuid;

pub type DynOrderService = Arc<dyn OrderServiceTrait + Send + Sync>;

/// Caller-facing order operations. `user_id` is always the authenticated
/// caller, never a value taken from a request body.
#[async_trait]
pub trait OrderServiceTrait {
    async fn list_orders(&self, ctx: &OpContext, user_id: &str)
    -> Result<Vec<Order>, ServiceError>;
    async fn create_order(
        &self,
        ctx: &OpContext,
        user_id: &str,
        req: &CreateOrderRequest,
    ) -> Result<Order, ServiceError>;
    async fn get_order(
        &self,
        ctx: &OpContext,
        id: Uuid,
        user_id: &str,
    ) -> Result<Order, ServiceError>;
    async fn update_order_status(
        &self,
        ctx: &OpContext,
        id: Uuid,
        user_id: &str,
        status: OrderStatus,
    ) -> Result<Order, ServiceError>;
    async fn delete_order(&self, ctx: &OpContext, id: Uuid, user_id: &str)
    -> Result<(), ServiceError>;
    async fn cancel_order(
        &self,
        ctx: &OpContext,
        id: Uuid,
        user_id: &str,
    ) -> Result<Order, ServiceError>;
}
