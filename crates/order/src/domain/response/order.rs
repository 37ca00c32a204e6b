use crate::model::{Order, OrderItem, OrderStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct OrderItemResponse {
    pub id: Uuid,
    #[serde(rename = "order_id")]
    pub order_id: Uuid,
    #[serde(rename = "product_id")]
    pub product_id: String,
    pub quantity: i32,
    #[schema(value_type = String, example = "10.00")]
    pub price: Decimal,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(value: OrderItem) -> Self {
        OrderItemResponse {
            id: value.id,
            order_id: value.order_id,
            product_id: value.product_id,
            quantity: value.quantity,
            price: value.price,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct OrderResponse {
    pub id: Uuid,
    #[serde(rename = "user_id")]
    pub user_id: String,
    pub status: OrderStatus,
    #[schema(value_type = String, example = "25.00")]
    pub amount: Decimal,
    pub items: Vec<OrderItemResponse>,
    #[serde(rename = "created_at")]
    pub created_at: Option<String>,
    #[serde(rename = "updated_at")]
    pub updated_at: Option<String>,
}

// model to response
impl From<Order> for OrderResponse {
    fn from(value: Order) -> Self {
        OrderResponse {
            id: value.id,
            user_id: value.user_id,
            status: value.status,
            amount: value.amount,
            items: value.items.into_iter().map(OrderItemResponse::from).collect(),
            created_at: value.created_at.map(|dt| dt.to_rfc3339()),
            updated_at: value.updated_at.map(|dt| dt.to_rfc3339()),
        }
    }
}
