use crate::{
    abstract_trait::OrderStoreTrait,
    model::{Order, OrderItem, OrderItemRow, OrderRow},
};
use async_trait::async_trait;
use shared::{config::ConnectionPool, errors::RepositoryError, utils::OpContext};
use std::collections::HashMap;
use tracing::{error, info};
use uuid::Uuid;

const ORDER_COLUMNS: &str =
    "order_id, user_id, status, amount, created_at, updated_at, is_deleted, deleted_at";

const ITEM_COLUMNS: &str =
    "order_item_id, order_id, product_id, quantity, price, created_at, updated_at";

#[derive(Clone)]
pub struct PgOrderStore {
    db: ConnectionPool,
}

impl PgOrderStore {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }

    async fn fetch_items(&self, order_ids: &[Uuid]) -> Result<Vec<OrderItemRow>, RepositoryError> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = ANY($1) ORDER BY created_at ASC"
        );

        sqlx::query_as::<_, OrderItemRow>(&sql)
            .bind(order_ids)
            .fetch_all(&self.db)
            .await
            .map_err(|e| {
                error!("❌ Failed to fetch order items: {:?}", e);
                RepositoryError::from(e)
            })
    }
}

fn to_order(row: OrderRow, items: Vec<OrderItem>) -> Result<Order, RepositoryError> {
    let id = row.order_id;
    row.into_order(items).map_err(|e| {
        error!("❌ Order {id} has a corrupt status: {e}");
        RepositoryError::Custom(e.to_string())
    })
}

#[async_trait]
impl OrderStoreTrait for PgOrderStore {
    async fn insert(&self, ctx: &OpContext, order: &Order) -> Result<Order, RepositoryError> {
        ctx.run(async {
            let mut tx = self.db.begin().await.map_err(|e| {
                error!("❌ Failed to begin transaction: {:?}", e);
                RepositoryError::from(e)
            })?;

            let sql = format!(
                r#"
                INSERT INTO orders (order_id, user_id, status, amount, created_at, updated_at)
                VALUES ($1, $2, $3, $4, current_timestamp, current_timestamp)
                RETURNING {ORDER_COLUMNS}
                "#
            );

            let row = sqlx::query_as::<_, OrderRow>(&sql)
                .bind(order.id)
                .bind(&order.user_id)
                .bind(order.status.as_str())
                .bind(order.amount)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| {
                    error!(
                        "❌ Failed to create order for user {}: {:?}",
                        order.user_id, e
                    );
                    RepositoryError::from(e)
                })?;

            let item_sql = format!(
                r#"
                INSERT INTO order_items (order_item_id, order_id, product_id, quantity, price, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, current_timestamp, current_timestamp)
                RETURNING {ITEM_COLUMNS}
                "#
            );

            let mut items = Vec::with_capacity(order.items.len());
            for item in &order.items {
                let item_row = sqlx::query_as::<_, OrderItemRow>(&item_sql)
                    .bind(item.id)
                    .bind(order.id)
                    .bind(&item.product_id)
                    .bind(item.quantity)
                    .bind(item.price)
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(|e| {
                        error!("❌ Failed to insert item for order {}: {:?}", order.id, e);
                        RepositoryError::from(e)
                    })?;
                items.push(OrderItem::from(item_row));
            }

            tx.commit().await.map_err(|e| {
                error!("❌ Failed to commit order {}: {:?}", order.id, e);
                RepositoryError::from(e)
            })?;

            info!(
                "✅ Created order {} for user {} with {} items",
                order.id,
                order.user_id,
                items.len()
            );

            to_order(row, items)
        })
        .await?
    }

    async fn find_by_id(
        &self,
        ctx: &OpContext,
        id: Uuid,
    ) -> Result<Option<Order>, RepositoryError> {
        ctx.run(async {
            let sql = format!(
                "SELECT {ORDER_COLUMNS} FROM orders WHERE order_id = $1 AND is_deleted = FALSE"
            );

            let row = sqlx::query_as::<_, OrderRow>(&sql)
                .bind(id)
                .fetch_optional(&self.db)
                .await
                .map_err(|e| {
                    error!("❌ Failed to fetch order {}: {:?}", id, e);
                    RepositoryError::from(e)
                })?;

            let Some(row) = row else {
                info!("❌ Order {id} not found");
                return Ok(None);
            };

            let items = self
                .fetch_items(&[id])
                .await?
                .into_iter()
                .map(OrderItem::from)
                .collect();

            to_order(row, items).map(Some)
        })
        .await?
    }

    async fn update(&self, ctx: &OpContext, order: &Order) -> Result<Order, RepositoryError> {
        ctx.run(async {
            let sql = format!(
                r#"
                UPDATE orders
                SET status     = $2,
                    amount     = $3,
                    updated_at = current_timestamp
                WHERE order_id = $1 AND is_deleted = FALSE
                RETURNING {ORDER_COLUMNS}
                "#
            );

            let row = sqlx::query_as::<_, OrderRow>(&sql)
                .bind(order.id)
                .bind(order.status.as_str())
                .bind(order.amount)
                .fetch_optional(&self.db)
                .await
                .map_err(|e| {
                    error!("❌ Failed to update order {}: {:?}", order.id, e);
                    RepositoryError::from(e)
                })?
                .ok_or(RepositoryError::NotFound)?;

            info!("🔄 Updated order {} to {}", order.id, order.status);

            to_order(row, order.items.clone())
        })
        .await?
    }

    async fn soft_delete(&self, ctx: &OpContext, id: Uuid) -> Result<(), RepositoryError> {
        ctx.run(async {
            let result = sqlx::query(
                r#"
                UPDATE orders
                SET is_deleted = TRUE,
                    deleted_at = current_timestamp,
                    updated_at = current_timestamp
                WHERE order_id = $1 AND is_deleted = FALSE
                "#,
            )
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(|e| {
                error!("❌ Failed to soft-delete order {}: {:?}", id, e);
                RepositoryError::from(e)
            })?;

            if result.rows_affected() == 0 {
                return Err(RepositoryError::NotFound);
            }

            info!("🗑️ Soft-deleted order {id}");
            Ok::<_, RepositoryError>(())
        })
        .await?
    }

    async fn list_by_user(
        &self,
        ctx: &OpContext,
        user_id: &str,
    ) -> Result<Vec<Order>, RepositoryError> {
        ctx.run(async {
            let sql = format!(
                r#"
                SELECT {ORDER_COLUMNS}
                FROM orders
                WHERE user_id = $1 AND is_deleted = FALSE
                ORDER BY created_at DESC
                "#
            );

            let rows = sqlx::query_as::<_, OrderRow>(&sql)
                .bind(user_id)
                .fetch_all(&self.db)
                .await
                .map_err(|e| {
                    error!("❌ Failed to list orders for user {}: {:?}", user_id, e);
                    RepositoryError::from(e)
                })?;

            if rows.is_empty() {
                return Ok(Vec::new());
            }

            let ids: Vec<Uuid> = rows.iter().map(|r| r.order_id).collect();
            let mut items_by_order: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
            for item in self.fetch_items(&ids).await? {
                items_by_order
                    .entry(item.order_id)
                    .or_default()
                    .push(OrderItem::from(item));
            }

            info!("📦 Found {} orders for user {}", rows.len(), user_id);

            rows.into_iter()
                .map(|row| {
                    let items = items_by_order.remove(&row.order_id).unwrap_or_default();
                    to_order(row, items)
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .await?
    }
}
