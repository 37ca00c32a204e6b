use crate::{
    abstract_trait::{DynOrderRepository, OrderServiceTrait},
    domain::requests::order::CreateOrderRequest,
    model::{Order, OrderItem, OrderStatus, can_cancel, can_delete, is_valid_transition},
};
use async_trait::async_trait;
use opentelemetry::{
    Context, KeyValue,
    global::{self, BoxedTracer},
    trace::{Span, SpanKind, TraceContextExt, Tracer},
};
use prometheus_client::registry::Registry;
use shared::{
    errors::ServiceError,
    utils::{Method, Metrics, OpContext, Status as StatusUtils, TracingContext},
};
use tokio::time::Instant;
use tracing::{error, info};
use uuid::Uuid;

#[derive(Clone)]
pub struct OrderService {
    repository: DynOrderRepository,
    metrics: Metrics,
}

impl OrderService {
    pub fn new(repository: DynOrderRepository, registry: &mut Registry) -> Self {
        let metrics = Metrics::new();
        metrics.register(registry, "order_service");

        Self {
            repository,
            metrics,
        }
    }

    fn get_tracer(&self) -> BoxedTracer {
        global::tracer("order-service")
    }

    fn start_tracing(&self, operation_name: &str, attributes: Vec<KeyValue>) -> TracingContext {
        let start_time = Instant::now();
        let tracer = self.get_tracer();
        let mut span = tracer
            .span_builder(operation_name.to_string())
            .with_kind(SpanKind::Server)
            .with_attributes(attributes)
            .start(&tracer);

        info!("Starting operation: {operation_name}");

        span.add_event(
            "Operation started",
            vec![KeyValue::new("operation", operation_name.to_string())],
        );

        let cx = Context::current_with_span(span);
        TracingContext { cx, start_time }
    }

    fn complete_tracing<T>(
        &self,
        tracing_ctx: &TracingContext,
        method: Method,
        result: &Result<T, ServiceError>,
        success_message: &str,
    ) {
        match result {
            Ok(_) => self.complete_tracing_internal(tracing_ctx, method, true, success_message),
            Err(e) => {
                let message = format!("{success_message} failed: {e}");
                self.complete_tracing_internal(tracing_ctx, method, false, &message)
            }
        }
    }

    fn complete_tracing_internal(
        &self,
        tracing_ctx: &TracingContext,
        method: Method,
        is_success: bool,
        message: &str,
    ) {
        let status_str = if is_success { "SUCCESS" } else { "ERROR" };
        let status = if is_success {
            StatusUtils::Success
        } else {
            StatusUtils::Error
        };
        let elapsed = tracing_ctx.start_time.elapsed().as_secs_f64();

        tracing_ctx.cx.span().add_event(
            "Operation completed",
            vec![
                KeyValue::new("status", status_str),
                KeyValue::new("duration_secs", elapsed.to_string()),
                KeyValue::new("message", message.to_string()),
            ],
        );

        if is_success {
            info!("✅ Operation completed successfully: {message}");
        } else {
            error!("❌ Operation failed: {message}");
        }

        self.metrics.record(method, status, elapsed);

        tracing_ctx.cx.span().end();
    }

    /// Loads the order and checks that `user_id` owns it.
    async fn fetch_owned(
        &self,
        ctx: &OpContext,
        id: Uuid,
        user_id: &str,
    ) -> Result<Order, ServiceError> {
        let order = self.repository.get_by_id(ctx, id).await?;
        if order.user_id != user_id {
            error!("🚫 User {user_id} tried to access order {id}");
            return Err(ServiceError::Unauthorized);
        }
        Ok(order)
    }

    async fn build_and_create(
        &self,
        ctx: &OpContext,
        user_id: &str,
        req: &CreateOrderRequest,
    ) -> Result<Order, ServiceError> {
        let mut errors = Vec::new();

        if let Some(status) = &req.status
            && let Err(e) = status.parse::<OrderStatus>()
        {
            errors.push(e.to_string());
        }

        let items = req
            .items
            .iter()
            .map(|item| OrderItem::new(item.product_id.clone(), item.quantity, item.price))
            .collect();

        let mut order = Order::new(user_id, items);
        if let Err(e) = order.validate() {
            errors.extend(e.0);
        }

        if !errors.is_empty() {
            return Err(ServiceError::Validation(errors));
        }

        order.status = OrderStatus::Pending;
        order.recompute_amount()?;

        self.repository.create(ctx, order).await
    }

    async fn transition(
        &self,
        ctx: &OpContext,
        id: Uuid,
        user_id: &str,
        next: OrderStatus,
    ) -> Result<Order, ServiceError> {
        let mut order = self.fetch_owned(ctx, id, user_id).await?;

        if !is_valid_transition(order.status, next) {
            return Err(ServiceError::InvalidOrderStatus(format!(
                "cannot change order from {} to {next}",
                order.status
            )));
        }

        order.status = next;
        self.repository.update(ctx, &order).await
    }
}

#[async_trait]
impl OrderServiceTrait for OrderService {
    async fn list_orders(
        &self,
        ctx: &OpContext,
        user_id: &str,
    ) -> Result<Vec<Order>, ServiceError> {
        info!("📦 Listing orders for user {user_id}");

        let tracing_ctx = self.start_tracing(
            "list_orders",
            vec![KeyValue::new("user_id", user_id.to_string())],
        );

        let result = self.repository.list_by_user(ctx, user_id).await;

        self.complete_tracing(&tracing_ctx, Method::Get, &result, "List orders");
        result
    }

    async fn create_order(
        &self,
        ctx: &OpContext,
        user_id: &str,
        req: &CreateOrderRequest,
    ) -> Result<Order, ServiceError> {
        info!(
            "🏗️ Creating order for user {user_id} with {} items",
            req.items.len()
        );

        let tracing_ctx = self.start_tracing(
            "create_order",
            vec![
                KeyValue::new("user_id", user_id.to_string()),
                KeyValue::new("items", req.items.len() as i64),
            ],
        );

        let result = self.build_and_create(ctx, user_id, req).await;

        self.complete_tracing(&tracing_ctx, Method::Post, &result, "Create order");
        result
    }

    async fn get_order(
        &self,
        ctx: &OpContext,
        id: Uuid,
        user_id: &str,
    ) -> Result<Order, ServiceError> {
        info!("🔍 Fetching order {id} for user {user_id}");

        let tracing_ctx = self.start_tracing(
            "get_order",
            vec![
                KeyValue::new("order_id", id.to_string()),
                KeyValue::new("user_id", user_id.to_string()),
            ],
        );

        let result = self.fetch_owned(ctx, id, user_id).await;

        self.complete_tracing(&tracing_ctx, Method::Get, &result, "Get order");
        result
    }

    async fn update_order_status(
        &self,
        ctx: &OpContext,
        id: Uuid,
        user_id: &str,
        status: OrderStatus,
    ) -> Result<Order, ServiceError> {
        info!("🔄 Updating order {id} to {status} for user {user_id}");

        let tracing_ctx = self.start_tracing(
            "update_order_status",
            vec![
                KeyValue::new("order_id", id.to_string()),
                KeyValue::new("user_id", user_id.to_string()),
                KeyValue::new("status", status.as_str()),
            ],
        );

        let result = self.transition(ctx, id, user_id, status).await;

        self.complete_tracing(&tracing_ctx, Method::Put, &result, "Update order status");
        result
    }

    async fn delete_order(
        &self,
        ctx: &OpContext,
        id: Uuid,
        user_id: &str,
    ) -> Result<(), ServiceError> {
        info!("🗑️ Deleting order {id} for user {user_id}");

        let tracing_ctx = self.start_tracing(
            "delete_order",
            vec![
                KeyValue::new("order_id", id.to_string()),
                KeyValue::new("user_id", user_id.to_string()),
            ],
        );

        let result = async {
            let order = self.fetch_owned(ctx, id, user_id).await?;
            if !can_delete(order.status) {
                return Err(ServiceError::InvalidOrderStatus(format!(
                    "order in status {} cannot be deleted",
                    order.status
                )));
            }
            self.repository.delete(ctx, id).await
        }
        .await;

        self.complete_tracing(&tracing_ctx, Method::Delete, &result, "Delete order");
        result
    }

    async fn cancel_order(
        &self,
        ctx: &OpContext,
        id: Uuid,
        user_id: &str,
    ) -> Result<Order, ServiceError> {
        info!("🛑 Cancelling order {id} for user {user_id}");

        let tracing_ctx = self.start_tracing(
            "cancel_order",
            vec![
                KeyValue::new("order_id", id.to_string()),
                KeyValue::new("user_id", user_id.to_string()),
            ],
        );

        let result = async {
            let mut order = self.fetch_owned(ctx, id, user_id).await?;
            if !can_cancel(order.status) {
                return Err(ServiceError::InvalidOrderStatus(format!(
                    "order in status {} cannot be cancelled",
                    order.status
                )));
            }
            order.status = OrderStatus::Cancelled;
            self.repository.update(ctx, &order).await
        }
        .await;

        self.complete_tracing(&tracing_ctx, Method::Post, &result, "Cancel order");
        result
    }
}
