use crate::{
    abstract_trait::DynOrderService,
    domain::{
        requests::order::{CreateOrderRequest, UpdateOrderStatusRequest},
        response::{api::ApiResponse, order::OrderResponse},
    },
    middleware::{
        context::op_context_middleware, jwt::auth_middleware, validate::SimpleValidatedJson,
    },
    model::OrderStatus,
    state::AppState,
};
use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use shared::{
    config::Identity,
    errors::{HttpError, ServiceError},
    utils::OpContext,
};
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/orders",
    tag = "Order",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Orders owned by the caller, newest first", body = ApiResponse<Vec<OrderResponse>>),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_orders(
    Extension(service): Extension<DynOrderService>,
    Extension(ctx): Extension<OpContext>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, HttpError> {
    let orders = service.list_orders(&ctx, &identity.user_id).await?;
    let data: Vec<OrderResponse> = orders.into_iter().map(OrderResponse::from).collect();

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success("Orders retrieved successfully", data)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    tag = "Order",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order details", body = ApiResponse<OrderResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Order belongs to another user"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn get_order(
    Extension(service): Extension<DynOrderService>,
    Extension(ctx): Extension<OpContext>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let order = service.get_order(&ctx, id, &identity.user_id).await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(
            "Order retrieved successfully",
            OrderResponse::from(order),
        )),
    ))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Order",
    security(("bearer_auth" = [])),
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_order(
    Extension(service): Extension<DynOrderService>,
    Extension(ctx): Extension<OpContext>,
    Extension(identity): Extension<Identity>,
    SimpleValidatedJson(body): SimpleValidatedJson<CreateOrderRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let order = service
        .create_order(&ctx, &identity.user_id, &body)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "Order created successfully",
            OrderResponse::from(order),
        )),
    ))
}

#[utoipa::path(
    put,
    path = "/api/orders/{id}",
    tag = "Order",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Order status updated", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Unknown status or transition not allowed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Order belongs to another user"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn update_order_status(
    Extension(service): Extension<DynOrderService>,
    Extension(ctx): Extension<OpContext>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
    SimpleValidatedJson(body): SimpleValidatedJson<UpdateOrderStatusRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let status = body
        .status
        .parse::<OrderStatus>()
        .map_err(|e| HttpError::from(ServiceError::Validation(vec![e.to_string()])))?;

    let order = service
        .update_order_status(&ctx, id, &identity.user_id, status)
        .await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(
            "Order status updated successfully",
            OrderResponse::from(order),
        )),
    ))
}

#[utoipa::path(
    post,
    path = "/api/orders/{id}/cancel",
    tag = "Order",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order cancelled", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Order can no longer be cancelled"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Order belongs to another user"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn cancel_order(
    Extension(service): Extension<DynOrderService>,
    Extension(ctx): Extension<OpContext>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let order = service.cancel_order(&ctx, id, &identity.user_id).await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(
            "Order cancelled successfully",
            OrderResponse::from(order),
        )),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/orders/{id}",
    tag = "Order",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order deleted", body = serde_json::Value),
        (status = 400, description = "Order is not in a deletable status"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Order belongs to another user"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn delete_order(
    Extension(service): Extension<DynOrderService>,
    Extension(ctx): Extension<OpContext>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    service.delete_order(&ctx, id, &identity.user_id).await?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "status": "success",
            "message": "Order deleted successfully"
        })),
    ))
}

pub fn order_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    OpenApiRouter::new()
        .route("/api/orders", get(get_orders).post(create_order))
        .route(
            "/api/orders/{id}",
            get(get_order).put(update_order_status).delete(delete_order),
        )
        .route("/api/orders/{id}/cancel", post(cancel_order))
        .route_layer(middleware::from_fn(auth_middleware))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            op_context_middleware,
        ))
        .layer(Extension(app_state.di_container.order_service.clone()))
        .layer(Extension(app_state.jwt_config.clone()))
}
