use crate::errors::{error::ErrorResponse, service::ServiceError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

#[derive(Debug)]
pub enum HttpError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    GatewayTimeout(String),
    Internal(String),
}

impl From<ServiceError> for HttpError {
    fn from(err: ServiceError) -> Self {
        if let Some(reason) = err.interrupted() {
            return HttpError::GatewayTimeout(format!("Request aborted: {reason}"));
        }

        match err {
            ServiceError::Validation(errors) => {
                HttpError::BadRequest(format!("Validation failed: {}", errors.join("; ")))
            }
            ServiceError::OrderNotFound => HttpError::NotFound("Order not found".into()),
            ServiceError::Unauthorized => {
                HttpError::Forbidden("You do not have access to this order".into())
            }
            ServiceError::InvalidOrderStatus(reason) => {
                HttpError::BadRequest(format!("Invalid order status: {reason}"))
            }
            ServiceError::Jwt(err) => HttpError::Unauthorized(format!("JWT error: {err}")),
            ServiceError::TokenExpired => HttpError::Unauthorized("Token expired".into()),
            err @ (ServiceError::Cache { .. }
            | ServiceError::Store { .. }
            | ServiceError::Internal(_)) => {
                error!("❌ Internal failure: {err}");
                HttpError::Internal(err.to_string())
            }
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            HttpError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            HttpError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            HttpError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            HttpError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            HttpError::GatewayTimeout(msg) => (StatusCode::GATEWAY_TIMEOUT, msg),
            HttpError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse {
            status: "error".into(),
            message: msg,
        });

        (status, body).into_response()
    }
}
