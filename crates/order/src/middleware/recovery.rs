use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use shared::errors::ErrorResponse;
use std::any::Any;
use tower_http::catch_panic::CatchPanicLayer;
use tracing::error;

pub type RecoveryLayer = CatchPanicLayer<fn(Box<dyn Any + Send + 'static>) -> Response>;

/// Turns a panicking handler into a 500 with the usual error body instead of
/// a dropped connection.
pub fn recovery_layer() -> RecoveryLayer {
    CatchPanicLayer::custom(handle_panic as fn(Box<dyn Any + Send + 'static>) -> Response)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };

    error!("💥 Handler panicked: {detail}");

    let body = Json(ErrorResponse {
        status: "error".into(),
        message: "Internal server error".into(),
    });

    (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
}
