use crate::state::AppState;
use axum::{
    body::Body, extract::State, http::Request, middleware::Next, response::IntoResponse,
};
use std::sync::Arc;

/// Gives every request its own `OpContext`, cancelled on shutdown and bounded
/// by the configured request timeout.
pub async fn op_context_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request<Body>,
    next: Next,
) -> impl IntoResponse {
    let ctx = state.root_ctx.child_with_timeout(state.request_timeout);
    req.extensions_mut().insert(ctx);
    next.run(req).await
}
