use std::time::Duration;

use axum::{response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

use crate::request_id::{create_trace_layer, header, MakeReqId};
use users_projects::UsersProjects;

const BODY_LIMIT_BYTES: usize = 1024 * 1024;

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Build the HTTP router: module routes, `/health` and the middleware stack.
///
/// Layers added later run first, so a request passes the body limit, gets
/// a request id, is traced and then hits the (optional) timeout.
pub fn build_router(module: &UsersProjects, timeout: Option<Duration>) -> Router {
    let mut router = module.register_rest(Router::new().route("/health", get(health_check)));

    if let Some(timeout) = timeout {
        router = router.layer(TimeoutLayer::new(timeout));
    }

    router
        .layer(create_trace_layer())
        .layer(PropagateRequestIdLayer::new(header()))
        .layer(SetRequestIdLayer::new(header(), MakeReqId))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
}
