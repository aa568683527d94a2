use crate::infra::{AppState, Services};
use axum::extract::DefaultBodyLimit;
use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use cabinet::contentieux::contentieux_router;
use cabinet::immobilier::immobilier_router;
use cabinet::import::import_router;
use cabinet::recouvrement::recouvrement_router;
use cabinet::web::error_response;
use serde_json::json;
use std::sync::atomic::Ordering;

/// Operational endpoints plus every domain router. Uploads are capped at
/// `max_upload_bytes`.
pub(crate) fn app_router(services: &Services, max_upload_bytes: usize) -> Router {
    let import = import_router(services.importer.clone())
        .layer(DefaultBodyLimit::max(max_upload_bytes));

    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .merge(contentieux_router(services.contentieux.clone()))
        .merge(immobilier_router(services.immobilier.clone()))
        .merge(recouvrement_router(services.recouvrement.clone()))
        .merge(import)
        .fallback(unknown_route)
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

async fn unknown_route(uri: Uri) -> Response {
    error_response(StatusCode::NOT_FOUND, format!("no route for {}", uri.path()))
}
