use std::net::SocketAddr;
use std::time::Instant;

use axum::extract::{ConnectInfo, Request};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{error, info, warn};

/// Logs one line per request/response pair, error responses included.
///
/// Mount with `axum::middleware::from_fn(log_requests)`. The caller address
/// comes from `x-forwarded-for` when present, then from `ConnectInfo` when the
/// server was started with `into_make_service_with_connect_info`.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let ip = caller_ip(&request);
    let user_agent = header_text(request.headers(), header::USER_AGENT.as_str())
        .unwrap_or_else(|| "-".to_string());
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let latency_ms = started.elapsed().as_millis() as u64;
    if response.status().is_server_error() {
        error!(%method, %path, status, latency_ms, %ip, %user_agent, "request failed");
    } else if response.status().is_client_error() {
        warn!(%method, %path, status, latency_ms, %ip, %user_agent, "request rejected");
    } else {
        info!(%method, %path, status, latency_ms, %ip, %user_agent, "request handled");
    }

    response
}

fn caller_ip(request: &Request) -> String {
    if let Some(forwarded) = header_text(request.headers(), "x-forwarded-for") {
        if let Some(first) = forwarded.split(',').map(str::trim).find(|ip| !ip.is_empty()) {
            return first.to_string();
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn header_text(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}
