//! Access logging middleware.
//!
//! Logs every API request with method, path, status and latency, plus the
//! user id when auth has already run. Request bodies are never logged.

use std::time::Instant;

use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::session::UserIdentity;

pub async fn log_access(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let user_id = req.extensions().get::<UserIdentity>().map(|u| u.id.clone());
    let started = Instant::now();

    let response = next.run(req).await;

    tracing::info!(
        %method,
        %path,
        status = response.status().as_u16(),
        user_id = user_id.as_deref().unwrap_or("anonymous"),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "API access"
    );

    response
}
