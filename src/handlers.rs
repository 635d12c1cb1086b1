//! The two request handlers built atop the [`Upstream`] transport: a pass-through handler and a
//! caching handler. The caching handler is where cache lookup, upstream forwarding via
//! [`CaptureBody`], and conditional insertion are orchestrated.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::response::Response;
use http::StatusCode;
use tracing::info;

use crate::cache::Cache;
use crate::capture::{CaptureBody, CaptureBuffer};
use crate::upstream::Upstream;

/// Shared state every registered route handler closes over.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<Cache>,
    pub upstream: Upstream,
}

/// Derive the cache key for a request: `"{METHOD}-{REQUEST_URL}"`, case-sensitive in both parts,
/// where `REQUEST_URL` is the full request-line target including the query string.
fn cache_key(req: &Request) -> String {
    format!("{}-{}", req.method(), req.uri())
}

/// Forwards the request to the upstream transport verbatim. Never reads from or writes to the
/// cache.
pub async fn pass_through_handler(State(state): State<AppState>, req: Request) -> Response {
    info!(method = %req.method(), url = %req.uri(), "pass-through request");
    state.upstream.forward(req).await
}

/// On a cache hit, serves the buffered body with a synthesized `200 OK` (no replayed headers —
/// the cache stores only the body, not the original response's headers). On a miss, forwards
/// upstream via a tee'd capture and stores
/// the body once it finishes streaming to the client, provided the upstream status was 2xx and
/// the body fits within the cache's capacity.
pub async fn caching_handler(State(state): State<AppState>, req: Request) -> Response {
    let key = cache_key(&req);
    info!(method = %req.method(), url = %req.uri(), %key, "caching request");

    let (value, present) = state.cache.load(&key);
    if present {
        info!(%key, "cache hit");
        return Response::builder()
            .status(StatusCode::OK)
            .body(Body::from(value))
            .expect("building a cache-hit response cannot fail");
    }
    info!(%key, "cache miss");

    let upstream_response = state.upstream.forward(req).await;
    let status = upstream_response.status();
    let (parts, body) = upstream_response.into_parts();

    let buffer = CaptureBuffer::new();
    let (done_tx, done_rx) = tokio::sync::oneshot::channel();
    let capture = CaptureBody::new(body, buffer.clone(), done_tx);
    let response = Response::from_parts(parts, Body::new(capture));

    let cache = Arc::clone(&state.cache);
    let capacity = cache.capacity_bytes();
    tokio::spawn(async move {
        // Whether the body finished cleanly or the client disconnected mid-stream, the buffer
        // holds whatever the upstream wrote so far, and cacheability depends solely on status.
        let _ = done_rx.await;
        if (200..300).contains(&status.as_u16()) {
            let bytes = buffer.into_vec();
            if bytes.len() <= capacity {
                cache.store(&key, bytes);
            }
        }
    });

    response
}
