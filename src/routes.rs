//! Binds `(method, pattern)` pairs from configuration onto the `axum` router.
//!
//! Pattern syntax and matching semantics (exact method, HTTP 405 on a matched path with no
//! matching method, HTTP 404 on no path match) are delegated entirely to `axum`; this module only
//! decides which of the two handler kinds each configured route points at.

use axum::routing::{MethodRouter, Router};

use crate::config::RouteConfig;
use crate::handlers::{caching_handler, pass_through_handler, AppState};

/// Which handler a registered route dispatches to. A tagged two-variant enum rather than a
/// trait object — there are exactly two handler kinds, known at compile time, so dynamic
/// dispatch buys nothing here.
#[derive(Debug, Clone, Copy)]
pub enum HandlerKind {
    PassThrough,
    Caching,
}

fn method_router_for(kind: HandlerKind, methods: &[String]) -> MethodRouter<AppState> {
    let handler = match kind {
        HandlerKind::PassThrough => pass_through_handler,
        HandlerKind::Caching => caching_handler,
    };

    let mut method_router = MethodRouter::new();
    for method in methods {
        method_router = match method.to_ascii_uppercase().as_str() {
            "GET" => method_router.get(handler),
            "POST" => method_router.post(handler),
            "PUT" => method_router.put(handler),
            "DELETE" => method_router.delete(handler),
            "PATCH" => method_router.patch(handler),
            "HEAD" => method_router.head(handler),
            "OPTIONS" => method_router.options(handler),
            other => {
                tracing::warn!(method = other, "ignoring route with unsupported HTTP method");
                method_router
            }
        };
    }
    method_router
}

/// Register one route config under the given handler kind.
pub fn register_route(router: Router<AppState>, route: &RouteConfig, kind: HandlerKind) -> Router<AppState> {
    router.route(&route.pattern, method_router_for(kind, &route.methods))
}

/// Build the full router from the configured cached and pass-through routes.
pub fn build_router(
    cached_routes: &[RouteConfig],
    pass_through_routes: &[RouteConfig],
    state: AppState,
) -> Router {
    let mut router = Router::new();
    for route in cached_routes {
        tracing::debug!(pattern = %route.pattern, methods = ?route.methods, "registering cached route");
        router = register_route(router, route, HandlerKind::Caching);
    }
    for route in pass_through_routes {
        tracing::debug!(pattern = %route.pattern, methods = ?route.methods, "registering pass-through route");
        router = register_route(router, route, HandlerKind::PassThrough);
    }
    router.with_state(state)
}
