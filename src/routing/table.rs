//! Route registry capability and the dispatch table that implements it.

use crate::request::RequestContext;
use crate::response::PageResponse;
use crate::routing::pattern::CompiledPattern;
use async_trait::async_trait;
use axum::extract::{Request, State};
use axum::http::{Method, StatusCode};
use axum::Router;
use std::sync::Arc;
use tracing::debug;

/// Handles a request that matched a registered route.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, request: &(dyn RequestContext + Sync)) -> PageResponse;
}

pub type RouteHandler = Arc<dyn Handler>;

/// Where localized routes get registered.
pub trait RouteRegistry {
    /// Register `handler` for GET requests whose path matches `pattern`.
    fn register_get(&mut self, pattern: CompiledPattern, handler: RouteHandler);
}

struct Route {
    pattern: CompiledPattern,
    handler: RouteHandler,
}

/// Ordered route registrations, dispatched first match wins.
#[derive(Default)]
pub struct RouteTable {
    routes: Vec<Route>,
    not_found: Option<RouteHandler>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handler used when no registered pattern matches.
    pub fn set_not_found(&mut self, handler: RouteHandler) {
        self.not_found = Some(handler);
    }

    /// Registered pattern sources, in registration order.
    pub fn patterns(&self) -> Vec<&str> {
        self.routes.iter().map(|r| r.pattern.source()).collect()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Run the first route matching the request path.
    ///
    /// # Returns
    /// `None` if no route matches and no not-found handler is set.
    pub async fn dispatch(&self, request: &(dyn RequestContext + Sync)) -> Option<PageResponse> {
        let path = request.path();
        match self.routes.iter().find(|r| r.pattern.is_match(path)) {
            Some(route) => {
                debug!(path, pattern = route.pattern.source(), "Route matched");
                Some(route.handler.handle(request).await)
            }
            None => match &self.not_found {
                Some(handler) => Some(handler.handle(request).await),
                None => None,
            },
        }
    }

    /// Convert into an axum router serving every registration as a GET route.
    ///
    /// Mount it with `nest_service` to serve it under a base URL; the
    /// dispatched path is then relative to that base.
    pub fn into_router(self) -> Router {
        Router::new()
            .fallback(serve_route)
            .with_state(Arc::new(self))
    }
}

impl RouteRegistry for RouteTable {
    fn register_get(&mut self, pattern: CompiledPattern, handler: RouteHandler) {
        debug!(pattern = pattern.source(), "Registering route");
        self.routes.push(Route { pattern, handler });
    }
}

async fn serve_route(State(table): State<Arc<RouteTable>>, request: Request) -> PageResponse {
    let (parts, _body) = request.into_parts();
    if parts.method != Method::GET && parts.method != Method::HEAD {
        return PageResponse::page(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
    }

    table
        .dispatch(&parts)
        .await
        .unwrap_or_else(|| PageResponse::page(StatusCode::NOT_FOUND, "Not Found"))
}
