use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::http::request::Request;
use crate::http::response::Response;

/// Something that turns a request into a response for one route.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, request: &Request) -> Response;
}

/// Maps route keys to handlers.
///
/// Built once before the listener starts and shared read-only between
/// connections afterwards.
#[derive(Default)]
pub struct Router {
    handlers: HashMap<String, Arc<dyn Handler>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `route`. A second registration of the same key
    /// replaces the first.
    pub fn register(
        &mut self,
        route: impl Into<String>,
        handler: impl Handler + 'static,
    ) -> &mut Self {
        let route = route.into().to_lowercase();
        tracing::debug!(route = %route, "Registered route");
        self.handlers.insert(route, Arc::new(handler));
        self
    }

    /// Builder-style [`Router::register`].
    pub fn route(mut self, route: impl Into<String>, handler: impl Handler + 'static) -> Self {
        self.register(route, handler);
        self
    }

    pub fn has_route(&self, route: &str) -> bool {
        self.handlers.contains_key(route)
    }

    /// Runs the handler for `request.route`, or answers 404 when none exists.
    pub async fn dispatch(&self, request: &Request) -> Response {
        match self.handlers.get(&request.route) {
            Some(handler) => handler.handle(request).await,
            None => Response::not_found(),
        }
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut routes: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        routes.sort_unstable();
        f.debug_struct("Router").field("routes", &routes).finish()
    }
}
