//! Built-in route handlers.

use std::sync::Arc;

use async_trait::async_trait;

use crate::http::request::{Method, Request};
use crate::http::response::{Response, ResponseBuilder, StatusCode};
use crate::routes::router::Handler;
use crate::storage::{Storage, StorageError};

/// `/` - always 200 with an empty body.
#[derive(Debug, Default, Clone, Copy)]
pub struct RootHandler;

#[async_trait]
impl Handler for RootHandler {
    async fn handle(&self, _request: &Request) -> Response {
        Response::empty(StatusCode::Ok)
    }
}

/// `/echo/<text>` - sends `<text>` back verbatim.
#[derive(Debug, Default, Clone, Copy)]
pub struct EchoHandler;

#[async_trait]
impl Handler for EchoHandler {
    async fn handle(&self, request: &Request) -> Response {
        Response::text(request.route_param.as_str())
    }
}

/// `/user-agent` - sends the client's `User-Agent` back.
#[derive(Debug, Default, Clone, Copy)]
pub struct UserAgentHandler;

#[async_trait]
impl Handler for UserAgentHandler {
    async fn handle(&self, request: &Request) -> Response {
        Response::text(request.header("user-agent").unwrap_or_default().trim())
    }
}

/// `/files/<name>` - GET reads, POST writes, through a [`Storage`].
#[derive(Clone)]
pub struct FilesHandler {
    storage: Arc<dyn Storage>,
}

const FILES_ALLOW: &str = "GET, POST";

impl FilesHandler {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    async fn get(&self, name: &str) -> Response {
        match self.storage.read(name).await {
            Ok(content) => ResponseBuilder::new(StatusCode::Ok)
                .header("Content-Type", "application/octet-stream")
                .body(content)
                .build(),
            Err(e) => storage_failure(name, e),
        }
    }

    async fn post(&self, name: &str, body: &[u8]) -> Response {
        match self.storage.write(name, body).await {
            Ok(()) => {
                tracing::info!(file = name, bytes = body.len(), "Stored file");
                Response::empty(StatusCode::Created)
            }
            Err(e) => storage_failure(name, e),
        }
    }
}

fn storage_failure(name: &str, err: StorageError) -> Response {
    match err {
        StorageError::NotFound => Response::not_found(),
        StorageError::SecurityViolation(reason) => {
            tracing::warn!(file = name, reason = %reason, "Refused file access");
            Response::forbidden()
        }
        StorageError::Io(e) => {
            tracing::error!(file = name, error = %e, "File storage failed");
            Response::internal_error()
        }
    }
}

#[async_trait]
impl Handler for FilesHandler {
    async fn handle(&self, request: &Request) -> Response {
        match request.method {
            Method::GET => self.get(&request.route_param).await,
            Method::POST => self.post(&request.route_param, &request.body).await,
            _ => Response::method_not_allowed(FILES_ALLOW),
        }
    }
}

impl std::fmt::Debug for FilesHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilesHandler").finish_non_exhaustive()
    }
}
