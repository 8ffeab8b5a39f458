//! Request routing.
//!
//! The first path segment picks a [`Handler`]; the rest of the path is handed
//! to it untouched as `route_param`.
//!
//! | Route            | Handler            |
//! |------------------|--------------------|
//! | `/`              | [`RootHandler`]    |
//! | `/echo/<text>`   | [`EchoHandler`]    |
//! | `/user-agent`    | [`UserAgentHandler`] |
//! | `/files/<name>`  | [`FilesHandler`]   |

pub mod handlers;
pub mod resolver;
pub mod router;

use std::path::Path;
use std::sync::Arc;

pub use handlers::{EchoHandler, FilesHandler, RootHandler, UserAgentHandler};
pub use router::{Handler, Router};

use crate::storage::FileStore;

/// Builds the route table the server ships with.
///
/// `/files` is only registered when `files_dir` names an existing directory;
/// otherwise that route falls through to 404.
pub fn standard_router(files_dir: Option<&Path>, max_file_size: u64) -> Router {
    let mut router = Router::new()
        .route("", RootHandler)
        .route("echo", EchoHandler)
        .route("user-agent", UserAgentHandler);

    match files_dir.map(|dir| FileStore::with_max_file_size(dir, max_file_size)) {
        Some(Ok(store)) => {
            tracing::info!(root = %store.root().display(), "Serving files");
            router.register("files", FilesHandler::new(Arc::new(store)));
        }
        Some(Err(e)) => {
            tracing::warn!(error = %e, "File handler not available, /files will return 404");
        }
        None => {
            tracing::info!("No files directory configured, /files will return 404");
        }
    }

    router
}
