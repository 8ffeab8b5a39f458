use std::io;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::{Instrument, info, info_span, warn};

use crate::config::Config;
use crate::http::connection::{Connection, ConnectionSettings};
use crate::routes::{Router, standard_router};

/// Binds the configured address and serves the standard routes forever.
pub async fn run(cfg: &Config) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&cfg.listen_addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    let router = standard_router(cfg.files_dir.as_deref(), cfg.max_body_size as u64);
    serve(listener, Arc::new(router), cfg.connection_settings()).await
}

/// Accepts connections on `listener`, one task per connection.
///
/// The router is shared read-only between tasks. There is no connection
/// limit. A failed accept is logged and retried, so this only returns if the
/// surrounding task is dropped.
pub async fn serve(
    listener: TcpListener,
    router: Arc<Router>,
    settings: ConnectionSettings,
) -> anyhow::Result<()> {
    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                let delay = accept_backoff(&e);
                warn!(error = %e, retry_in = ?delay, "Failed to accept connection");
                tokio::time::sleep(delay).await;
                continue;
            }
        };
        info!("Accepted connection from {}", peer);

        let router = Arc::clone(&router);
        tokio::spawn(
            async move {
                let mut conn = Connection::new(socket, router, settings);
                if let Err(e) = conn.run().await {
                    warn!("Connection error from {}: {}", peer, e);
                }
                tracing::debug!("Connection closed");
            }
            .instrument(info_span!("conn", %peer)),
        );
    }
}

/// How long to pause before accepting again after `err`.
///
/// Errors tied to a single aborted handshake are retried at once; anything
/// else (typically running out of file descriptors) backs off briefly.
fn accept_backoff(err: &io::Error) -> Duration {
    match err.kind() {
        io::ErrorKind::ConnectionAborted
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::Interrupted => Duration::ZERO,
        _ => Duration::from_millis(100),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aborted_handshakes_retry_immediately() {
        let err = io::Error::from(io::ErrorKind::ConnectionAborted);
        assert_eq!(accept_backoff(&err), Duration::ZERO);
    }

    #[test]
    fn resource_exhaustion_backs_off() {
        // EMFILE
        let err = io::Error::from_raw_os_error(24);
        assert_eq!(accept_backoff(&err), Duration::from_millis(100));
    }
}
