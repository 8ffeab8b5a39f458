use std::sync::Arc;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::http::parser::{Frame, frame_length, parse_http_request};
use crate::http::request::Request;
use crate::http::response::{Response, StatusCode};
use crate::http::writer::ResponseWriter;
use crate::routes::Router;

/// Per-connection limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// How long to wait for the next bytes of a request before closing.
    pub idle_timeout: Duration,
    /// Minimum free space reserved before each read.
    pub read_buffer_size: usize,
    /// Largest request line plus headers the connection will buffer.
    pub max_head_size: usize,
    /// Largest `Content-Length` the connection will wait for.
    pub max_body_size: usize,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(5),
            read_buffer_size: 1024,
            max_head_size: 8 * 1024,
            max_body_size: 10 * 1024 * 1024,
        }
    }
}

pub struct Connection<S> {
    stream: S,
    router: Arc<Router>,
    settings: ConnectionSettings,
    buffer: BytesMut,
    state: ConnectionState,
}

pub enum ConnectionState {
    AwaitingRequest,
    Parsing(Bytes),
    Dispatching(Request),
    Sending {
        writer: ResponseWriter,
        keep_alive: bool,
    },
    Closing,
}

enum ReadOutcome {
    Request(Bytes),
    HeadTooLarge,
    TooLarge(usize),
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, router: Arc<Router>, settings: ConnectionSettings) -> Self {
        Self {
            stream,
            router,
            settings,
            buffer: BytesMut::with_capacity(settings.read_buffer_size),
            state: ConnectionState::AwaitingRequest,
        }
    }

    /// Serves requests until the peer leaves, the idle timeout fires, or a
    /// response closes the connection.
    ///
    /// Transport failures end the loop with an error; nothing more is sent.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            let state = std::mem::replace(&mut self.state, ConnectionState::Closing);

            self.state = match state {
                ConnectionState::AwaitingRequest => match self.read_request().await? {
                    ReadOutcome::Request(bytes) => ConnectionState::Parsing(bytes),
                    ReadOutcome::HeadTooLarge => {
                        warn!(max = self.settings.max_head_size, "Request head too large");
                        Self::rejecting(StatusCode::RequestHeaderFieldsTooLarge)
                    }
                    ReadOutcome::TooLarge(declared) => {
                        let max = self.settings.max_body_size;
                        warn!(declared, max, "Request body too large");
                        Self::rejecting(StatusCode::PayloadTooLarge)
                    }
                    ReadOutcome::Closed => ConnectionState::Closing,
                },

                ConnectionState::Parsing(bytes) => match parse_http_request(&bytes) {
                    Ok(request) => ConnectionState::Dispatching(request),
                    Err(e) => {
                        // The connection stays usable after a bad request.
                        warn!(error = %e, "Invalid request");
                        Self::sending(&Response::bad_request(), None, true)
                    }
                },

                ConnectionState::Dispatching(request) => self.dispatch(request).await,

                ConnectionState::Sending {
                    mut writer,
                    keep_alive,
                } => {
                    writer.write_to_stream(&mut self.stream).await?;

                    if keep_alive {
                        ConnectionState::AwaitingRequest // go back for next request
                    } else {
                        ConnectionState::Closing
                    }
                }

                ConnectionState::Closing => break,
            };
        }

        let _ = self.stream.shutdown().await;
        Ok(())
    }

    fn sending(
        response: &Response,
        accept_encoding: Option<&str>,
        keep_alive: bool,
    ) -> ConnectionState {
        ConnectionState::Sending {
            writer: ResponseWriter::new(response, accept_encoding),
            keep_alive,
        }
    }

    /// Answers with `status` and closes afterwards.
    fn rejecting(status: StatusCode) -> ConnectionState {
        let mut response = Response::empty(status);
        response.close_connection();
        Self::sending(&response, None, false)
    }

    /// Reads until the buffer holds one framed request.
    ///
    /// Leftover bytes from the previous cycle count towards the next request.
    /// If the peer stops sending partway through a request, whatever arrived
    /// is handed on as-is.
    async fn read_request(&mut self) -> anyhow::Result<ReadOutcome> {
        loop {
            match frame_length(
                &self.buffer,
                self.settings.max_head_size,
                self.settings.max_body_size,
            ) {
                Frame::Complete(len) => {
                    return Ok(ReadOutcome::Request(self.buffer.split_to(len).freeze()));
                }
                Frame::HeadTooLarge => return Ok(ReadOutcome::HeadTooLarge),
                Frame::TooLarge(declared) => return Ok(ReadOutcome::TooLarge(declared)),
                Frame::Incomplete if !self.buffer.is_empty() => {
                    debug!(buffered = self.buffer.len(), "Waiting for rest of request");
                }
                Frame::Incomplete => {}
            }

            self.buffer.reserve(self.settings.read_buffer_size);
            let read = timeout(
                self.settings.idle_timeout,
                self.stream.read_buf(&mut self.buffer),
            )
            .await;

            let n = match read {
                Ok(result) => result?,
                Err(_) => {
                    debug!("Idle timeout, closing connection");
                    return Ok(ReadOutcome::Closed);
                }
            };

            if n == 0 {
                if self.buffer.is_empty() {
                    // Client closed connection
                    debug!("Connection closed by peer");
                    return Ok(ReadOutcome::Closed);
                }

                debug!(buffered = self.buffer.len(), "Peer stopped sending mid-request");
                return Ok(ReadOutcome::Request(self.buffer.split().freeze()));
            }

            debug!(bytes = n, "Received data");
        }
    }

    /// Runs the router in its own task so a panicking handler is contained to
    /// this request.
    async fn dispatch(&self, request: Request) -> ConnectionState {
        let keep_alive = request.keep_alive();
        let accept_encoding = request.accept_encoding().map(str::to_owned);
        let method = request.method;
        let path = request.path.clone();

        let router = Arc::clone(&self.router);
        let outcome = tokio::spawn(async move { router.dispatch(&request).await }).await;

        match outcome {
            Ok(mut response) => {
                let keep_alive = keep_alive && !response.closes_connection();
                if !keep_alive {
                    response.close_connection();
                }

                info!(
                    method = %method,
                    path = %path,
                    status = response.status.as_u16(),
                    "Request handled"
                );

                Self::sending(&response, accept_encoding.as_deref(), keep_alive)
            }
            Err(e) => {
                error!(method = %method, path = %path, error = %e, "Handler failed");
                Self::rejecting(StatusCode::InternalServerError)
            }
        }
    }
}
