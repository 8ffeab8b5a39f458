//! HTTP protocol implementation.
//!
//! This module implements the HTTP/1.1 subset the server speaks: one request
//! in flight per connection, persistent connections by default, optional gzip
//! response bodies.
//!
//! # Architecture
//!
//! - **`connection`**: The per-connection request-response state machine
//! - **`parser`**: Parses and frames incoming requests from byte buffers
//! - **`request`**: HTTP request representation
//! - **`response`**: HTTP response representation with builder pattern
//! - **`encoding`**: `Accept-Encoding` negotiation and gzip
//! - **`writer`**: Serializes and writes HTTP responses to the client
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌──────────────────┐
//!   ┌───▶│ AwaitingRequest  │ ← Wait for bytes (idle timeout armed)
//!   │    └──────┬───────────┘
//!   │           │ Request framed          (EOF / timeout → Closing)
//!   │           ▼
//!   │    ┌──────────────────┐
//!   │    │     Parsing      │ ── parse error → Sending(400, keep-alive)
//!   │    └──────┬───────────┘
//!   │           ▼
//!   │    ┌──────────────────┐
//!   │    │   Dispatching    │ ← Router picks a handler (panic → 500, close)
//!   │    └──────┬───────────┘
//!   │           ▼
//!   │    ┌──────────────────┐
//!   │    │     Sending      │ ← Serialize, compress, write
//!   │    └──────┬───────────┘
//!   │           ├─ Connection: close → Closing
//!   └───────────┘  otherwise
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use courier::http::connection::{Connection, ConnectionSettings};
//! use courier::routes::standard_router;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let listener = TcpListener::bind("127.0.0.1:4221").await?;
//!     let router = Arc::new(standard_router(None, 1024));
//!
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         let router = Arc::clone(&router);
//!         tokio::spawn(async move {
//!             let mut conn = Connection::new(socket, router, ConnectionSettings::default());
//!             if let Err(e) = conn.run().await {
//!                 eprintln!("Connection error: {}", e);
//!             }
//!         });
//!     }
//! }
//! ```

pub mod connection;
pub mod encoding;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
