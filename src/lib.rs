//! Courier - minimal HTTP/1.1 server
//!
//! Core library: wire parsing, routing, response serialization and the
//! per-connection keep-alive loop.

pub mod config;
pub mod http;
pub mod routes;
pub mod server;
pub mod storage;
