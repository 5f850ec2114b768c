//! HTTP surface of the dashboard: the stats endpoint, the websocket feed and
//! the static page.

#[macro_use]
extern crate tracing;

pub mod error;
pub mod router;
pub mod server;
mod stats;
mod ws;

pub use router::create_router;
pub use server::{
    serve,
    start_server,
    TlsFiles,
};
pub use ws::WebSocketSink;
