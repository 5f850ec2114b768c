//! # Node Stats Gatherer
//!
//! Periodically polls a Bitcoin Core node and fans the resulting statistics
//! out to connected dashboard viewers.
//!
//! ## Architecture
//!
//! - **`metrics`**: [`NodeStats`], the snapshot produced by one collection
//!   cycle, and its fee estimate payloads
//! - **`hub`**: [`Hub`], caching the latest snapshot and broadcasting it to
//!   every registered [`SnapshotSink`]
//! - **`collector`**: [`Collector`], the timer driven loop that queries a
//!   [`node_dashboard_rpc::NodeApi`] and publishes to the hub
//!
//! Control only flows one way: collector → hub → subscribers. The hub never
//! calls back into the collector.

#[macro_use]
extern crate tracing;

pub mod collector;
pub mod hub;
pub mod metrics;

#[cfg(test)]
mod testing;

pub use collector::{
    Collector,
    CollectorHandle,
    CollectorState,
};
pub use hub::{
    Hub,
    Payload,
    SinkFuture,
    SnapshotSink,
};
pub use metrics::*;
