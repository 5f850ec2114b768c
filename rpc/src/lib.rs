//! # Node RPC
//!
//! The remote data source the dashboard polls. [`NodeApi`] is the query
//! surface the collector depends on; [`BitcoinRpcClient`] implements it on
//! top of the Bitcoin Core JSON-RPC interface.

#[macro_use]
extern crate tracing;

mod client;
mod error;
mod types;

pub use client::{
    BitcoinRpcClient,
    RpcConfig,
};
pub use error::{
    RpcError,
    FEE_ESTIMATION_DISABLED,
};
use std::{
    future::Future,
    pin::Pin,
};
pub use types::*;

pub type RpcFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, RpcError>> + Send + 'a>>;

/// Queries a node for the figures that make up one dashboard snapshot.
pub trait NodeApi: Send + Sync {
    /// `getblockchaininfo`
    fn blockchain_info(&self) -> RpcFuture<'_, ChainInfo>;

    /// `getnetworkinfo`
    fn network_info(&self) -> RpcFuture<'_, NetworkInfo>;

    /// Estimated network hashes per second over the node's default window.
    fn network_hash_ps(&self) -> RpcFuture<'_, f64>;

    /// Wallet balance in BTC across all accounts.
    fn balance(&self) -> RpcFuture<'_, f64>;

    /// `getrawmempool true`, keyed by txid.
    fn raw_mempool_verbose(&self) -> RpcFuture<'_, MempoolEntries>;

    /// Fails with [`RpcError::FeeEstimationDisabled`] when the node runs
    /// without a fee estimator.
    fn estimate_smart_fee(&self, conf_target: u16, mode: EstimateMode) -> RpcFuture<'_, SmartFeeEstimate>;
}
