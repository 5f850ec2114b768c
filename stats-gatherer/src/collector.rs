//! # Collector
//!
//! Polls the node on a fixed interval, assembles a [`NodeStats`] snapshot per
//! cycle and hands it to the [`Hub`].
//!
//! The loop is a small state machine published through a watch channel:
//!
//! ```text
//! Idle -> Fetching -> Waiting -> Fetching -> ... -> Stopped
//! ```
//!
//! Cycles never overlap. A cycle that runs longer than the interval delays the
//! next tick instead of starting a second fetch.

use crate::{
    hub::Hub,
    metrics::{
        FeeEstimate,
        FeeEstimates,
        NodeStats,
    },
};
use chrono::{
    SecondsFormat,
    Utc,
};
use node_dashboard_rpc::{
    EstimateMode,
    NodeApi,
    RpcError,
};
use std::{
    sync::Arc,
    time::Duration,
};
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::MissedTickBehavior,
};
use tokio_util::sync::CancellationToken;

/// Confirmation target used for both fee estimation modes.
pub const FEE_CONF_TARGET: u16 = 2;

const MIN_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollectorState {
    #[default]
    Idle,
    Fetching,
    Waiting,
    Stopped,
}

/// Produces snapshots from a [`NodeApi`] and publishes them to a [`Hub`].
pub struct Collector<S> {
    source: S,
    hub: Arc<Hub>,
}

/// Owns the running collector loop. Dropping the handle does not stop the
/// loop; call [`CollectorHandle::stop`].
#[derive(Debug)]
pub struct CollectorHandle {
    cancel: CancellationToken,
    state: watch::Receiver<CollectorState>,
    task: JoinHandle<()>,
}

impl CollectorHandle {
    /// Signals the loop to stop without waiting for it. Safe to call any
    /// number of times.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn state(&self) -> watch::Receiver<CollectorState> {
        self.state.clone()
    }

    /// Stops the loop and waits until it has exited. No snapshot is published
    /// after this returns.
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            error!("Collector task failed: {e}");
        }
    }
}

impl<S> Collector<S>
where
    S: NodeApi + 'static,
{
    pub fn new(source: S, hub: Arc<Hub>) -> Self {
        Self { source, hub }
    }

    /// Runs one cycle right away, then one per `interval`, on a background
    /// task.
    pub fn start(self, interval: Duration) -> CollectorHandle {
        let interval = if interval < MIN_INTERVAL {
            warn!(?interval, "Collector interval too small, using {:?}", MIN_INTERVAL);
            MIN_INTERVAL
        } else {
            interval
        };

        let cancel = CancellationToken::new();
        let (state_sender, state) = watch::channel(CollectorState::Idle);
        let task = tokio::spawn(self.run(interval, cancel.clone(), state_sender));

        CollectorHandle { cancel, state, task }
    }

    async fn run(self, interval: Duration, cancel: CancellationToken, state: watch::Sender<CollectorState>) {
        info!(?interval, "Node stats collector started");

        // The first tick completes immediately.
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            state.send_replace(CollectorState::Fetching);
            let stats = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("Collector stopped during a fetch, discarding the cycle");
                    break;
                }
                stats = self.collect_once() => stats,
            };

            debug!(
                block_height = stats.block_height,
                economical_feerate = ?stats.mempool_fee_info.economical.feerate(),
                conservative_feerate = ?stats.mempool_fee_info.conservative.feerate(),
                "Publishing node stats"
            );
            self.hub.update(stats).await;
            state.send_replace(CollectorState::Waiting);
        }

        state.send_replace(CollectorState::Stopped);
        info!("Node stats collector stopping");
    }

    /// Queries every metric and builds one snapshot.
    ///
    /// A failed query is logged and leaves its fields at zero; it never fails
    /// the whole cycle.
    pub async fn collect_once(&self) -> NodeStats {
        let (chain_info, network_info, hash_ps, balance, mempool, economical, conservative) = tokio::join!(
            self.source.blockchain_info(),
            self.source.network_info(),
            self.source.network_hash_ps(),
            self.source.balance(),
            self.source.raw_mempool_verbose(),
            self.fee_estimate(EstimateMode::Economical),
            self.fee_estimate(EstimateMode::Conservative),
        );

        let chain_info = chain_info
            .inspect_err(|e| warn!("Error getting blockchain info: {e}"))
            .ok();
        let (block_height, difficulty, warnings) = chain_info
            .as_ref()
            .map(|info| (info.blocks, info.difficulty, info.warnings.summary()))
            .unwrap_or_default();

        let (connections, version, onion_reachable) = match network_info {
            Ok(info) => (info.connections, info.version, info.is_reachable("onion")),
            Err(e) => {
                warn!("Error getting network info: {e}");
                Default::default()
            }
        };

        let network_hashrate = hash_ps
            .inspect_err(|e| warn!("Error getting network hashrate: {e}"))
            .unwrap_or_default();

        let balance = balance
            .inspect_err(|e| warn!("Error getting wallet balance: {e}"))
            .unwrap_or_default();

        let (mem_pool_size, mem_pool_bytes) = match mempool {
            Ok(entries) => (entries.len(), entries.values().map(|entry| entry.vsize).sum::<u64>()),
            Err(e) => {
                warn!("Error getting mempool info: {e}");
                (0, 0)
            }
        };

        NodeStats {
            block_height,
            connections,
            difficulty,
            network_hashrate,
            mem_pool_size,
            mem_pool_bytes,
            mempool_fee_info: FeeEstimates {
                economical,
                conservative,
            },
            chain_info,
            last_updated: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            warnings,
            version,
            onion_reachable,
            balance,
        }
    }

    async fn fee_estimate(&self, mode: EstimateMode) -> FeeEstimate {
        match self.source.estimate_smart_fee(FEE_CONF_TARGET, mode).await {
            Ok(estimate) => FeeEstimate::Estimate(estimate),
            Err(RpcError::FeeEstimationDisabled) => {
                debug!(mode = mode.as_str(), "Fee estimation is disabled on this node");
                FeeEstimate::disabled()
            }
            Err(e) => {
                warn!(mode = mode.as_str(), "Error getting fee estimate: {e}");
                FeeEstimate::unavailable(e.to_string())
            }
        }
    }
}
