//! Fakes shared by the unit tests of this crate.

use crate::{
    hub::{
        Payload,
        SinkFuture,
        SnapshotSink,
    },
    metrics::{
        FeeEstimate,
        FeeEstimates,
        NodeStats,
    },
};
use eyre::eyre;
use node_dashboard_rpc::{
    ChainInfo,
    EstimateMode,
    MempoolEntries,
    MempoolEntry,
    NetworkInfo,
    NetworkReachability,
    NodeApi,
    RpcError,
    RpcFuture,
    SmartFeeEstimate,
    Warnings,
};
use parking_lot::Mutex;
use std::{
    sync::{
        atomic::{
            AtomicUsize,
            Ordering,
        },
        Arc,
    },
    time::Duration,
};

pub fn sample_stats(block_height: u64) -> NodeStats {
    NodeStats {
        block_height,
        connections: 8,
        difficulty: 1.0,
        network_hashrate: 0.0,
        mem_pool_size: 0,
        mem_pool_bytes: 0,
        mempool_fee_info: FeeEstimates {
            economical: FeeEstimate::disabled(),
            conservative: FeeEstimate::disabled(),
        },
        chain_info: None,
        last_updated: "2024-06-21T20:00:00Z".to_string(),
        warnings: String::new(),
        version: 270000,
        onion_reachable: false,
        balance: 0.0,
    }
}

#[derive(Default)]
struct Recorded {
    messages: Mutex<Vec<Payload>>,
    closes: AtomicUsize,
}

/// Collects every payload written to it.
pub struct RecordingSink(Arc<Recorded>);

#[derive(Clone)]
pub struct RecordingHandle(Arc<Recorded>);

impl RecordingSink {
    pub fn new() -> (Self, RecordingHandle) {
        let recorded = Arc::new(Recorded::default());
        (Self(recorded.clone()), RecordingHandle(recorded))
    }
}

impl RecordingHandle {
    pub fn messages(&self) -> Vec<Payload> {
        self.0.messages.lock().clone()
    }

    pub fn closes(&self) -> usize {
        self.0.closes.load(Ordering::SeqCst)
    }
}

impl SnapshotSink for RecordingSink {
    fn send(&mut self, payload: Payload) -> SinkFuture<'_> {
        self.0.messages.lock().push(payload);
        Box::pin(async { Ok(()) })
    }

    fn close(&mut self) -> SinkFuture<'_> {
        self.0.closes.fetch_add(1, Ordering::SeqCst);
        Box::pin(async { Ok(()) })
    }
}

#[derive(Default)]
struct Attempts {
    sends: AtomicUsize,
    closes: AtomicUsize,
}

/// Rejects every write, like a peer that went away.
pub struct FailingSink(Arc<Attempts>);

#[derive(Clone)]
pub struct AttemptsHandle(Arc<Attempts>);

impl FailingSink {
    pub fn new() -> (Self, AttemptsHandle) {
        let attempts = Arc::new(Attempts::default());
        (Self(attempts.clone()), AttemptsHandle(attempts))
    }
}

impl AttemptsHandle {
    pub fn sends(&self) -> usize {
        self.0.sends.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.0.closes.load(Ordering::SeqCst)
    }
}

impl SnapshotSink for FailingSink {
    fn send(&mut self, _payload: Payload) -> SinkFuture<'_> {
        self.0.sends.fetch_add(1, Ordering::SeqCst);
        Box::pin(async { Err(eyre!("broken pipe")) })
    }

    fn close(&mut self) -> SinkFuture<'_> {
        self.0.closes.fetch_add(1, Ordering::SeqCst);
        Box::pin(async { Ok(()) })
    }
}

/// Never completes a write.
pub struct StallingSink;

impl SnapshotSink for StallingSink {
    fn send(&mut self, _payload: Payload) -> SinkFuture<'_> {
        Box::pin(futures::future::pending())
    }

    fn close(&mut self) -> SinkFuture<'_> {
        Box::pin(async { Ok(()) })
    }
}

/// A peer that stopped reading: neither writes nor the close handshake ever
/// complete.
pub struct DeadSink;

impl SnapshotSink for DeadSink {
    fn send(&mut self, _payload: Payload) -> SinkFuture<'_> {
        Box::pin(futures::future::pending())
    }

    fn close(&mut self) -> SinkFuture<'_> {
        Box::pin(futures::future::pending())
    }
}

/// Scripted node answering from fixed values.
pub struct FakeNode {
    pub chain_info: Option<ChainInfo>,
    pub network_info: Option<NetworkInfo>,
    pub hash_ps: Option<f64>,
    pub balance: Option<f64>,
    pub mempool: Option<MempoolEntries>,
    pub economical: FeeAnswer,
    pub conservative: FeeAnswer,
    /// Delay applied to `getblockchaininfo`, the first query of a cycle.
    pub latency: Duration,
    pub calls: Arc<AtomicUsize>,
    pub in_flight: Arc<AtomicUsize>,
    pub max_in_flight: Arc<AtomicUsize>,
}

#[derive(Clone)]
pub enum FeeAnswer {
    Estimate(SmartFeeEstimate),
    Disabled,
    Failed(String),
}

impl FakeNode {
    pub fn healthy() -> Self {
        let mut mempool = MempoolEntries::new();
        mempool.insert("aa".to_string(), MempoolEntry { vsize: 200, ..Default::default() });
        mempool.insert("bb".to_string(), MempoolEntry { vsize: 141, ..Default::default() });

        Self {
            chain_info: Some(ChainInfo {
                chain: "main".to_string(),
                blocks: 850_000,
                difficulty: 83_148_355_189_239.77,
                warnings: Warnings::List(vec!["a".to_string(), "b".to_string()]),
                ..Default::default()
            }),
            network_info: Some(NetworkInfo {
                version: 270000,
                connections: 10,
                networks: vec![NetworkReachability {
                    name: "onion".to_string(),
                    reachable: true,
                    ..Default::default()
                }],
                ..Default::default()
            }),
            hash_ps: Some(6.1e20),
            balance: Some(0.25),
            mempool: Some(mempool),
            economical: FeeAnswer::Estimate(SmartFeeEstimate {
                feerate: Some(0.0002),
                errors: None,
                blocks: 2,
            }),
            conservative: FeeAnswer::Estimate(SmartFeeEstimate {
                feerate: Some(0.0003),
                errors: None,
                blocks: 2,
            }),
            latency: Duration::ZERO,
            calls: Default::default(),
            in_flight: Default::default(),
            max_in_flight: Default::default(),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            chain_info: None,
            network_info: None,
            hash_ps: None,
            balance: None,
            mempool: None,
            economical: FeeAnswer::Failed("connection refused".to_string()),
            conservative: FeeAnswer::Failed("connection refused".to_string()),
            ..Self::healthy()
        }
    }

    fn answer<T: Clone + Send + 'static>(value: &Option<T>) -> RpcFuture<'static, T> {
        let result = value.clone().ok_or_else(|| RpcError::Rpc {
            code: -1,
            message: "connection refused".to_string(),
        });
        Box::pin(async move { result })
    }
}

impl NodeApi for FakeNode {
    fn blockchain_info(&self) -> RpcFuture<'_, ChainInfo> {
        let result = Self::answer(&self.chain_info);
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            result.await
        })
    }

    fn network_info(&self) -> RpcFuture<'_, NetworkInfo> {
        Self::answer(&self.network_info)
    }

    fn network_hash_ps(&self) -> RpcFuture<'_, f64> {
        Self::answer(&self.hash_ps)
    }

    fn balance(&self) -> RpcFuture<'_, f64> {
        Self::answer(&self.balance)
    }

    fn raw_mempool_verbose(&self) -> RpcFuture<'_, MempoolEntries> {
        Self::answer(&self.mempool)
    }

    fn estimate_smart_fee(&self, _conf_target: u16, mode: EstimateMode) -> RpcFuture<'_, SmartFeeEstimate> {
        let answer = match mode {
            EstimateMode::Economical => self.economical.clone(),
            EstimateMode::Conservative => self.conservative.clone(),
        };
        Box::pin(async move {
            match answer {
                FeeAnswer::Estimate(estimate) => Ok(estimate),
                FeeAnswer::Disabled => Err(RpcError::FeeEstimationDisabled),
                FeeAnswer::Failed(message) => Err(RpcError::Rpc { code: -1, message }),
            }
        })
    }
}
