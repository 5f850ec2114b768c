use serde::{
    Deserialize,
    Serialize,
};
use std::collections::{
    BTreeMap,
    HashMap,
};

/// Result of `getblockchaininfo`.
///
/// The fields the dashboard relies on are typed; everything else the node
/// reports is kept in `extra` so it can be passed through to viewers. A
/// `BTreeMap` keeps the serialized key order stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChainInfo {
    pub chain: String,
    pub blocks: u64,
    #[serde(default)]
    pub headers: u64,
    #[serde(default)]
    pub bestblockhash: String,
    pub difficulty: f64,
    #[serde(default)]
    pub mediantime: i64,
    #[serde(default)]
    pub verificationprogress: f64,
    #[serde(default)]
    pub initialblockdownload: bool,
    #[serde(default)]
    pub chainwork: String,
    #[serde(default)]
    pub size_on_disk: u64,
    #[serde(default)]
    pub pruned: bool,
    #[serde(default)]
    pub warnings: Warnings,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Older nodes report a single warning string, v28+ a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Warnings {
    Text(String),
    List(Vec<String>),
}

impl Default for Warnings {
    fn default() -> Self {
        Warnings::Text(String::new())
    }
}

impl Warnings {
    pub fn summary(&self) -> String {
        match self {
            Warnings::Text(text) => text.clone(),
            Warnings::List(list) => list.join("; "),
        }
    }
}

/// Result of `getnetworkinfo`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkInfo {
    pub version: u32,
    #[serde(default)]
    pub subversion: String,
    #[serde(default)]
    pub protocolversion: u32,
    pub connections: u32,
    #[serde(default)]
    pub networks: Vec<NetworkReachability>,
    #[serde(default)]
    pub warnings: Warnings,
}

impl NetworkInfo {
    pub fn is_reachable(&self, network: &str) -> bool {
        self.networks.iter().any(|n| n.name == network && n.reachable)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkReachability {
    pub name: String,
    #[serde(default)]
    pub limited: bool,
    pub reachable: bool,
    #[serde(default)]
    pub proxy: String,
}

/// One entry of `getrawmempool true`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MempoolEntry {
    pub vsize: u64,
    #[serde(default)]
    pub weight: u64,
    #[serde(default)]
    pub time: i64,
    #[serde(default)]
    pub height: u64,
}

pub type MempoolEntries = HashMap<String, MempoolEntry>;

/// Result of `estimatesmartfee`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SmartFeeEstimate {
    /// BTC/kvB
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feerate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    pub blocks: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EstimateMode {
    Economical,
    Conservative,
}

impl EstimateMode {
    /// Name expected by the `estimate_mode` RPC parameter.
    pub fn rpc_name(&self) -> &'static str {
        match self {
            EstimateMode::Economical => "ECONOMICAL",
            EstimateMode::Conservative => "CONSERVATIVE",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EstimateMode::Economical => "economical",
            EstimateMode::Conservative => "conservative",
        }
    }
}
