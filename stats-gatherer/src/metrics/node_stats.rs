use super::FeeEstimates;
use node_dashboard_rpc::ChainInfo;
use serde::{
    Deserialize,
    Serialize,
};

/// One snapshot of the node, produced wholesale by a collector cycle.
///
/// Field order is the wire order. Serializing the same value twice yields
/// identical bytes, which lets the hub encode once and write to every viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStats {
    pub block_height: u64,
    pub connections: u32,
    pub difficulty: f64,
    pub network_hashrate: f64,
    pub mem_pool_size: usize,
    /// Sum of the virtual sizes of all mempool entries.
    pub mem_pool_bytes: u64,
    pub mempool_fee_info: FeeEstimates,
    /// `None` when the chain info query failed for this cycle.
    pub chain_info: Option<ChainInfo>,
    /// RFC 3339, UTC.
    pub last_updated: String,
    pub warnings: String,
    pub version: u32,
    pub onion_reachable: bool,
    pub balance: f64,
}

impl NodeStats {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::FeeEstimate;
    use node_dashboard_rpc::{
        SmartFeeEstimate,
        Warnings,
    };
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn sample() -> NodeStats {
        let mut extra = BTreeMap::new();
        extra.insert("time".to_string(), serde_json::json!(1719000000));
        extra.insert("softforks".to_string(), serde_json::json!({ "taproot": { "active": true } }));

        NodeStats {
            block_height: 850_000,
            connections: 12,
            difficulty: 83_148_355_189_239.77,
            network_hashrate: 6.1e20,
            mem_pool_size: 3,
            mem_pool_bytes: 512,
            mempool_fee_info: FeeEstimates {
                economical: FeeEstimate::disabled(),
                conservative: FeeEstimate::Estimate(SmartFeeEstimate {
                    feerate: Some(0.0001),
                    errors: None,
                    blocks: 2,
                }),
            },
            chain_info: Some(ChainInfo {
                chain: "main".to_string(),
                blocks: 850_000,
                warnings: Warnings::Text(String::new()),
                extra,
                ..Default::default()
            }),
            last_updated: "2024-06-21T20:00:00Z".to_string(),
            warnings: String::new(),
            version: 270000,
            onion_reachable: true,
            balance: 0.5,
        }
    }

    #[test]
    fn serialization_is_reproducible() {
        let stats = sample();
        let first = stats.to_json().unwrap();
        let second = stats.clone().to_json().unwrap();
        assert_eq!(first.as_bytes(), second.as_bytes());
    }

    #[test]
    fn wire_keys_are_camel_case() {
        let json = serde_json::to_value(sample()).unwrap();
        let mut keys = json.as_object().unwrap().keys().cloned().collect::<Vec<_>>();
        keys.sort();
        let mut expected = vec![
            "balance",
            "blockHeight",
            "chainInfo",
            "connections",
            "difficulty",
            "lastUpdated",
            "memPoolBytes",
            "memPoolSize",
            "mempoolFeeInfo",
            "networkHashrate",
            "onionReachable",
            "version",
            "warnings",
        ];
        expected.sort();
        assert_eq!(keys, expected);
    }

    #[test]
    fn missing_chain_info_is_null() {
        let stats = NodeStats {
            chain_info: None,
            ..sample()
        };
        let json = serde_json::to_value(stats).unwrap();
        assert!(json["chainInfo"].is_null());
    }
}
