use crate::{
    error::RpcError,
    ChainInfo,
    EstimateMode,
    MempoolEntries,
    NetworkInfo,
    NodeApi,
    RpcFuture,
    SmartFeeEstimate,
};
use serde::{
    de::DeserializeOwned,
    Deserialize,
};
use std::{
    fmt,
    sync::atomic::{
        AtomicU64,
        Ordering,
    },
    time::Duration,
};
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for a Bitcoin Core RPC endpoint.
#[derive(Clone)]
pub struct RpcConfig {
    /// `host:port`, without scheme.
    pub host: String,
    pub user: String,
    pub password: String,
    pub use_https: bool,
}

impl fmt::Debug for RpcConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcConfig")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("use_https", &self.use_https)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: serde_json::Value,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// JSON-RPC client speaking to `bitcoind` over HTTP POST.
pub struct BitcoinRpcClient {
    http: reqwest::Client,
    endpoint: Url,
    user: String,
    password: String,
    next_id: AtomicU64,
}

impl fmt::Debug for BitcoinRpcClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitcoinRpcClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

impl BitcoinRpcClient {
    pub fn new(config: RpcConfig) -> Result<Self, RpcError> {
        let scheme = if config.use_https { "https" } else { "http" };
        let endpoint = Url::parse(&format!("{scheme}://{}/", config.host))?;
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            http,
            endpoint,
            user: config.user,
            password: config.password,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Checks that the node is reachable and the credentials are accepted.
    pub async fn probe(&self) -> Result<ChainInfo, RpcError> {
        self.call("getblockchaininfo", serde_json::json!([])).await
    }

    pub async fn call<T: DeserializeOwned>(&self, method: &str, params: serde_json::Value) -> Result<T, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = serde_json::json!({
            "jsonrpc": "1.0",
            "id": id,
            "method": method,
            "params": params,
        });

        trace!(id, method, "RPC request");

        let response = self
            .http
            .post(self.endpoint.clone())
            .basic_auth(&self.user, Some(&self.password))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        // bitcoind reports RPC level failures with a 4xx/5xx status and a JSON
        // body, so the body is decoded before the status is looked at.
        let envelope: RpcResponse = match serde_json::from_slice(&bytes) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(RpcError::Status {
                    status: status.as_u16(),
                    body: String::from_utf8_lossy(&bytes).trim().to_string(),
                });
            }
            Err(e) => return Err(RpcError::Decode(e)),
        };

        if let Some(error) = envelope.error {
            return Err(RpcError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        if envelope.result.is_null() {
            return Err(RpcError::MissingResult(method.to_string()));
        }

        Ok(serde_json::from_value(envelope.result)?)
    }
}

impl NodeApi for BitcoinRpcClient {
    fn blockchain_info(&self) -> RpcFuture<'_, ChainInfo> {
        Box::pin(self.call("getblockchaininfo", serde_json::json!([])))
    }

    fn network_info(&self) -> RpcFuture<'_, NetworkInfo> {
        Box::pin(self.call("getnetworkinfo", serde_json::json!([])))
    }

    fn network_hash_ps(&self) -> RpcFuture<'_, f64> {
        Box::pin(self.call("getnetworkhashps", serde_json::json!([])))
    }

    fn balance(&self) -> RpcFuture<'_, f64> {
        Box::pin(self.call("getbalance", serde_json::json!(["*"])))
    }

    fn raw_mempool_verbose(&self) -> RpcFuture<'_, MempoolEntries> {
        Box::pin(self.call("getrawmempool", serde_json::json!([true])))
    }

    fn estimate_smart_fee(&self, conf_target: u16, mode: EstimateMode) -> RpcFuture<'_, SmartFeeEstimate> {
        Box::pin(async move {
            self.call("estimatesmartfee", serde_json::json!([conf_target, mode.rpc_name()]))
                .await
                .map_err(RpcError::classify_fee_error)
        })
    }
}
