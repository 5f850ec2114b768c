/// Message Bitcoin Core uses when estimatesmartfee is unavailable.
pub const FEE_ESTIMATION_DISABLED: &str = "Fee estimation disabled";

#[derive(thiserror::Error, Debug)]
pub enum RpcError {
    #[error("Invalid RPC endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
    #[error("RPC transport failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("RPC server answered with HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("{}", FEE_ESTIMATION_DISABLED)]
    FeeEstimationDisabled,
    #[error("Malformed RPC response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("RPC call `{0}` returned no result")]
    MissingResult(String),
}

impl RpcError {
    /// Maps a generic RPC error into [`RpcError::FeeEstimationDisabled`] when
    /// the node reports its estimator is switched off.
    pub(crate) fn classify_fee_error(self) -> Self {
        match self {
            RpcError::Rpc { ref message, .. } if message.contains(FEE_ESTIMATION_DISABLED) => {
                RpcError::FeeEstimationDisabled
            }
            other => other,
        }
    }
}
