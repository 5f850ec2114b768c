use node_dashboard_rpc::{
    SmartFeeEstimate,
    FEE_ESTIMATION_DISABLED,
};
use serde::{
    Deserialize,
    Serialize,
};

/// Outcome of one `estimatesmartfee` call.
///
/// On the wire an unavailable estimate keeps the `feerate` key, set to
/// `null`, so viewers can treat both shapes alike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeeEstimate {
    Estimate(SmartFeeEstimate),
    Unavailable { error: String, feerate: Option<f64> },
}

impl FeeEstimate {
    pub fn unavailable(error: impl Into<String>) -> Self {
        FeeEstimate::Unavailable {
            error: error.into(),
            feerate: None,
        }
    }

    pub fn disabled() -> Self {
        Self::unavailable(FEE_ESTIMATION_DISABLED)
    }

    pub fn feerate(&self) -> Option<f64> {
        match self {
            FeeEstimate::Estimate(estimate) => estimate.feerate,
            FeeEstimate::Unavailable { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeEstimates {
    pub economical: FeeEstimate,
    pub conservative: FeeEstimate,
}
