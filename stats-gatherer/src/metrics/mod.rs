mod fee_estimates;
mod node_stats;

pub use fee_estimates::*;
pub use node_stats::*;
