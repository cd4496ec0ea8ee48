pub mod alerts;
pub mod ledger;
pub mod normalizer;
pub mod settlement;

pub use ledger::{apply_trade, AppliedTrade, ApplyOutcome};
pub use normalizer::normalize_trade;
pub use settlement::{settle_market, SettlementOutcome};
