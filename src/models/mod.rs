pub mod alert;
pub mod market;
pub mod position;
pub mod trade;
pub mod trader;

pub use alert::{Alert, AlertKind};
pub use market::Market;
pub use position::Position;
pub use trade::{NormalizedTrade, TradeRow};
pub use trader::TraderStat;
