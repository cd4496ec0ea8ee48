pub mod market_sync;
pub mod notifier;
pub mod resolution_poller;
pub mod trade_poller;
