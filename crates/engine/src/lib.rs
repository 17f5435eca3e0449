// In crates/engine/src/lib.rs

pub mod bot;
pub mod strategy_factory;
pub mod task;

pub use bot::{CycleReport, MacdDivergenceBot};
pub use strategy_factory::create_bot;
pub use task::{FeedEvent, SessionSummary, TradingTask};

/// Default depth of the feed queue in front of a `TradingTask`.
pub const FEED_QUEUE_CAPACITY: usize = 1024;
