// In crates/execution/src/types.rs

use chrono::{DateTime, Utc};
use core_types::{MacdParams, OrderRequest, OrderResult, Symbol};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulationSettings {
    /// Reject every Nth order with a nonzero result code (0 disables rejections).
    #[serde(default)]
    pub reject_every: u32,
}

/// A piece of market-data wiring requested at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subscription {
    QuoteTicks(Symbol),
    HistoryWindow { symbol: Symbol, since: DateTime<Utc> },
    Indicator(MacdParams),
}

/// An order the host received, with the result code it answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRecord {
    pub order: OrderRequest,
    pub result: OrderResult,
}
