// In crates/execution/src/lib.rs

use chrono::{DateTime, Utc};
use core_types::{MacdParams, OrderRequest, OrderResult, OscillatorReading, Position, Symbol};

pub mod dispatcher;
pub mod error;
pub mod simulated;
pub mod types;

// Re-export public types
pub use dispatcher::{DispatchOutcome, OrderDispatcher};
pub use error::{Error, Result};
pub use simulated::SimulatedHost;
pub use types::SimulationSettings;

/// The running side of the external trading host.
///
/// The host owns the book, computes the indicator and routes orders. The strategy only sees
/// it through this interface, one synchronous call at a time.
pub trait TradingHost {
    /// The name of the host (e.g., "SimulatedHost").
    fn name(&self) -> &'static str;

    /// The positions owned by this strategy instance, each with a signed quantity.
    fn own_positions(&self) -> Vec<Position>;

    /// The most recent oscillator output, or `None` while the indicator is warming up.
    fn latest_reading(&self) -> Option<OscillatorReading>;

    /// Places a market order and returns the host's result code. Zero means accepted.
    fn place_market_order(&mut self, order: &OrderRequest) -> OrderResult;

    /// Liquidates every position this strategy owns.
    fn close_own_positions(&mut self);

    /// Shows a status line to the user. Best-effort.
    fn set_status_message(&mut self, text: &str);
}

/// The construction-time side of the host: market data and indicator wiring.
pub trait HostInitializer {
    /// Subscribes the live quote-tick stream for `symbol`.
    fn subscribe_quote_ticks(&mut self, symbol: &Symbol) -> Result<()>;

    /// Feeds the indicator with history for `symbol` starting at `since`.
    fn use_history_window(&mut self, symbol: &Symbol, since: DateTime<Utc>) -> Result<()>;

    /// Subscribes the MACD oscillator the strategy reads every cycle.
    fn subscribe_indicator(&mut self, params: MacdParams) -> Result<()>;
}

/// A host whose indicator values are pushed in from outside, such as a paper venue fed
/// from a file.
pub trait ReadingSink {
    fn publish_reading(&mut self, reading: Option<OscillatorReading>);
}
