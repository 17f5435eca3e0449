// In crates/execution/src/simulated.rs

use crate::types::{OrderRecord, SimulationSettings, Subscription};
use crate::{HostInitializer, ReadingSink, Result, TradingHost};
use chrono::{DateTime, Utc};
use core_types::{
    MacdParams, OrderRequest, OrderResult, OrderSide, OscillatorReading, Position, Symbol,
};

/// Result code the paper venue answers with when it refuses an order.
pub const REJECTED: OrderResult = OrderResult(1);

/// An in-memory paper venue.
///
/// Orders fill immediately at market. A buy first reduces an open short position and
/// otherwise opens a new long one; a sell mirrors that. Everything the strategy asks of the
/// host is recorded so a session can be inspected afterwards.
#[derive(Debug)]
pub struct SimulatedHost {
    settings: SimulationSettings,
    accepting: bool,
    positions: Vec<Position>,
    reading: Option<OscillatorReading>,
    orders: Vec<OrderRecord>,
    status_messages: Vec<String>,
    subscriptions: Vec<Subscription>,
}

impl SimulatedHost {
    pub fn new(settings: SimulationSettings) -> Self {
        Self {
            settings,
            accepting: true,
            positions: Vec::new(),
            reading: None,
            orders: Vec::new(),
            status_messages: Vec::new(),
            subscriptions: Vec::new(),
        }
    }

    /// Replaces the book, as if positions had changed outside the strategy.
    pub fn set_positions(&mut self, positions: Vec<Position>) {
        self.positions = positions;
    }

    /// When false, every order is rejected.
    pub fn set_accepting(&mut self, accepting: bool) {
        self.accepting = accepting;
    }

    pub fn orders(&self) -> &[OrderRecord] {
        &self.orders
    }

    pub fn status_messages(&self) -> &[String] {
        &self.status_messages
    }

    pub fn subscriptions(&self) -> &[Subscription] {
        &self.subscriptions
    }

    fn decide_result(&self) -> OrderResult {
        let sequence = self.orders.len() as u64 + 1;
        let every = u64::from(self.settings.reject_every);
        if !self.accepting || (every > 0 && sequence % every == 0) {
            REJECTED
        } else {
            OrderResult::ACCEPTED
        }
    }

    fn fill(&mut self, order: &OrderRequest) {
        let signed = match order.side {
            OrderSide::Buy => i64::from(order.quantity),
            OrderSide::Sell => -i64::from(order.quantity),
        };

        // Net against the first position on the opposite side, if there is one.
        let opposite = self
            .positions
            .iter()
            .position(|p| p.quantity != 0 && p.quantity.signum() == -signed.signum());
        match opposite {
            Some(index) => {
                self.positions[index].quantity += signed;
                if self.positions[index].quantity == 0 {
                    self.positions.remove(index);
                }
            }
            None => self.positions.push(Position::new(signed)),
        }
    }
}

impl TradingHost for SimulatedHost {
    fn name(&self) -> &'static str {
        "SimulatedHost"
    }

    fn own_positions(&self) -> Vec<Position> {
        self.positions.clone()
    }

    fn latest_reading(&self) -> Option<OscillatorReading> {
        self.reading
    }

    fn place_market_order(&mut self, order: &OrderRequest) -> OrderResult {
        let result = self.decide_result();
        if result.is_accepted() {
            self.fill(order);
        }
        tracing::debug!(?order, code = result.code(), "Simulated order handled.");
        self.orders.push(OrderRecord {
            order: order.clone(),
            result,
        });
        result
    }

    fn close_own_positions(&mut self) {
        tracing::info!(count = self.positions.len(), "Liquidating all owned positions.");
        self.positions.clear();
    }

    fn set_status_message(&mut self, text: &str) {
        self.status_messages.push(text.to_string());
    }
}

impl ReadingSink for SimulatedHost {
    fn publish_reading(&mut self, reading: Option<OscillatorReading>) {
        self.reading = reading;
    }
}

impl HostInitializer for SimulatedHost {
    fn subscribe_quote_ticks(&mut self, symbol: &Symbol) -> Result<()> {
        self.subscriptions
            .push(Subscription::QuoteTicks(symbol.clone()));
        Ok(())
    }

    fn use_history_window(&mut self, symbol: &Symbol, since: DateTime<Utc>) -> Result<()> {
        self.subscriptions.push(Subscription::HistoryWindow {
            symbol: symbol.clone(),
            since,
        });
        Ok(())
    }

    fn subscribe_indicator(&mut self, params: MacdParams) -> Result<()> {
        self.subscriptions.push(Subscription::Indicator(params));
        Ok(())
    }
}
