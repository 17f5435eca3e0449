// In crates/execution/src/dispatcher.rs

use crate::TradingHost;
use core_types::{Clock, OrderDuration, OrderRequest, Side, Symbol};
use strategies::position_tracker::compute_exposure;
use strategies::{Action, EntryTimestamps};

/// What happened to one requested order action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The host accepted the order.
    Accepted,
    /// The host answered with a nonzero result code.
    Rejected(i32),
    /// A close was requested but the side was already flat; nothing was sent.
    Skipped,
}

/// Turns order actions into day-duration market orders of the configured size.
///
/// The only state the dispatcher touches is the caller's `EntryTimestamps`, and only after
/// an accepted open. Rejections leave everything as it was, so the next cycle re-evaluates
/// from scratch.
#[derive(Debug, Clone)]
pub struct OrderDispatcher {
    symbol: Symbol,
    trade_size: u32,
}

impl OrderDispatcher {
    pub fn new(symbol: Symbol, trade_size: u32) -> Self {
        Self { symbol, trade_size }
    }

    fn market_order(&self, side: core_types::OrderSide) -> OrderRequest {
        OrderRequest {
            symbol: self.symbol.clone(),
            side,
            quantity: self.trade_size,
            duration: OrderDuration::Day,
        }
    }

    pub fn dispatch(
        &self,
        action: Action,
        host: &mut dyn TradingHost,
        clock: &dyn Clock,
        entries: &mut EntryTimestamps,
    ) -> DispatchOutcome {
        if action.is_open() {
            self.open(action.side(), host, clock, entries)
        } else {
            self.close(action.side(), host)
        }
    }

    pub fn open_long(
        &self,
        host: &mut dyn TradingHost,
        clock: &dyn Clock,
        entries: &mut EntryTimestamps,
    ) -> DispatchOutcome {
        self.open(Side::Long, host, clock, entries)
    }

    pub fn open_short(
        &self,
        host: &mut dyn TradingHost,
        clock: &dyn Clock,
        entries: &mut EntryTimestamps,
    ) -> DispatchOutcome {
        self.open(Side::Short, host, clock, entries)
    }

    pub fn close_long(&self, host: &mut dyn TradingHost) -> DispatchOutcome {
        self.close(Side::Long, host)
    }

    pub fn close_short(&self, host: &mut dyn TradingHost) -> DispatchOutcome {
        self.close(Side::Short, host)
    }

    fn open(
        &self,
        side: Side,
        host: &mut dyn TradingHost,
        clock: &dyn Clock,
        entries: &mut EntryTimestamps,
    ) -> DispatchOutcome {
        let order = self.market_order(side.opening_order());
        let result = host.place_market_order(&order);
        if !result.is_accepted() {
            return DispatchOutcome::Rejected(result.code());
        }

        let accepted_at = clock.now();
        entries.record(side, accepted_at);
        tracing::debug!(symbol = %self.symbol, ?side, %accepted_at, "Recorded entry time.");
        DispatchOutcome::Accepted
    }

    fn close(&self, side: Side, host: &mut dyn TradingHost) -> DispatchOutcome {
        // Exposure may have changed out-of-band since the decision was made.
        if !compute_exposure(&host.own_positions()).has(side) {
            tracing::debug!(symbol = %self.symbol, ?side, "Nothing left to close.");
            return DispatchOutcome::Skipped;
        }

        let order = self.market_order(side.closing_order());
        let result = host.place_market_order(&order);
        if result.is_accepted() {
            DispatchOutcome::Accepted
        } else {
            DispatchOutcome::Rejected(result.code())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SimulatedHost, SimulationSettings};
    use chrono::{Duration, TimeZone, Utc};
    use core_types::{ManualClock, OrderSide, Position};

    fn dispatcher() -> OrderDispatcher {
        OrderDispatcher::new(Symbol("EURUSD".to_string()), 1_000)
    }

    fn clock() -> ManualClock {
        ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap())
    }

    #[test]
    fn accepted_open_records_the_entry_time() {
        let mut host = SimulatedHost::new(SimulationSettings::default());
        let clock = clock();
        let mut entries = EntryTimestamps::default();

        let outcome = dispatcher().open_short(&mut host, &clock, &mut entries);

        assert_eq!(outcome, DispatchOutcome::Accepted);
        assert_eq!(entries.short, Some(clock.now()));
        assert_eq!(entries.long, None);
        let sent = &host.orders()[0].order;
        assert_eq!(sent.side, OrderSide::Sell);
        assert_eq!(sent.quantity, 1_000);
        assert_eq!(sent.duration, OrderDuration::Day);
        assert_eq!(host.own_positions(), vec![Position::new(-1_000)]);
    }

    #[test]
    fn rejected_open_leaves_entry_time_untouched() {
        let mut host = SimulatedHost::new(SimulationSettings::default());
        host.set_accepting(false);
        let clock = clock();
        let earlier = clock.now() - Duration::hours(3);
        let mut entries = EntryTimestamps { long: Some(earlier), short: None };

        let outcome = dispatcher().open_long(&mut host, &clock, &mut entries);

        assert!(matches!(outcome, DispatchOutcome::Rejected(code) if code != 0));
        assert_eq!(entries.long, Some(earlier));
        assert!(host.own_positions().is_empty());
    }

    #[test]
    fn close_is_skipped_when_the_side_is_already_flat() {
        let mut host = SimulatedHost::new(SimulationSettings::default());
        host.set_positions(vec![Position::new(-1_000)]);

        assert_eq!(dispatcher().close_long(&mut host), DispatchOutcome::Skipped);
        assert!(host.orders().is_empty());
    }

    #[test]
    fn rejected_close_keeps_the_position_and_entry_time() {
        let mut host = SimulatedHost::new(SimulationSettings::default());
        host.set_positions(vec![Position::new(-1_000)]);
        host.set_accepting(false);
        let clock = clock();
        let entered = clock.now() - Duration::minutes(30);
        let mut entries = EntryTimestamps { long: None, short: Some(entered) };

        let outcome = dispatcher().dispatch(Action::CloseShort, &mut host, &clock, &mut entries);

        assert_eq!(outcome, DispatchOutcome::Rejected(crate::simulated::REJECTED.code()));
        assert_eq!(host.orders()[0].order.side, OrderSide::Buy);
        assert_eq!(host.own_positions(), vec![Position::new(-1_000)]);
        assert_eq!(entries.short, Some(entered));
        assert_eq!(entries.long, None);
    }

    #[test]
    fn close_sends_the_opposite_order() {
        let mut host = SimulatedHost::new(SimulationSettings::default());
        host.set_positions(vec![Position::new(1_000)]);
        let clock = clock();
        let mut entries = EntryTimestamps::default();

        let outcome = dispatcher().dispatch(Action::CloseLong, &mut host, &clock, &mut entries);

        assert_eq!(outcome, DispatchOutcome::Accepted);
        assert_eq!(host.orders()[0].order.side, OrderSide::Sell);
        assert!(host.own_positions().is_empty());
        // Closing never touches entry times.
        assert_eq!(entries, EntryTimestamps::default());
    }
}
