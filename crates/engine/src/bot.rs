// In crates/engine/src/bot.rs

use core_types::{Clock, Side, Symbol};
use execution::{DispatchOutcome, OrderDispatcher, TradingHost};
use std::sync::Arc;
use strategies::position_tracker::compute_exposure;
use strategies::{
    Action, Decision, EntryTimestamps, Exposure, ExposureState, NotificationState, StatusMessage,
    Strategy,
};

/// Everything one decision cycle saw and did.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub exposure: Exposure,
    pub status: Option<StatusMessage>,
    pub decision: Decision,
    pub outcomes: Vec<(Action, DispatchOutcome)>,
}

/// A single trading instance: one instrument, one strategy.
///
/// The bot owns the only state that survives between cycles (entry times and the last
/// announced exposure). It must be driven by one caller at a time; see `TradingTask`.
pub struct MacdDivergenceBot {
    /// A unique identifier for this bot instance (e.g., "EURUSD_MACDStrategy").
    pub id: String,
    strategy: Box<dyn Strategy + Send + Sync>,
    dispatcher: OrderDispatcher,
    clock: Arc<dyn Clock>,
    entries: EntryTimestamps,
    notifications: NotificationState,
}

impl MacdDivergenceBot {
    pub fn new(
        symbol: Symbol,
        strategy: Box<dyn Strategy + Send + Sync>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let id = format!("{}_{}", symbol.0, strategy.name());
        let dispatcher = OrderDispatcher::new(symbol, strategy.config().trade_size);
        tracing::info!(id = %id, trade_size = strategy.config().trade_size, "Creating new bot instance.");

        Self {
            id,
            strategy,
            dispatcher,
            clock,
            entries: EntryTimestamps::default(),
            notifications: NotificationState::default(),
        }
    }

    pub fn entries(&self) -> &EntryTimestamps {
        &self.entries
    }

    /// Runs one decision cycle against the host. Called once per indicator update.
    pub fn recalculate(&mut self, host: &mut dyn TradingHost) -> CycleReport {
        // 1. Exposure and status transitions.
        let exposure = compute_exposure(&host.own_positions());
        let (notifications, status) = self.notifications.observe(exposure);
        self.notifications = notifications;
        if let Some(message) = status {
            tracing::info!(bot_id = %self.id, %message, "Status changed.");
            host.set_status_message(message.text());
        }

        if exposure.state() == ExposureState::Both {
            tracing::warn!(
                bot_id = %self.id,
                longs = exposure.long_count,
                shorts = exposure.short_count,
                "Long and short positions are open at once; managing both sides."
            );
        }

        let now = self.clock.now();
        self.adopt_unknown_entries(exposure, now);

        // 2. Evaluate.
        let reading = host.latest_reading();
        let decision = self.strategy.assess(exposure, reading, &self.entries, now);
        if decision.is_none() {
            tracing::debug!(bot_id = %self.id, ?reading, ?exposure, "No action.");
        } else {
            tracing::info!(bot_id = %self.id, ?reading, actions = ?decision.actions(), "Strategy generated a decision.");
        }

        // 3. Dispatch. Rejections are logged and dropped; the next cycle re-decides.
        let mut outcomes = Vec::with_capacity(decision.actions().len());
        for &action in decision.actions() {
            let outcome = self
                .dispatcher
                .dispatch(action, host, self.clock.as_ref(), &mut self.entries);
            match outcome {
                DispatchOutcome::Accepted => {
                    tracing::info!(bot_id = %self.id, ?action, "Order accepted.")
                }
                DispatchOutcome::Rejected(code) => {
                    tracing::warn!(bot_id = %self.id, ?action, code, "Order rejected.")
                }
                DispatchOutcome::Skipped => {
                    tracing::debug!(bot_id = %self.id, ?action, "Close skipped, side already flat.")
                }
            }
            outcomes.push((action, outcome));
        }

        CycleReport {
            exposure,
            status,
            decision,
            outcomes,
        }
    }

    /// Positions that predate this session have no entry time. The hold gate for them is
    /// measured from the first cycle that sees them.
    fn adopt_unknown_entries(&mut self, exposure: Exposure, now: chrono::DateTime<chrono::Utc>) {
        for side in [Side::Long, Side::Short] {
            if exposure.has(side) && self.entries.get(side).is_none() {
                tracing::warn!(bot_id = %self.id, ?side, "Open position without a known entry time; holding from now.");
                self.entries.record(side, now);
            }
        }
    }

    /// Stop hook: the host liquidates everything this strategy owns.
    pub fn on_stop(&mut self, host: &mut dyn TradingHost) {
        tracing::info!(bot_id = %self.id, host = host.name(), "Stopping; closing own positions.");
        host.close_own_positions();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use core_types::{ManualClock, OrderSide, OscillatorReading, Position};
    use execution::{ReadingSink, SimulatedHost, SimulationSettings};
    use strategies::{MacdDivergence, StrategyConfig};

    fn setup(min_hold_minutes: i64) -> (MacdDivergenceBot, SimulatedHost, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()));
        let strategy = MacdDivergence::new(StrategyConfig {
            trade_size: 100_000,
            min_hold: Duration::minutes(min_hold_minutes),
        });
        let bot = MacdDivergenceBot::new(Symbol("EURUSD".to_string()), Box::new(strategy), clock.clone());
        (bot, SimulatedHost::new(SimulationSettings::default()), clock)
    }

    fn feed(host: &mut SimulatedHost, oscillator: f64, signal: f64) {
        host.publish_reading(Some(OscillatorReading::new(oscillator, signal)));
    }

    #[test]
    fn opens_long_on_bullish_divergence() {
        let (mut bot, mut host, clock) = setup(10);
        feed(&mut host, 1.5, -0.3);

        let report = bot.recalculate(&mut host);

        assert_eq!(report.outcomes, vec![(Action::OpenLong, DispatchOutcome::Accepted)]);
        assert_eq!(bot.entries().long, Some(clock.now()));
        assert_eq!(host.orders()[0].order.side, OrderSide::Buy);
        assert_eq!(host.own_positions(), vec![Position::new(100_000)]);
    }

    #[test]
    fn long_round_trip_respects_hold_and_announces_transitions() {
        let (mut bot, mut host, clock) = setup(10);
        feed(&mut host, 1.5, -0.3);
        bot.recalculate(&mut host);

        // Next cycle sees the new long and announces it once.
        clock.advance(Duration::minutes(5));
        feed(&mut host, -0.1, 0.2);
        let report = bot.recalculate(&mut host);
        assert_eq!(report.status, Some(StatusMessage::OpenedLong));
        assert!(report.decision.is_none());

        clock.advance(Duration::minutes(5));
        let report = bot.recalculate(&mut host);
        assert_eq!(report.status, None);
        assert_eq!(report.outcomes, vec![(Action::CloseLong, DispatchOutcome::Accepted)]);
        assert!(host.own_positions().is_empty());

        clock.advance(Duration::minutes(1));
        feed(&mut host, 0.5, 0.2);
        let report = bot.recalculate(&mut host);
        assert_eq!(report.status, Some(StatusMessage::WaitingForSignal));
        assert!(report.decision.is_none());

        assert_eq!(
            host.status_messages(),
            &["Opened long position.".to_string(), "Waiting for a trading signal...".to_string()]
        );
    }

    #[test]
    fn rejected_open_is_retried_next_cycle() {
        let (mut bot, mut host, clock) = setup(10);
        host.set_accepting(false);
        feed(&mut host, -0.6, 0.4);

        let report = bot.recalculate(&mut host);
        assert!(matches!(report.outcomes[0], (Action::OpenShort, DispatchOutcome::Rejected(_))));
        assert_eq!(bot.entries().short, None);

        host.set_accepting(true);
        clock.advance(Duration::seconds(30));
        let report = bot.recalculate(&mut host);
        assert_eq!(report.outcomes, vec![(Action::OpenShort, DispatchOutcome::Accepted)]);
        assert_eq!(bot.entries().short, Some(clock.now()));
    }

    #[test]
    fn both_sides_open_closes_only_the_reversed_one() {
        let (mut bot, mut host, clock) = setup(10);
        host.set_positions(vec![Position::new(100_000), Position::new(-100_000)]);
        feed(&mut host, -2.0, 0.0);

        // First sighting adopts both sides as just entered.
        let report = bot.recalculate(&mut host);
        assert!(report.decision.is_none());
        assert_eq!(bot.entries().long, Some(clock.now()));

        clock.advance(Duration::minutes(11));
        let report = bot.recalculate(&mut host);
        assert!(report.decision.contains(Action::CloseLong));
        assert!(!report.decision.contains(Action::CloseShort));
    }

    #[test]
    fn close_is_skipped_if_position_vanished_before_dispatch() {
        struct VanishingHost(SimulatedHost, bool);

        impl TradingHost for VanishingHost {
            fn name(&self) -> &'static str {
                "VanishingHost"
            }
            fn own_positions(&self) -> Vec<Position> {
                // The first query (exposure) sees the long, later ones do not.
                if self.1 { vec![] } else { self.0.own_positions() }
            }
            fn latest_reading(&self) -> Option<OscillatorReading> {
                self.0.latest_reading()
            }
            fn place_market_order(&mut self, order: &core_types::OrderRequest) -> core_types::OrderResult {
                self.0.place_market_order(order)
            }
            fn close_own_positions(&mut self) {
                self.0.close_own_positions()
            }
            fn set_status_message(&mut self, text: &str) {
                self.1 = true;
                self.0.set_status_message(text)
            }
        }

        let (mut bot, inner, clock) = setup(1);
        let mut host = VanishingHost(inner, false);
        host.0.set_positions(vec![Position::new(100_000)]);
        host.0.publish_reading(Some(OscillatorReading::new(-1.0, 1.0)));
        bot.entries.record(Side::Long, clock.now() - Duration::hours(1));

        let report = bot.recalculate(&mut host);

        assert_eq!(report.outcomes, vec![(Action::CloseLong, DispatchOutcome::Skipped)]);
        assert!(host.0.orders().is_empty());
    }

    #[test]
    fn warm_up_cycles_do_nothing() {
        let (mut bot, mut host, _) = setup(10);
        host.publish_reading(None);
        let report = bot.recalculate(&mut host);
        assert!(report.decision.is_none());
        assert!(host.orders().is_empty());
    }

    #[test]
    fn stop_liquidates_everything() {
        let (mut bot, mut host, _) = setup(10);
        host.set_positions(vec![Position::new(3), Position::new(-4)]);
        bot.on_stop(&mut host);
        assert!(host.own_positions().is_empty());
    }
}
