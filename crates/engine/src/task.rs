use crate::bot::{CycleReport, MacdDivergenceBot};
use chrono::{DateTime, Utc};
use core_types::{ManualClock, OscillatorReading};
use execution::{DispatchOutcome, ReadingSink, TradingHost};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;

/// One message on the feed that drives the bot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeedEvent {
    /// A new indicator update. `None` while the indicator is still warming up.
    Reading(Option<OscillatorReading>),
    /// Moves the replay clock to the given instant before the next reading is handled.
    ClockAt(DateTime<Utc>),
    /// Stop the strategy: liquidate and exit.
    Stop,
}

/// Totals for one session, reported when the task exits.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionSummary {
    pub bot_id: String,
    pub cycles: u64,
    pub orders_accepted: u64,
    pub orders_rejected: u64,
    pub closes_skipped: u64,
    pub status_messages: Vec<String>,
    pub positions_after_stop: usize,
}

impl SessionSummary {
    fn absorb(&mut self, report: &CycleReport) {
        self.cycles += 1;
        if let Some(message) = report.status {
            self.status_messages.push(message.text().to_string());
        }
        for (_, outcome) in &report.outcomes {
            match outcome {
                DispatchOutcome::Accepted => self.orders_accepted += 1,
                DispatchOutcome::Rejected(_) => self.orders_rejected += 1,
                DispatchOutcome::Skipped => self.closes_skipped += 1,
            }
        }
    }
}

/// A self-contained task that owns the bot and its host and runs exactly one decision
/// cycle per feed event, in arrival order.
///
/// Producers only ever hold the sending half of the channel, so cycles can never overlap.
pub struct TradingTask<H> {
    bot: MacdDivergenceBot,
    host: H,
    events: mpsc::Receiver<FeedEvent>,
    replay_clock: Option<Arc<ManualClock>>,
}

impl<H> TradingTask<H>
where
    H: TradingHost + ReadingSink + Send,
{
    /// Creates the task together with the sender that feeds it.
    pub fn new(bot: MacdDivergenceBot, host: H, capacity: usize) -> (Self, mpsc::Sender<FeedEvent>) {
        let (tx, events) = mpsc::channel(capacity);
        let task = Self {
            bot,
            host,
            events,
            replay_clock: None,
        };
        (task, tx)
    }

    /// Lets `ClockAt` events drive `clock`, which must be the clock the bot was built with.
    /// Used when replaying a recorded feed faster than real time.
    pub fn replaying(mut self, clock: Arc<ManualClock>) -> Self {
        self.replay_clock = Some(clock);
        self
    }

    /// The main, long-running loop. Returns when `Stop` arrives or every sender is dropped.
    pub async fn run(mut self) -> (SessionSummary, H) {
        tracing::info!(bot_id = %self.bot.id, host = self.host.name(), "Starting trading task.");
        let mut summary = SessionSummary {
            bot_id: self.bot.id.clone(),
            ..Default::default()
        };

        while let Some(event) = self.events.recv().await {
            match event {
                FeedEvent::Reading(reading) => {
                    self.host.publish_reading(reading);
                    let report = self.bot.recalculate(&mut self.host);
                    summary.absorb(&report);
                }
                FeedEvent::ClockAt(at) => match &self.replay_clock {
                    Some(clock) => clock.set(at),
                    None => {
                        tracing::warn!(bot_id = %self.bot.id, %at, "Ignoring clock update on a live clock.")
                    }
                },
                FeedEvent::Stop => {
                    tracing::info!(bot_id = %self.bot.id, "Stop requested.");
                    break;
                }
            }
        }

        self.bot.on_stop(&mut self.host);
        summary.positions_after_stop = self.host.own_positions().len();
        tracing::info!(
            bot_id = %summary.bot_id,
            cycles = summary.cycles,
            accepted = summary.orders_accepted,
            rejected = summary.orders_rejected,
            "Trading task finished."
        );
        (summary, self.host)
    }
}
