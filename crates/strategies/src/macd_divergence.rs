// In crates/strategies/src/macd_divergence.rs

use crate::position_tracker::Exposure;
use crate::types::{StrategyConfig, STRATEGY_NAME};
use crate::Strategy;
use chrono::{DateTime, Duration, Utc};
use core_types::{OscillatorReading, Side};
use serde::Serialize;

/// One order action the evaluator asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Action {
    OpenLong,
    OpenShort,
    CloseLong,
    CloseShort,
}

impl Action {
    pub fn side(self) -> Side {
        match self {
            Action::OpenLong | Action::CloseLong => Side::Long,
            Action::OpenShort | Action::CloseShort => Side::Short,
        }
    }

    pub fn is_open(self) -> bool {
        matches!(self, Action::OpenLong | Action::OpenShort)
    }
}

/// The outcome of one evaluation: no action, a single open, or one close per open side.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Decision {
    actions: Vec<Action>,
}

impl Decision {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_none(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn contains(&self, action: Action) -> bool {
        self.actions.contains(&action)
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }
}

/// Wall-clock time of the last accepted opening order on each side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EntryTimestamps {
    pub long: Option<DateTime<Utc>>,
    pub short: Option<DateTime<Utc>>,
}

impl EntryTimestamps {
    pub fn get(&self, side: Side) -> Option<DateTime<Utc>> {
        match side {
            Side::Long => self.long,
            Side::Short => self.short,
        }
    }

    pub fn record(&mut self, side: Side, at: DateTime<Utc>) {
        match side {
            Side::Long => self.long = Some(at),
            Side::Short => self.short = Some(at),
        }
    }
}

/// True once a position entered at `entry` has been held for at least `min_hold`.
/// An unknown entry time counts as "just entered".
fn hold_elapsed(entry: Option<DateTime<Utc>>, now: DateTime<Utc>, min_hold: Duration) -> bool {
    match entry {
        Some(entered) => now - entered >= min_hold,
        None => false,
    }
}

/// Evaluates the entry and exit rules for one cycle.
///
/// While flat, a long is opened when the oscillator is above zero but its signal line is
/// still below, and a short in the mirrored case. Each open side is closed independently
/// once the oscillator has crossed against it and the position has been held for at least
/// `min_hold`. A missing or non-finite reading yields no action.
pub fn decide(
    exposure: Exposure,
    reading: Option<OscillatorReading>,
    entries: &EntryTimestamps,
    now: DateTime<Utc>,
    min_hold: Duration,
) -> Decision {
    let Some(reading) = reading.filter(OscillatorReading::is_finite) else {
        return Decision::none();
    };
    let OscillatorReading { oscillator, signal } = reading;
    let mut actions = Vec::with_capacity(2);

    if exposure.is_flat() {
        if oscillator > 0.0 && signal < 0.0 {
            actions.push(Action::OpenLong);
        } else if oscillator < 0.0 && signal > 0.0 {
            actions.push(Action::OpenShort);
        }
        return Decision { actions };
    }

    if exposure.has(Side::Long)
        && oscillator < 0.0
        && hold_elapsed(entries.long, now, min_hold)
    {
        actions.push(Action::CloseLong);
    }
    if exposure.has(Side::Short)
        && oscillator > 0.0
        && hold_elapsed(entries.short, now, min_hold)
    {
        actions.push(Action::CloseShort);
    }

    Decision { actions }
}

/// The MACD divergence strategy: trades the sign disagreement between the MACD line and its
/// signal line, and exits on a zero-line reversal after a minimum holding time.
#[derive(Debug, Clone)]
pub struct MacdDivergence {
    config: StrategyConfig,
}

impl MacdDivergence {
    pub fn new(config: StrategyConfig) -> Self {
        Self { config }
    }
}

impl Strategy for MacdDivergence {
    fn name(&self) -> &'static str {
        STRATEGY_NAME
    }

    fn config(&self) -> &StrategyConfig {
        &self.config
    }

    fn assess(
        &self,
        exposure: Exposure,
        reading: Option<OscillatorReading>,
        entries: &EntryTimestamps,
        now: DateTime<Utc>,
    ) -> Decision {
        decide(exposure, reading, entries, now, self.config.min_hold)
    }
}
