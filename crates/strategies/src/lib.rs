// In crates/strategies/src/lib.rs

use chrono::{DateTime, Utc};
use core_types::OscillatorReading;

pub mod error;
pub mod factory;
pub mod macd_divergence;
pub mod position_tracker;
pub mod types;

pub use error::{Error, Result};
pub use macd_divergence::{Action, Decision, EntryTimestamps, MacdDivergence};
pub use position_tracker::{Exposure, ExposureState, NotificationState, StatusMessage};
pub use types::StrategyConfig;

/// The universal interface for a trading strategy.
///
/// A strategy looks at the current exposure and the latest indicator reading and decides
/// which order actions to take. It holds no mutable state of its own: everything that must
/// survive between cycles (entry times, notification state) is owned by the caller and
/// passed in, so the same inputs always give the same `Decision`.
pub trait Strategy {
    /// The name of the strategy.
    fn name(&self) -> &'static str;

    /// The validated configuration this instance was started with.
    fn config(&self) -> &StrategyConfig;

    fn assess(
        &self,
        exposure: Exposure,
        reading: Option<OscillatorReading>,
        entries: &EntryTimestamps,
        now: DateTime<Utc>,
    ) -> Decision;
}
