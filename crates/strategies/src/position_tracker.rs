// In crates/strategies/src/position_tracker.rs

use core_types::{Position, Side};
use serde::Serialize;
use std::fmt;

/// How many of the strategy's own positions are long and how many are short.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Exposure {
    pub long_count: usize,
    pub short_count: usize,
}

/// The directional state an `Exposure` collapses to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExposureState {
    Flat,
    Long,
    Short,
    /// Long and short positions at the same time. A well-behaved venue never reports this
    /// for a single strategy book, but it is tolerated.
    Both,
}

impl Exposure {
    pub const FLAT: Exposure = Exposure {
        long_count: 0,
        short_count: 0,
    };

    pub fn new(long_count: usize, short_count: usize) -> Self {
        Self {
            long_count,
            short_count,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.long_count == 0 && self.short_count == 0
    }

    pub fn count(&self, side: Side) -> usize {
        match side {
            Side::Long => self.long_count,
            Side::Short => self.short_count,
        }
    }

    pub fn has(&self, side: Side) -> bool {
        self.count(side) > 0
    }

    pub fn state(&self) -> ExposureState {
        match (self.long_count > 0, self.short_count > 0) {
            (false, false) => ExposureState::Flat,
            (true, false) => ExposureState::Long,
            (false, true) => ExposureState::Short,
            (true, true) => ExposureState::Both,
        }
    }
}

/// Counts owned positions by the sign of their quantity. Flat positions count toward
/// neither side.
pub fn compute_exposure(positions: &[Position]) -> Exposure {
    positions
        .iter()
        .fold(Exposure::FLAT, |mut exposure, position| {
            if position.quantity > 0 {
                exposure.long_count += 1;
            } else if position.quantity < 0 {
                exposure.short_count += 1;
            }
            exposure
        })
}

/// A human-readable status transition shown by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatusMessage {
    WaitingForSignal,
    OpenedLong,
    OpenedShort,
}

impl StatusMessage {
    pub fn text(self) -> &'static str {
        match self {
            StatusMessage::WaitingForSignal => "Waiting for a trading signal...",
            StatusMessage::OpenedLong => "Opened long position.",
            StatusMessage::OpenedShort => "Opened short position.",
        }
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Compares the previous cycle's counts with the current ones and names the transition,
/// if there is one worth announcing.
pub fn detect_transition(previous: Exposure, current: Exposure) -> Option<StatusMessage> {
    if current.is_flat() && !previous.is_flat() {
        Some(StatusMessage::WaitingForSignal)
    } else if current.long_count > 0 && current.long_count != previous.long_count {
        Some(StatusMessage::OpenedLong)
    } else if current.short_count > 0 && current.short_count != previous.short_count {
        Some(StatusMessage::OpenedShort)
    } else {
        None
    }
}

/// The last exposure that was announced. Threaded from one cycle to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NotificationState {
    last: Exposure,
}

impl NotificationState {
    /// Records the current exposure and returns the message to publish, if any.
    pub fn observe(self, current: Exposure) -> (NotificationState, Option<StatusMessage>) {
        let message = detect_transition(self.last, current);
        (NotificationState { last: current }, message)
    }
}
