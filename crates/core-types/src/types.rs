// In crates/core-types/src/types.rs

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A trading instrument identifier (e.g., "EURUSD").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(pub String);

impl Symbol {
    /// Builds a symbol, rejecting empty or whitespace-only names.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidSymbol(raw.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The direction of an exposure held by the strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Long,
    Short,
}

impl Side {
    /// The order side that opens an exposure in this direction.
    pub fn opening_order(self) -> OrderSide {
        match self {
            Side::Long => OrderSide::Buy,
            Side::Short => OrderSide::Sell,
        }
    }

    /// The order side that reduces an exposure in this direction.
    pub fn closing_order(self) -> OrderSide {
        match self {
            Side::Long => OrderSide::Sell,
            Side::Short => OrderSide::Buy,
        }
    }
}

/// The side of a market order sent to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

/// How long an order stays working at the venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrderDuration {
    /// Expires at the end of the trading day.
    #[default]
    Day,
}

/// A position owned by this strategy instance, as reported by the host.
///
/// The quantity is signed: positive for long, negative for short.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub quantity: i64,
}

impl Position {
    pub fn new(quantity: i64) -> Self {
        Self { quantity }
    }
}

/// A market order request handed to the host's execution interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub symbol: Symbol,
    pub side: OrderSide,
    pub quantity: u32,
    pub duration: OrderDuration,
}

/// The result code the host returns for an order placement. Zero means accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderResult(pub i32);

impl OrderResult {
    pub const ACCEPTED: OrderResult = OrderResult(0);

    pub fn is_accepted(self) -> bool {
        self.0 == 0
    }

    pub fn code(self) -> i32 {
        self.0
    }
}

/// The latest two-line oscillator output: the MACD line and its signal (average) line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OscillatorReading {
    pub oscillator: f64,
    pub signal: f64,
}

impl OscillatorReading {
    pub fn new(oscillator: f64, signal: f64) -> Self {
        Self { oscillator, signal }
    }

    /// A reading is usable only when both lines are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.oscillator.is_finite() && self.signal.is_finite()
    }
}

/// Periods of the MACD oscillator the host computes for us.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacdParams {
    pub fast_period: u32,
    pub slow_period: u32,
    pub signal_period: u32,
}

impl MacdParams {
    pub const DEFAULT: MacdParams = MacdParams {
        fast_period: 10,
        slow_period: 20,
        signal_period: 10,
    };

    pub fn new(fast_period: u32, slow_period: u32, signal_period: u32) -> Result<Self> {
        if fast_period == 0 || slow_period == 0 || signal_period == 0 {
            return Err(Error::InvalidIndicator(
                "MACD periods must be greater than 0".to_string(),
            ));
        }
        if fast_period >= slow_period {
            return Err(Error::InvalidIndicator(format!(
                "fast period ({fast_period}) must be shorter than slow period ({slow_period})"
            )));
        }
        Ok(Self {
            fast_period,
            slow_period,
            signal_period,
        })
    }
}

impl Default for MacdParams {
    fn default() -> Self {
        Self::DEFAULT
    }
}
