// In crates/strategies/src/types.rs

use crate::{Error, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TRADE_SIZE: i64 = 100_000;
pub const DEFAULT_MIN_HOLD_MINUTES: i64 = 10;

const TRADE_SIZE_BOUNDS: (i64, i64) = (1, i32::MAX as i64);
const MIN_HOLD_BOUNDS: (i64, i64) = (1, 100);

/// Raw parameters for the MACD divergence strategy, as supplied by the host preset.
///
/// The camel-case aliases accept presets written against the host's own parameter keys.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MacdDivergenceSettings {
    /// Contract/share quantity for every order.
    #[serde(default = "default_trade_size", alias = "tradeSize")]
    pub trade_size: i64,

    /// Minimum time, in minutes, a position stays open before a reversal may close it.
    #[serde(default = "default_min_hold_minutes", alias = "tradeDuration")]
    pub min_hold_minutes: i64,
}

impl Default for MacdDivergenceSettings {
    fn default() -> Self {
        Self {
            trade_size: DEFAULT_TRADE_SIZE,
            min_hold_minutes: DEFAULT_MIN_HOLD_MINUTES,
        }
    }
}

fn default_trade_size() -> i64 {
    DEFAULT_TRADE_SIZE
}

fn default_min_hold_minutes() -> i64 {
    DEFAULT_MIN_HOLD_MINUTES
}

impl MacdDivergenceSettings {
    /// Checks every parameter against its bounds and freezes the result.
    pub fn validate(&self) -> Result<StrategyConfig> {
        let trade_size = check_range("trade_size", self.trade_size, TRADE_SIZE_BOUNDS)?;
        let min_hold_minutes =
            check_range("min_hold_minutes", self.min_hold_minutes, MIN_HOLD_BOUNDS)?;

        Ok(StrategyConfig {
            trade_size: trade_size as u32,
            min_hold: Duration::minutes(min_hold_minutes),
        })
    }
}

fn check_range(name: &'static str, value: i64, (min, max): (i64, i64)) -> Result<i64> {
    if value < min || value > max {
        return Err(Error::OutOfRange {
            name,
            value,
            min,
            max,
        });
    }
    Ok(value)
}

/// The validated, immutable configuration a running strategy works from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrategyConfig {
    pub trade_size: u32,
    pub min_hold: Duration,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            trade_size: DEFAULT_TRADE_SIZE as u32,
            min_hold: Duration::minutes(DEFAULT_MIN_HOLD_MINUTES),
        }
    }
}

/// Describes one bounded integer parameter the host can present to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterDescriptor {
    pub key: &'static str,
    pub label: &'static str,
    pub default: i64,
    pub min: i64,
    pub max: i64,
}

/// Name, description and parameter list the strategy registers with a host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrategyDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Vec<ParameterDescriptor>,
}

/// The name the strategy registers under and reports in bot ids.
pub const STRATEGY_NAME: &str = "MACDStrategy";

pub fn macd_divergence_descriptor() -> StrategyDescriptor {
    StrategyDescriptor {
        name: STRATEGY_NAME,
        description: "MACD algo sample",
        parameters: vec![
            ParameterDescriptor {
                key: "tradeSize",
                label: "trade amount",
                default: DEFAULT_TRADE_SIZE,
                min: TRADE_SIZE_BOUNDS.0,
                max: TRADE_SIZE_BOUNDS.1,
            },
            ParameterDescriptor {
                key: "tradeDuration",
                label: "min trade duration (minutes)",
                default: DEFAULT_MIN_HOLD_MINUTES,
                min: MIN_HOLD_BOUNDS.0,
                max: MIN_HOLD_BOUNDS.1,
            },
        ],
    }
}
