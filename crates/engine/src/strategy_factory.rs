//! Builds a ready-to-run bot from a preset, wiring its market data on the way.

use crate::bot::MacdDivergenceBot;
use anyhow::{Context, Result};
use chrono::Duration;
use core_types::{Clock, MacdParams, StrategyPreset, Symbol};
use execution::HostInitializer;
use std::sync::Arc;
use strategies::factory::create_strategy;

/// How far back the indicator's history window reaches at construction.
pub fn history_window() -> Duration {
    Duration::hours(1)
}

/// Validates the preset, then subscribes quote ticks, the history window and the MACD
/// oscillator before handing back the bot. Nothing is subscribed if the preset is invalid.
pub fn create_bot(
    preset: &StrategyPreset,
    host: &mut dyn HostInitializer,
    clock: Arc<dyn Clock>,
) -> Result<MacdDivergenceBot> {
    let symbol = Symbol::parse(&preset.symbol.0)?;
    let strategy =
        create_strategy(preset).with_context(|| format!("Invalid preset for {symbol}"))?;

    host.subscribe_quote_ticks(&symbol)
        .context("Failed to subscribe quote ticks")?;
    host.use_history_window(&symbol, clock.now() - history_window())
        .context("Failed to request indicator history")?;
    host.subscribe_indicator(MacdParams::DEFAULT)
        .context("Failed to subscribe MACD indicator")?;

    Ok(MacdDivergenceBot::new(symbol, strategy, clock))
}
