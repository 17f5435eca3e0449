use crate::macd_divergence::MacdDivergence;
use crate::types::{MacdDivergenceSettings, StrategyConfig, STRATEGY_NAME};
use crate::{Error, Result, Strategy};
use core_types::StrategyPreset;

/// Parses a preset's parameter table and validates it into a frozen config.
pub fn config_from_preset(preset: &StrategyPreset) -> Result<StrategyConfig> {
    let settings: MacdDivergenceSettings = preset.params.clone().try_into()?;
    settings.validate()
}

/// Builds the strategy instance a preset names.
pub fn create_strategy(preset: &StrategyPreset) -> Result<Box<dyn Strategy + Send + Sync>> {
    match preset.name.as_str() {
        "macd_divergence" | STRATEGY_NAME => {
            let config = config_from_preset(preset)?;
            Ok(Box::new(MacdDivergence::new(config)))
        }
        unknown => Err(Error::UnknownStrategy(unknown.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use core_types::Symbol;

    fn preset(name: &str, params: &str) -> StrategyPreset {
        let mut preset = StrategyPreset::new(Symbol("EURUSD".to_string()), toml::from_str(params).unwrap());
        preset.name = name.to_string();
        preset
    }

    #[test]
    fn empty_params_fall_back_to_defaults() {
        let strategy = create_strategy(&preset("macd_divergence", "")).unwrap();
        assert_eq!(strategy.config().trade_size, 100_000);
        assert_eq!(strategy.config().min_hold, Duration::minutes(10));
    }

    #[test]
    fn host_name_and_keys_are_understood() {
        let strategy = create_strategy(&preset("MACDStrategy", "tradeSize = 7\ntradeDuration = 2")).unwrap();
        assert_eq!(strategy.name(), "MACDStrategy");
        assert_eq!(strategy.config().trade_size, 7);
        assert_eq!(strategy.config().min_hold, Duration::minutes(2));
    }

    #[test]
    fn invalid_presets_abort_start() {
        assert!(matches!(
            create_strategy(&preset("macd_divergence", "min_hold_minutes = 0")),
            Err(Error::OutOfRange { .. })
        ));
        assert!(matches!(
            create_strategy(&preset("macd_divergence", "trade_size = \"lots\"")),
            Err(Error::MalformedParameters(_))
        ));
        assert!(matches!(
            create_strategy(&preset("supertrend", "")),
            Err(Error::UnknownStrategy(name)) if name == "supertrend"
        ));
    }
}
