use crate::Symbol;
use serde::Deserialize;
use toml::Value;

/// The externally supplied preset a strategy is started from: which instrument it
/// trades and its raw parameter table.
#[derive(Deserialize, Debug, Clone)]
pub struct StrategyPreset {
    #[serde(default = "default_name")]
    pub name: String,
    pub symbol: Symbol,
    // This will hold the `params = { ... }` table from the TOML
    #[serde(default = "empty_params")]
    pub params: Value,
}

impl StrategyPreset {
    pub fn new(symbol: Symbol, params: Value) -> Self {
        Self {
            name: default_name(),
            symbol,
            params,
        }
    }
}

fn default_name() -> String {
    "macd_divergence".to_string()
}

fn empty_params() -> Value {
    Value::Table(Default::default())
}
