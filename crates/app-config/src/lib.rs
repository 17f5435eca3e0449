// In crates/app-config/src/lib.rs

use config::{Config, Environment, File, FileFormat};

pub mod error;
pub mod types;

// Re-export the most important types for easy access.
pub use error::{Error, Result};
pub use types::{AppSettings, Settings};

/// Loads the application settings from `config/`.
pub fn load_settings() -> Result<Settings> {
    load_settings_from("config")
}

/// Loads the application settings from various sources.
///
/// This function orchestrates the layered configuration loading:
/// 1. Reads from a default `base.toml` file.
/// 2. Merges settings from an environment-specific file (e.g., `development.toml`).
/// 3. Merges settings from environment variables.
pub fn load_settings_from(dir: &str) -> Result<Settings> {
    // Get the current environment. Default to "development" if not set.
    let environment = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".into());

    let settings = Config::builder()
        .add_source(File::with_name(&format!("{dir}/base")))
        .add_source(File::with_name(&format!("{dir}/{environment}")).required(false))
        // e.g. `APP_STRATEGY__SYMBOL=GBPUSD`, `APP_STRATEGY__PARAMS__TRADE_SIZE=5000`.
        .add_source(
            Environment::with_prefix("APP")
                .separator("__")
                .try_parsing(true),
        )
        .set_override("app.environment", environment)?
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Parses settings from a TOML document with no file or environment layering.
pub fn parse_settings(toml: &str) -> Result<Settings> {
    let settings = Config::builder()
        .add_source(File::from_str(toml, FileFormat::Toml))
        .build()?;
    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use execution::SimulationSettings;

    #[test]
    fn parses_a_full_document() {
        let settings = parse_settings(
            r#"
            [app]
            log_level = "debug"

            [strategy]
            symbol = "GBPUSD"
            params = { trade_size = 25000, min_hold_minutes = 15 }

            [simulation]
            reject_every = 4
            "#,
        )
        .unwrap();

        assert_eq!(settings.app.log_level, "debug");
        assert_eq!(settings.strategy.symbol.0, "GBPUSD");
        assert_eq!(settings.strategy.name, "macd_divergence");
        let params = settings.strategy.params.as_table().unwrap();
        assert_eq!(params["trade_size"].as_integer(), Some(25000));
        assert_eq!(settings.simulation, SimulationSettings { reject_every: 4 });
    }

    #[test]
    fn optional_sections_default() {
        let settings = parse_settings(
            r#"
            [app]

            [strategy]
            symbol = "EURUSD"
            "#,
        )
        .unwrap();

        assert_eq!(settings.app.log_level, "info");
        assert_eq!(settings.simulation.reject_every, 0);
        assert!(settings.strategy.params.as_table().unwrap().is_empty());
    }

    #[test]
    fn missing_strategy_is_an_error() {
        assert!(parse_settings("[app]\nlog_level = \"info\"").is_err());
    }
}
