// In crates/core-types/src/lib.rs

pub mod clock;
pub mod error;
pub mod strategy;
pub mod types;

// Re-export the most important types for easy access from other crates.
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Error, Result};
pub use strategy::StrategyPreset;
pub use types::{
    MacdParams, OrderDuration, OrderRequest, OrderResult, OrderSide, OscillatorReading, Position,
    Side, Symbol,
};
