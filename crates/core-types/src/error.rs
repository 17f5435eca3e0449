// In crates/core-types/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid symbol: {0:?}")]
    InvalidSymbol(String),

    #[error("Invalid indicator parameters: {0}")]
    InvalidIndicator(String),
}

pub type Result<T> = std::result::Result<T, Error>;
