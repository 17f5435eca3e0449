// In crates/execution/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Subscription failed: {reason}")]
    SubscriptionFailed { reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
