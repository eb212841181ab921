//! Alert error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlertError {
    #[error("Invalid target price: {0}")]
    InvalidTarget(String),

    #[error("Store error: {0}")]
    Store(#[from] cryptick_store::StoreError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type AlertResult<T> = Result<T, AlertError>;
