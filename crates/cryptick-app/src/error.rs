//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] cryptick_ws::WsError),

    #[error("Feed error: {0}")]
    Feed(#[from] cryptick_feed::FeedError),

    #[error("Alert error: {0}")]
    Alert(#[from] cryptick_alert::AlertError),

    #[error("Store error: {0}")]
    Store(#[from] cryptick_store::StoreError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] cryptick_telemetry::TelemetryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
