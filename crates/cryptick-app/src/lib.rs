//! cryptick market ticker application.
//!
//! Orchestrates the full pipeline:
//! - WebSocket connections to the spot and derivative ticker streams
//! - Batch decoding and subscription filtering
//! - Fan-out to the scrolling ticker and the alert engine
//! - Persistent favorites and price alerts

pub mod app;
pub mod config;
pub mod error;
pub mod sinks;

pub use app::Application;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use sinks::{AlertSink, DisplaySink, LogAlertSink, LogDisplaySink};
