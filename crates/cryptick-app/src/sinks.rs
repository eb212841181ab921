//! Presentation seams.
//!
//! The pipeline ends at two narrow traits: one for the scrolling
//! ticker frame and one for triggered alerts. The default
//! implementations log; a UI front end supplies its own.

use cryptick_alert::{AlertDecision, TriggeredAlert};
use cryptick_core::PriceUpdate;
use tracing::{debug, trace, warn};

/// Receives each accepted price update and each rendered ticker frame.
pub trait DisplaySink: Send {
    /// Observe one accepted update. Called once per update, in
    /// delivery order, before the alert check runs.
    fn on_update(&mut self, update: &PriceUpdate);

    fn render(&mut self, frame: &str);
}

/// Receives each triggered alert and answers with the user's decision.
pub trait AlertSink: Send {
    fn notify(&mut self, alert: &TriggeredAlert) -> AlertDecision;
}

/// Logs every frame at debug level.
#[derive(Debug, Default)]
pub struct LogDisplaySink;

impl DisplaySink for LogDisplaySink {
    fn on_update(&mut self, update: &PriceUpdate) {
        trace!(symbol = %update.symbol, price = %update.price, "Price update");
    }

    fn render(&mut self, frame: &str) {
        debug!(%frame, "Ticker frame");
    }
}

/// Logs triggered alerts and leaves them dismissed.
#[derive(Debug, Default)]
pub struct LogAlertSink;

impl AlertSink for LogAlertSink {
    fn notify(&mut self, alert: &TriggeredAlert) -> AlertDecision {
        warn!(
            symbol = %alert.symbol,
            target = %alert.target_price,
            current = %alert.current_price,
            "Price alert triggered"
        );
        AlertDecision::Dismiss
    }
}
