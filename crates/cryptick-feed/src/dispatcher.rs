//! Update fan-out.
//!
//! Consumers are held as an explicit ordered list and invoked once per
//! accepted update, synchronously within the delivery call, in
//! registration order. The alert-evaluation callback is a single slot
//! (last registration wins) invoked after all update consumers, so a
//! display consumer always observes an update before its alert check
//! runs.

use cryptick_core::PriceUpdate;
use rust_decimal::Decimal;
use tracing::warn;

type UpdateConsumer = Box<dyn FnMut(&PriceUpdate) + Send>;
type AlertConsumer = Box<dyn FnMut(&str, Decimal) + Send>;

/// Fan-out hub for accepted price updates.
#[derive(Default)]
pub struct UpdateDispatcher {
    consumers: Vec<UpdateConsumer>,
    alert_check: Option<AlertConsumer>,
}

impl UpdateDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an update consumer, appended after existing ones.
    pub fn on_update<F>(&mut self, consumer: F)
    where
        F: FnMut(&PriceUpdate) + Send + 'static,
    {
        self.consumers.push(Box::new(consumer));
    }

    /// Register the alert-evaluation callback. At most one is held;
    /// registering again replaces the previous one.
    pub fn on_alert_check<F>(&mut self, consumer: F)
    where
        F: FnMut(&str, Decimal) + Send + 'static,
    {
        if self.alert_check.is_some() {
            warn!("Replacing previously registered alert-check consumer");
        }
        self.alert_check = Some(Box::new(consumer));
    }

    /// Deliver one update to all consumers, then run the alert check.
    pub fn dispatch(&mut self, update: &PriceUpdate) {
        for consumer in &mut self.consumers {
            consumer(update);
        }

        if let Some(alert_check) = &mut self.alert_check {
            match update.numeric_price() {
                Some(price) => alert_check(&update.symbol, price),
                None => warn!(symbol = %update.symbol, "Unparseable price, skipping alert check"),
            }
        }
    }

    pub fn consumer_count(&self) -> usize {
        self.consumers.len()
    }
}
