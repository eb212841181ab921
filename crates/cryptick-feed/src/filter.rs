//! Subscription filtering.
//!
//! The upstream feeds are unfiltered all-instrument ticker arrays, so
//! this set is the sole gate controlling dispatch volume. It is checked
//! for every decoded entry before any further processing.

use cryptick_core::PriceUpdate;
use std::collections::HashSet;
use tracing::debug;

/// Market-agnostic set of subscribed instrument symbols.
#[derive(Debug, Default)]
pub struct SubscriptionFilter {
    symbols: HashSet<String>,
}

impl SubscriptionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a symbol to the set. Idempotent.
    pub fn subscribe(&mut self, symbol: impl Into<String>) {
        let symbol = symbol.into();
        if self.symbols.insert(symbol.clone()) {
            debug!(%symbol, "Subscribed");
        }
    }

    /// Remove a symbol from the set. Idempotent on absence.
    pub fn unsubscribe(&mut self, symbol: &str) {
        if self.symbols.remove(symbol) {
            debug!(symbol, "Unsubscribed");
        }
    }

    /// True iff the update's symbol is subscribed.
    pub fn accepts(&self, update: &PriceUpdate) -> bool {
        self.symbols.contains(&update.symbol)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.contains(symbol)
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Snapshot of the subscribed symbols.
    pub fn symbols(&self) -> Vec<String> {
        self.symbols.iter().cloned().collect()
    }
}
