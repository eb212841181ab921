//! Normalized price-update records.

use crate::Market;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A single normalized ticker update.
///
/// Produced by the decoder, immutable once constructed, and uniquely
/// keyed by `(symbol, market)`. The price is carried as a fixed
/// 8-fractional-digit string exactly as the feed's tick granularity
/// allows; consumers that need arithmetic use [`PriceUpdate::numeric_price`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceUpdate {
    /// Instrument symbol, e.g. "BTCUSDT".
    pub symbol: String,
    /// Last price, rendered with exactly 8 fractional digits.
    pub price: String,
    /// 24h percent change as received from the feed, no smoothing.
    pub percent_change: f64,
    /// Venue the update came from.
    pub market: Market,
}

impl PriceUpdate {
    /// Build an update from an already-parsed price.
    ///
    /// The price is rescaled to exactly 8 fractional digits so that
    /// `"50000"` and `"50000.00000000"` produce identical records.
    pub fn new(symbol: impl Into<String>, price: Decimal, percent_change: f64, market: Market) -> Self {
        let mut price = price;
        price.rescale(8);
        Self {
            symbol: symbol.into(),
            price: price.to_string(),
            percent_change,
            market,
        }
    }

    /// Parse the price string back into a `Decimal` for arithmetic.
    pub fn numeric_price(&self) -> Option<Decimal> {
        Decimal::from_str(&self.price).ok()
    }
}
