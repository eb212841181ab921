//! Batch decoding for the all-instrument ticker streams.
//!
//! Each inbound frame is expected to be a JSON array of ticker records.
//! A frame that is not an array (or not JSON at all) is rejected as a
//! whole; malformed entries inside an otherwise valid array are skipped
//! silently so one bad record never suppresses the rest of the batch.

use crate::error::{FeedError, FeedResult};
use cryptick_core::{Market, PriceUpdate};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use tracing::debug;

/// A single raw ticker entry as the feed sends it.
///
/// Wire names: `s` = symbol, `c` = last price, `P` = 24h percent change.
/// Both numeric fields arrive as strings.
#[derive(Debug, Deserialize)]
struct RawTicker {
    s: String,
    c: String,
    #[serde(rename = "P")]
    percent_change: String,
}

/// Decodes raw feed batches into normalized price updates.
#[derive(Debug, Default)]
pub struct TickerDecoder;

impl TickerDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Decode one raw batch.
    ///
    /// Returns [`FeedError::Decode`] when the top-level payload is not a
    /// JSON array; the caller logs and drops the batch without touching
    /// the connection. Entries that fail to decode are skipped.
    pub fn decode_batch(&self, market: Market, payload: &str) -> FeedResult<Vec<PriceUpdate>> {
        let value: serde_json::Value = serde_json::from_str(payload)
            .map_err(|e| FeedError::Decode(format!("Invalid batch JSON: {e}")))?;

        let entries = value
            .as_array()
            .ok_or_else(|| FeedError::Decode("Batch is not an array".to_string()))?;

        let mut updates = Vec::with_capacity(entries.len());
        for entry in entries {
            match self.decode_entry(market, entry) {
                Some(update) => updates.push(update),
                None => {
                    debug!(market = %market, "Skipping malformed ticker entry");
                }
            }
        }

        Ok(updates)
    }

    fn decode_entry(&self, market: Market, entry: &serde_json::Value) -> Option<PriceUpdate> {
        let raw: RawTicker = serde_json::from_value(entry.clone()).ok()?;
        let price = Decimal::from_str(&raw.c).ok()?;
        let percent_change: f64 = raw.percent_change.parse().ok()?;
        Some(PriceUpdate::new(raw.s, price, percent_change, market))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_valid_batch() {
        let decoder = TickerDecoder::new();
        let payload = r#"[
            {"s": "BTCUSDT", "c": "50000.00", "P": "2.50"},
            {"s": "ETHUSDT", "c": "3210.5", "P": "-1.20"}
        ]"#;

        let updates = decoder.decode_batch(Market::Spot, payload).unwrap();
        assert_eq!(updates.len(), 2);

        assert_eq!(updates[0].symbol, "BTCUSDT");
        assert_eq!(updates[0].price, "50000.00000000");
        assert_eq!(updates[0].percent_change, 2.5);
        assert_eq!(updates[0].market, Market::Spot);

        assert_eq!(updates[1].symbol, "ETHUSDT");
        assert_eq!(updates[1].price, "3210.50000000");
        assert_eq!(updates[1].percent_change, -1.2);
    }

    #[test]
    fn test_non_array_batch_rejected() {
        let decoder = TickerDecoder::new();

        let err = decoder
            .decode_batch(Market::Spot, r#"{"s": "BTCUSDT"}"#)
            .unwrap_err();
        assert!(matches!(err, FeedError::Decode(_)));

        let err = decoder.decode_batch(Market::Spot, "not json").unwrap_err();
        assert!(matches!(err, FeedError::Decode(_)));
    }

    #[test]
    fn test_malformed_entries_skipped_silently() {
        let decoder = TickerDecoder::new();
        let payload = r#"[
            {"s": "BTCUSDT", "c": "50000", "P": "2.5"},
            {"s": "BADPRICE", "c": "not-a-number", "P": "1.0"},
            {"missing": "fields"},
            {"s": "ETHUSDT", "c": "3000", "P": "0.1"}
        ]"#;

        let updates = decoder.decode_batch(Market::Derivative, payload).unwrap();
        let symbols: Vec<&str> = updates.iter().map(|u| u.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["BTCUSDT", "ETHUSDT"]);
        assert!(updates.iter().all(|u| u.market == Market::Derivative));
    }

    #[test]
    fn test_empty_array_yields_no_updates() {
        let decoder = TickerDecoder::new();
        let updates = decoder.decode_batch(Market::Spot, "[]").unwrap();
        assert!(updates.is_empty());
    }
}
