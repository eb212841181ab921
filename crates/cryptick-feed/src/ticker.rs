//! Scrolling ticker aggregation.
//!
//! Maintains the latest-known update per displayed symbol and rebuilds
//! a combined text payload whenever a relevant update arrives. The
//! scrolling itself is a pure windowing function over the concatenated
//! text, advanced on a fixed timer independent of update arrival.

use cryptick_core::PriceUpdate;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Separator between ticker entries, also appended after the last one
/// so the wrap-around point reads cleanly.
const SEPARATOR: &str = "  \u{2022}  ";

/// Wrap-around window of `width` chars starting at `pos`.
///
/// Pure and stateless: the same `(text, pos, width)` always yields the
/// same window. Texts shorter than the viewport are returned whole.
pub fn scroll_window(text: &str, pos: usize, width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return String::new();
    }
    if chars.len() <= width {
        return text.to_string();
    }
    let pos = pos % chars.len();
    chars.iter().cycle().skip(pos).take(width).collect()
}

/// Render a price for the compact display.
///
/// Large prices get thousands separators and 2 decimals, mid-range
/// prices 4 decimals, sub-unit prices 6.
fn format_display_price(price: Decimal) -> String {
    let mut rounded = price;
    if price >= Decimal::from(1000) {
        rounded.rescale(2);
        group_thousands(&rounded.to_string())
    } else if price >= Decimal::ONE {
        rounded.rescale(4);
        rounded.to_string()
    } else {
        rounded.rescale(6);
        rounded.to_string()
    }
}

fn group_thousands(s: &str) -> String {
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s, None),
    };

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(s.len() + digits.len() / 3);
    for (idx, ch) in digits.iter().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*ch);
    }

    match frac_part {
        Some(f) => format!("{grouped}.{f}"),
        None => grouped,
    }
}

/// Aggregates latest prices for the configured display symbols into a
/// single scrolling text payload.
pub struct TickerAggregator {
    display_symbols: Vec<String>,
    latest: HashMap<String, PriceUpdate>,
    text: String,
    scroll_pos: usize,
    viewport_width: usize,
}

impl TickerAggregator {
    pub fn new(display_symbols: Vec<String>, viewport_width: usize) -> Self {
        Self {
            display_symbols,
            latest: HashMap::new(),
            text: String::new(),
            scroll_pos: 0,
            viewport_width,
        }
    }

    /// Symbols currently configured for display.
    pub fn display_symbols(&self) -> &[String] {
        &self.display_symbols
    }

    /// Replace the display set. Latest entries for removed symbols are
    /// dropped and the ticker text is rebuilt from scratch.
    pub fn set_display_symbols(&mut self, symbols: Vec<String>) {
        self.display_symbols = symbols;
        self.latest
            .retain(|symbol, _| self.display_symbols.iter().any(|s| s == symbol));
        self.scroll_pos = 0;
        self.rebuild_text();
    }

    /// Record an update. Returns true (and rebuilds the text) iff the
    /// symbol is in the display set; everything else is ignored here.
    pub fn record(&mut self, update: &PriceUpdate) -> bool {
        if !self.display_symbols.iter().any(|s| s == &update.symbol) {
            return false;
        }
        self.latest.insert(update.symbol.clone(), update.clone());
        self.rebuild_text();
        true
    }

    /// The full (unwindowed) ticker text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Produce the current viewport window and advance the scroll
    /// position by one char, modulo the text length.
    pub fn advance(&mut self) -> String {
        if self.text.is_empty() {
            return String::new();
        }
        let window = scroll_window(&self.text, self.scroll_pos, self.viewport_width);
        self.scroll_pos = (self.scroll_pos + 1) % self.text.chars().count();
        window
    }

    fn rebuild_text(&mut self) {
        let mut entries: Vec<&PriceUpdate> = self.latest.values().collect();
        entries.sort_by(|a, b| a.symbol.cmp(&b.symbol));

        if entries.is_empty() {
            self.text.clear();
            self.scroll_pos = 0;
            return;
        }

        let parts: Vec<String> = entries
            .iter()
            .map(|update| {
                let arrow = if update.percent_change >= 0.0 {
                    '\u{2197}'
                } else {
                    '\u{2198}'
                };
                let price = update
                    .numeric_price()
                    .map(format_display_price)
                    .unwrap_or_else(|| update.price.clone());
                format!(
                    "{}: ${} {}{:.2}%",
                    update.symbol, price, arrow, update.percent_change
                )
            })
            .collect();

        self.text = parts.join(SEPARATOR) + SEPARATOR;
        self.scroll_pos %= self.text.chars().count();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cryptick_core::Market;
    use rust_decimal_macros::dec;

    fn update(symbol: &str, price: Decimal, change: f64) -> PriceUpdate {
        PriceUpdate::new(symbol, price, change, Market::Spot)
    }

    fn aggregator(symbols: &[&str]) -> TickerAggregator {
        TickerAggregator::new(symbols.iter().map(|s| s.to_string()).collect(), 80)
    }

    #[test]
    fn test_scroll_window_short_text_returned_whole() {
        assert_eq!(scroll_window("abc", 0, 10), "abc");
        assert_eq!(scroll_window("abc", 2, 10), "abc");
    }

    #[test]
    fn test_scroll_window_wraps_around() {
        assert_eq!(scroll_window("abcdef", 0, 4), "abcd");
        assert_eq!(scroll_window("abcdef", 4, 4), "efab");
        // Position is taken modulo the text length
        assert_eq!(scroll_window("abcdef", 10, 4), "efab");
    }

    #[test]
    fn test_scroll_window_is_char_based() {
        // Multibyte separator chars must not split
        let text = "a\u{2022}b\u{2022}";
        assert_eq!(scroll_window(text, 1, 2), "\u{2022}b");
        assert_eq!(scroll_window(text, 3, 2), "\u{2022}a");
    }

    #[test]
    fn test_format_display_price_tiers() {
        assert_eq!(format_display_price(dec!(50123.456)), "50,123.46");
        assert_eq!(format_display_price(dec!(1234567)), "1,234,567.00");
        assert_eq!(format_display_price(dec!(1000)), "1,000.00");
        assert_eq!(format_display_price(dec!(3.14159)), "3.1416");
        assert_eq!(format_display_price(dec!(0.1234567)), "0.123457");
    }

    #[test]
    fn test_text_contains_only_displayed_symbols_sorted() {
        let mut agg = aggregator(&["ETHUSDT", "BTCUSDT"]);

        agg.record(&update("ETHUSDT", dec!(3000), -1.0));
        agg.record(&update("BTCUSDT", dec!(50000), 2.5));
        assert!(!agg.record(&update("SOLUSDT", dec!(150), 0.0)));

        let text = agg.text();
        assert!(!text.contains("SOLUSDT"));
        let btc_pos = text.find("BTCUSDT").unwrap();
        let eth_pos = text.find("ETHUSDT").unwrap();
        assert!(btc_pos < eth_pos, "entries must be sorted ascending");
    }

    #[test]
    fn test_entry_rendering() {
        let mut agg = aggregator(&["BTCUSDT"]);
        agg.record(&update("BTCUSDT", dec!(50000), 2.5));
        assert_eq!(
            agg.text(),
            "BTCUSDT: $50,000.00 \u{2197}2.50%  \u{2022}  "
        );

        agg.record(&update("BTCUSDT", dec!(49000), -0.5));
        assert_eq!(
            agg.text(),
            "BTCUSDT: $49,000.00 \u{2198}-0.50%  \u{2022}  "
        );
    }

    #[test]
    fn test_latest_update_replaces_previous() {
        let mut agg = aggregator(&["BTCUSDT"]);
        agg.record(&update("BTCUSDT", dec!(50000), 2.5));
        agg.record(&update("BTCUSDT", dec!(51000), 3.0));

        assert!(agg.text().contains("51,000.00"));
        assert!(!agg.text().contains("50,000.00"));
    }

    #[test]
    fn test_display_set_change_drops_removed_symbols() {
        let mut agg = aggregator(&["BTCUSDT", "ETHUSDT"]);
        agg.record(&update("BTCUSDT", dec!(50000), 2.5));
        agg.record(&update("ETHUSDT", dec!(3000), -1.0));

        agg.set_display_symbols(vec!["ETHUSDT".to_string()]);
        assert!(!agg.text().contains("BTCUSDT"));
        assert!(agg.text().contains("ETHUSDT"));
    }

    #[test]
    fn test_advance_cycles_deterministically() {
        let mut agg = TickerAggregator::new(vec!["BTCUSDT".to_string()], 10);
        agg.record(&update("BTCUSDT", dec!(50000), 2.5));

        let len = agg.text().chars().count();
        let first = agg.advance();
        assert_eq!(first.chars().count(), 10);

        // After a full cycle the window repeats
        for _ in 0..len - 1 {
            agg.advance();
        }
        assert_eq!(agg.advance(), first);
    }

    #[test]
    fn test_empty_aggregator_advances_to_empty() {
        let mut agg = aggregator(&["BTCUSDT"]);
        assert_eq!(agg.advance(), "");
    }
}
