//! Ticker decoding, subscription filtering and update fan-out.
//!
//! The pipeline per inbound batch is decode -> filter -> dispatch:
//! [`TickerDecoder`] turns a raw feed batch into normalized updates,
//! [`SubscriptionFilter`] gates them against the subscribed symbols,
//! and [`UpdateDispatcher`] delivers each accepted update to every
//! registered consumer. [`TickerAggregator`] is the display-side
//! consumer that maintains the scrolling ticker text.

pub mod decoder;
pub mod dispatcher;
pub mod error;
pub mod filter;
pub mod ticker;

pub use decoder::TickerDecoder;
pub use dispatcher::UpdateDispatcher;
pub use error::{FeedError, FeedResult};
pub use filter::SubscriptionFilter;
pub use ticker::{scroll_window, TickerAggregator};
