//! Shared domain types for the cryptick market-data pipeline.
//!
//! Defines the normalized price-update record produced by the decoder
//! and consumed by every downstream component, plus the market enum
//! distinguishing the two upstream feeds.

pub mod market;
pub mod update;

pub use market::Market;
pub use update::PriceUpdate;
