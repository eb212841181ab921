//! Key-value persistence and favorites management.
//!
//! The store is a flat key -> JSON value blob keeping user state
//! (favorites, categories, price alerts, display symbols) across
//! restarts. Absent keys read as empty defaults. Timestamps are
//! persisted as RFC 3339 strings and restored on load.

pub mod error;
pub mod favorites;
pub mod kv;

pub use error::{StoreError, StoreResult};
pub use favorites::{FavoriteCategory, FavoritesManager};
pub use kv::{JsonFileStore, KeyValueStore, MemoryStore};
