//! Favorites and category management.
//!
//! Favorites are a flat set of symbols; categories are named, ordered
//! symbol lists layered on top. Every mutation is persisted through
//! the store and followed by the change notifier so dependent views
//! can refresh.

use crate::error::{StoreError, StoreResult};
use crate::kv::KeyValueStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{info, warn};

const FAVORITES_KEY: &str = "favorites";
const CATEGORIES_KEY: &str = "categories";

/// A named group of favorite symbols.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoriteCategory {
    pub id: String,
    pub name: String,
    pub symbols: Vec<String>,
    /// Persisted as an RFC 3339 string and restored on load.
    pub created_at: DateTime<Utc>,
}

/// Payload shape for export/import. Import is strict: a payload that
/// does not match this shape is rejected as a whole.
#[derive(Debug, Serialize, Deserialize)]
struct TransferPayload {
    favorites: Vec<String>,
    categories: Vec<FavoriteCategory>,
    #[serde(default)]
    exported_at: Option<DateTime<Utc>>,
}

/// Owns the favorites set and its categories.
pub struct FavoritesManager<S: KeyValueStore> {
    favorites: HashSet<String>,
    categories: HashMap<String, FavoriteCategory>,
    store: S,
    change_notifier: Option<Box<dyn Fn() + Send>>,
}

impl<S: KeyValueStore> FavoritesManager<S> {
    /// Load persisted favorites and categories from the store.
    pub fn load(store: S) -> Self {
        let favorites: HashSet<String> = decode_or_default(&store, FAVORITES_KEY);
        let categories_list: Vec<FavoriteCategory> = decode_or_default(&store, CATEGORIES_KEY);
        let categories = categories_list
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect::<HashMap<_, _>>();

        info!(
            favorites = favorites.len(),
            categories = categories.len(),
            "Loaded favorites"
        );

        Self {
            favorites,
            categories,
            store,
            change_notifier: None,
        }
    }

    /// Register the callback invoked after every favorites mutation.
    pub fn on_change<F>(&mut self, notifier: F)
    where
        F: Fn() + Send + 'static,
    {
        self.change_notifier = Some(Box::new(notifier));
    }

    pub fn add_favorite(&mut self, symbol: impl Into<String>) -> StoreResult<()> {
        let symbol = symbol.into();
        if !self.favorites.insert(symbol.clone()) {
            return Ok(());
        }
        info!(%symbol, "Added favorite");
        self.save_favorites()?;
        self.notify();
        Ok(())
    }

    /// Remove a favorite and drop it from every category that
    /// referenced it, as one atomic state change.
    pub fn remove_favorite(&mut self, symbol: &str) -> StoreResult<()> {
        if !self.favorites.remove(symbol) {
            return Ok(());
        }
        for category in self.categories.values_mut() {
            category.symbols.retain(|s| s != symbol);
        }
        info!(symbol, "Removed favorite");
        self.save_favorites()?;
        self.save_categories()?;
        self.notify();
        Ok(())
    }

    pub fn is_favorite(&self, symbol: &str) -> bool {
        self.favorites.contains(symbol)
    }

    pub fn favorites(&self) -> Vec<String> {
        let mut list: Vec<String> = self.favorites.iter().cloned().collect();
        list.sort();
        list
    }

    pub fn create_category(&mut self, name: impl Into<String>) -> StoreResult<String> {
        let category = FavoriteCategory {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            symbols: Vec::new(),
            created_at: Utc::now(),
        };
        let id = category.id.clone();
        info!(name = %category.name, "Created category");
        self.categories.insert(id.clone(), category);
        self.save_categories()?;
        self.notify();
        Ok(id)
    }

    pub fn remove_category(&mut self, category_id: &str) -> StoreResult<()> {
        if self.categories.remove(category_id).is_none() {
            return Ok(());
        }
        info!(category_id, "Removed category");
        self.save_categories()?;
        self.notify();
        Ok(())
    }

    pub fn rename_category(&mut self, category_id: &str, new_name: impl Into<String>) -> StoreResult<()> {
        let Some(category) = self.categories.get_mut(category_id) else {
            return Ok(());
        };
        category.name = new_name.into();
        self.save_categories()?;
        self.notify();
        Ok(())
    }

    /// Add a symbol to a category; the symbol becomes a favorite first
    /// if it is not one already.
    pub fn add_to_category(&mut self, category_id: &str, symbol: &str) -> StoreResult<()> {
        if !self.categories.contains_key(category_id) {
            return Ok(());
        }
        if !self.favorites.contains(symbol) {
            self.add_favorite(symbol)?;
        }

        let Some(category) = self.categories.get_mut(category_id) else {
            return Ok(());
        };
        if !category.symbols.iter().any(|s| s == symbol) {
            category.symbols.push(symbol.to_string());
            self.save_categories()?;
            self.notify();
        }
        Ok(())
    }

    pub fn remove_from_category(&mut self, category_id: &str, symbol: &str) -> StoreResult<()> {
        let Some(category) = self.categories.get_mut(category_id) else {
            return Ok(());
        };
        let before = category.symbols.len();
        category.symbols.retain(|s| s != symbol);
        if category.symbols.len() != before {
            self.save_categories()?;
            self.notify();
        }
        Ok(())
    }

    pub fn categories(&self) -> Vec<FavoriteCategory> {
        let mut list: Vec<FavoriteCategory> = self.categories.values().cloned().collect();
        list.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        list
    }

    pub fn category(&self, category_id: &str) -> Option<&FavoriteCategory> {
        self.categories.get(category_id)
    }

    pub fn category_by_name(&self, name: &str) -> Option<&FavoriteCategory> {
        self.categories.values().find(|c| c.name == name)
    }

    pub fn symbols_in_category(&self, category_id: &str) -> Vec<String> {
        self.categories
            .get(category_id)
            .map(|c| c.symbols.clone())
            .unwrap_or_default()
    }

    /// Favorites that belong to no category.
    pub fn uncategorized_symbols(&self) -> Vec<String> {
        let categorized: HashSet<&String> = self
            .categories
            .values()
            .flat_map(|c| c.symbols.iter())
            .collect();
        let mut list: Vec<String> = self
            .favorites
            .iter()
            .filter(|s| !categorized.contains(s))
            .cloned()
            .collect();
        list.sort();
        list
    }

    pub fn clear_all(&mut self) -> StoreResult<()> {
        self.favorites.clear();
        self.categories.clear();
        self.save_favorites()?;
        self.save_categories()?;
        self.notify();
        info!("Cleared all favorites");
        Ok(())
    }

    /// Export favorites and categories as pretty JSON.
    pub fn export_json(&self) -> StoreResult<String> {
        let payload = TransferPayload {
            favorites: self.favorites(),
            categories: self.categories(),
            exported_at: Some(Utc::now()),
        };
        Ok(serde_json::to_string_pretty(&payload)?)
    }

    /// Import favorites and categories, replacing the current state.
    ///
    /// All-or-nothing: a malformed payload leaves the prior state
    /// completely unchanged and surfaces [`StoreError::Import`].
    pub fn import_json(&mut self, payload: &str) -> StoreResult<()> {
        let parsed: TransferPayload = serde_json::from_str(payload)
            .map_err(|e| StoreError::Import(format!("Malformed payload: {e}")))?;

        self.favorites = parsed.favorites.into_iter().collect();
        self.categories = parsed
            .categories
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();

        self.save_favorites()?;
        self.save_categories()?;
        self.notify();
        info!(
            favorites = self.favorites.len(),
            categories = self.categories.len(),
            "Imported favorites"
        );
        Ok(())
    }

    fn save_favorites(&mut self) -> StoreResult<()> {
        let list = self.favorites();
        self.store.set_value(FAVORITES_KEY, serde_json::to_value(list)?)
    }

    fn save_categories(&mut self) -> StoreResult<()> {
        let list = self.categories();
        self.store.set_value(CATEGORIES_KEY, serde_json::to_value(list)?)
    }

    fn notify(&self) {
        if let Some(notifier) = &self.change_notifier {
            notifier();
        }
    }
}

fn decode_or_default<T: Default + serde::de::DeserializeOwned>(
    store: &impl KeyValueStore,
    key: &str,
) -> T {
    match store.get_value(key) {
        None => T::default(),
        Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
            warn!(key, ?e, "Unreadable stored value, using default");
            T::default()
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_add_favorite_idempotent() {
        let mut mgr = FavoritesManager::load(MemoryStore::new());
        mgr.add_favorite("BTCUSDT").unwrap();
        mgr.add_favorite("BTCUSDT").unwrap();
        assert_eq!(mgr.favorites(), vec!["BTCUSDT"]);
    }

    #[test]
    fn test_remove_favorite_cascades_to_categories() {
        let mut mgr = FavoritesManager::load(MemoryStore::new());
        let majors = mgr.create_category("Majors").unwrap();
        let defi = mgr.create_category("DeFi").unwrap();
        mgr.add_to_category(&majors, "BTCUSDT").unwrap();
        mgr.add_to_category(&defi, "BTCUSDT").unwrap();
        mgr.add_to_category(&majors, "ETHUSDT").unwrap();

        mgr.remove_favorite("BTCUSDT").unwrap();

        assert!(!mgr.is_favorite("BTCUSDT"));
        assert!(mgr.symbols_in_category(&majors).iter().all(|s| s != "BTCUSDT"));
        assert!(mgr.symbols_in_category(&defi).is_empty());
        assert_eq!(mgr.symbols_in_category(&majors), vec!["ETHUSDT"]);
    }

    #[test]
    fn test_add_to_category_makes_favorite() {
        let mut mgr = FavoritesManager::load(MemoryStore::new());
        let id = mgr.create_category("Majors").unwrap();
        mgr.add_to_category(&id, "SOLUSDT").unwrap();
        assert!(mgr.is_favorite("SOLUSDT"));
    }

    #[test]
    fn test_uncategorized_symbols() {
        let mut mgr = FavoritesManager::load(MemoryStore::new());
        mgr.add_favorite("BTCUSDT").unwrap();
        mgr.add_favorite("ADAUSDT").unwrap();
        let id = mgr.create_category("Majors").unwrap();
        mgr.add_to_category(&id, "BTCUSDT").unwrap();

        assert_eq!(mgr.uncategorized_symbols(), vec!["ADAUSDT"]);
    }

    #[test]
    fn test_state_survives_reload() {
        let shared = Arc::new(parking_lot::Mutex::new(MemoryStore::new()));

        {
            let mut mgr = FavoritesManager::load(shared.clone());
            mgr.add_favorite("BTCUSDT").unwrap();
            let id = mgr.create_category("Majors").unwrap();
            mgr.add_to_category(&id, "BTCUSDT").unwrap();
        }

        let mgr = FavoritesManager::load(shared);
        assert!(mgr.is_favorite("BTCUSDT"));
        let majors = mgr.category_by_name("Majors").unwrap();
        assert_eq!(majors.symbols, vec!["BTCUSDT"]);
    }

    #[test]
    fn test_export_import_round_trip() {
        let mut source = FavoritesManager::load(MemoryStore::new());
        source.add_favorite("BTCUSDT").unwrap();
        let id = source.create_category("Majors").unwrap();
        source.add_to_category(&id, "BTCUSDT").unwrap();
        let exported = source.export_json().unwrap();

        let mut target = FavoritesManager::load(MemoryStore::new());
        target.import_json(&exported).unwrap();

        assert!(target.is_favorite("BTCUSDT"));
        let majors = target.category_by_name("Majors").unwrap();
        assert_eq!(majors.symbols, vec!["BTCUSDT"]);
        assert_eq!(majors.created_at, source.category(&id).unwrap().created_at);
    }

    #[test]
    fn test_malformed_import_leaves_state_unchanged() {
        let mut mgr = FavoritesManager::load(MemoryStore::new());
        mgr.add_favorite("BTCUSDT").unwrap();
        let id = mgr.create_category("Majors").unwrap();
        mgr.add_to_category(&id, "BTCUSDT").unwrap();

        for payload in ["not json", r#"{"favorites": "BTCUSDT"}"#, r#"{"favorites": []}"#] {
            let err = mgr.import_json(payload).unwrap_err();
            assert!(matches!(err, StoreError::Import(_)), "payload: {payload}");
        }

        assert_eq!(mgr.favorites(), vec!["BTCUSDT"]);
        assert_eq!(mgr.symbols_in_category(&id), vec!["BTCUSDT"]);
    }

    #[test]
    fn test_change_notifier_fires_on_mutation() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut mgr = FavoritesManager::load(MemoryStore::new());
        let seen = count.clone();
        mgr.on_change(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        mgr.add_favorite("BTCUSDT").unwrap();
        mgr.add_favorite("BTCUSDT").unwrap(); // no-op, no notification
        mgr.remove_favorite("BTCUSDT").unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
