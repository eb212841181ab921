//! Main application orchestration.
//!
//! Wires the pipeline end to end: two connection supervisors feed raw
//! batches into one channel, the event loop decodes and filters them,
//! and the dispatcher fans accepted updates out to the ticker
//! aggregator and the alert engine.

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::sinks::{AlertSink, DisplaySink};
use cryptick_alert::{AlertDecision, AlertEngine, PriceAlert};
use cryptick_core::Market;
use cryptick_feed::{SubscriptionFilter, TickerAggregator, TickerDecoder, UpdateDispatcher};
use cryptick_store::{FavoriteCategory, FavoritesManager, JsonFileStore, KeyValueStore, StoreError};
use cryptick_ws::{ConnectionSupervisor, RawBatch};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Both managers persist into the same JSON document.
type SharedStore = Arc<Mutex<JsonFileStore>>;

/// Store key for the persisted display set.
const DISPLAY_KEY: &str = "ticker_symbols";

/// Main application.
pub struct Application {
    config: AppConfig,
    decoder: TickerDecoder,
    filter: SubscriptionFilter,
    dispatcher: UpdateDispatcher,
    aggregator: Arc<Mutex<TickerAggregator>>,
    alerts: Arc<Mutex<AlertEngine<SharedStore>>>,
    favorites: FavoritesManager<SharedStore>,
    store: SharedStore,
    display: Arc<Mutex<Box<dyn DisplaySink>>>,
}

impl Application {
    /// Create a new application with its presentation sinks.
    ///
    /// Opens the persistent store, restores favorites and alerts, and
    /// subscribes every symbol the restored state references so their
    /// updates flow from the first batch onward.
    pub fn new(
        config: AppConfig,
        display: Box<dyn DisplaySink>,
        mut alert_sink: Box<dyn AlertSink>,
    ) -> AppResult<Self> {
        let store: SharedStore = Arc::new(Mutex::new(JsonFileStore::open(&config.store.path)?));

        let favorites = FavoritesManager::load(store.clone());
        let alerts = Arc::new(Mutex::new(AlertEngine::load(
            store.clone(),
            config.alerts.tolerance,
        )));

        // Persisted display set wins over the configured default
        let display_symbols: Vec<String> = store
            .get_value(DISPLAY_KEY)
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_else(|| config.ticker.display_symbols.clone());

        let mut filter = SubscriptionFilter::new();
        for symbol in &display_symbols {
            filter.subscribe(symbol.clone());
        }
        for symbol in favorites.favorites() {
            filter.subscribe(symbol);
        }
        for alert in alerts.lock().active_alerts(None) {
            filter.subscribe(alert.symbol);
        }
        info!(subscriptions = filter.len(), "Subscription set restored");

        let aggregator = Arc::new(Mutex::new(TickerAggregator::new(
            display_symbols,
            config.ticker.viewport_width,
        )));

        let display = Arc::new(Mutex::new(display));
        let mut dispatcher = UpdateDispatcher::new();

        // The sink observes every accepted update, then the aggregator
        // folds it into the ticker text
        let sink = display.clone();
        dispatcher.on_update(move |update| {
            sink.lock().on_update(update);
        });
        let agg = aggregator.clone();
        dispatcher.on_update(move |update| {
            agg.lock().record(update);
        });

        let engine = alerts.clone();
        dispatcher.on_alert_check(move |symbol, price| {
            let mut engine = engine.lock();
            match engine.check_alerts(symbol, price) {
                Ok(hits) => {
                    for hit in hits {
                        if let AlertDecision::Rearm(target) = alert_sink.notify(&hit) {
                            if let Err(e) = engine.set_alert(symbol, target) {
                                warn!(?e, symbol, "Failed to re-arm alert");
                            }
                        }
                    }
                }
                Err(e) => warn!(?e, symbol, "Alert evaluation failed"),
            }
        });

        Ok(Self {
            config,
            decoder: TickerDecoder::new(),
            filter,
            dispatcher,
            aggregator,
            alerts,
            favorites,
            store,
            display,
        })
    }

    /// Subscribe a symbol to the update stream.
    pub fn subscribe(&mut self, symbol: &str) -> AppResult<()> {
        let symbol = normalize_symbol(symbol)?;
        self.filter.subscribe(symbol);
        Ok(())
    }

    /// Unsubscribe a symbol. It is also removed from the ticker, since
    /// a displayed symbol would otherwise never update again.
    pub fn unsubscribe(&mut self, symbol: &str) -> AppResult<()> {
        let symbol = normalize_symbol(symbol)?;
        self.filter.unsubscribe(&symbol);

        let remaining: Vec<String> = self
            .aggregator
            .lock()
            .display_symbols()
            .iter()
            .filter(|s| **s != symbol)
            .cloned()
            .collect();
        if remaining.len() != self.aggregator.lock().display_symbols().len() {
            self.apply_display_symbols(remaining)?;
        }
        Ok(())
    }

    pub fn subscriptions(&self) -> Vec<String> {
        self.filter.symbols()
    }

    /// Replace the ticker display set from a comma-separated list.
    ///
    /// Every displayed symbol is subscribed as well, so the ticker can
    /// never show a symbol whose updates are filtered out.
    pub fn set_display_symbols(&mut self, list: &str) -> AppResult<()> {
        let symbols = parse_symbol_list(list)?;
        for symbol in &symbols {
            self.filter.subscribe(symbol.clone());
        }
        info!(?symbols, "Display set replaced");
        self.apply_display_symbols(symbols)
    }

    /// Persist the display set and rebuild the ticker from it.
    fn apply_display_symbols(&mut self, symbols: Vec<String>) -> AppResult<()> {
        let value = serde_json::to_value(&symbols).map_err(StoreError::Json)?;
        self.store.set_value(DISPLAY_KEY, value)?;
        self.aggregator.lock().set_display_symbols(symbols);
        Ok(())
    }

    /// Mark a symbol as favorite and subscribe it.
    pub fn add_favorite(&mut self, symbol: &str) -> AppResult<()> {
        let symbol = normalize_symbol(symbol)?;
        self.filter.subscribe(symbol.clone());
        self.favorites.add_favorite(symbol)?;
        Ok(())
    }

    pub fn remove_favorite(&mut self, symbol: &str) -> AppResult<()> {
        let symbol = normalize_symbol(symbol)?;
        self.favorites.remove_favorite(&symbol)?;
        Ok(())
    }

    pub fn favorites(&self) -> Vec<String> {
        self.favorites.favorites()
    }

    pub fn create_category(&mut self, name: &str) -> AppResult<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Category name is empty".to_string()));
        }
        Ok(self.favorites.create_category(name)?)
    }

    pub fn categories(&self) -> Vec<FavoriteCategory> {
        self.favorites.categories()
    }

    pub fn export_favorites(&self) -> AppResult<String> {
        Ok(self.favorites.export_json()?)
    }

    pub fn import_favorites(&mut self, payload: &str) -> AppResult<()> {
        self.favorites.import_json(payload)?;
        for symbol in self.favorites.favorites() {
            self.filter.subscribe(symbol);
        }
        Ok(())
    }

    /// Arm a price alert and subscribe its symbol.
    pub fn set_alert(&mut self, symbol: &str, target_price: Decimal) -> AppResult<()> {
        let symbol = normalize_symbol(symbol)?;
        self.alerts.lock().set_alert(symbol.clone(), target_price)?;
        self.filter.subscribe(symbol);
        Ok(())
    }

    pub fn remove_alert(&mut self, symbol: &str, target_price: Decimal) -> AppResult<()> {
        let symbol = normalize_symbol(symbol)?;
        self.alerts.lock().remove_alert(&symbol, target_price)?;
        Ok(())
    }

    pub fn active_alerts(&self, symbol: Option<&str>) -> Vec<PriceAlert> {
        self.alerts.lock().active_alerts(symbol)
    }

    /// Current full ticker line, before windowing.
    pub fn ticker_text(&self) -> String {
        self.aggregator.lock().text().to_string()
    }

    /// Decode one raw batch and push its accepted updates through the
    /// dispatcher. An undecodable batch is dropped whole; it never
    /// affects the connection or previously shown prices.
    pub fn process_batch(&mut self, batch: &RawBatch) {
        let updates = match self.decoder.decode_batch(batch.market, &batch.payload) {
            Ok(updates) => updates,
            Err(e) => {
                debug!(?e, market = %batch.market, "Dropped undecodable batch");
                return;
            }
        };

        for update in updates {
            if self.filter.accepts(&update) {
                self.dispatcher.dispatch(&update);
            }
        }
    }

    /// Run until Ctrl-C.
    pub async fn run(mut self) -> AppResult<()> {
        info!("Starting application");

        let (batch_tx, mut batch_rx) = mpsc::channel::<RawBatch>(1024);

        let spot = Arc::new(ConnectionSupervisor::new(
            self.config.connection_config(Market::Spot),
            batch_tx.clone(),
        ));
        let derivative = Arc::new(ConnectionSupervisor::new(
            self.config.connection_config(Market::Derivative),
            batch_tx,
        ));

        let spot_handle = {
            let supervisor = spot.clone();
            tokio::spawn(async move {
                if let Err(e) = supervisor.run().await {
                    error!(?e, market = %Market::Spot, "Feed connection failed");
                }
            })
        };
        let derivative_handle = {
            let supervisor = derivative.clone();
            tokio::spawn(async move {
                if let Err(e) = supervisor.run().await {
                    error!(?e, market = %Market::Derivative, "Feed connection failed");
                }
            })
        };

        let mut scroll_interval =
            tokio::time::interval(Duration::from_millis(self.config.ticker.tick_interval_ms));

        info!("Entering main event loop");
        loop {
            tokio::select! {
                Some(batch) = batch_rx.recv() => {
                    self.process_batch(&batch);
                }

                _ = scroll_interval.tick() => {
                    let frame = self.aggregator.lock().advance();
                    self.display.lock().render(&frame);
                }

                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        spot.shutdown();
        derivative.shutdown();
        let _ = spot_handle.await;
        let _ = derivative_handle.await;

        info!("Application stopped");
        Ok(())
    }
}

fn normalize_symbol(symbol: &str) -> AppResult<String> {
    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Err(AppError::Validation("Symbol is empty".to_string()));
    }
    Ok(symbol.to_uppercase())
}

/// Parse a comma-separated symbol list, trimming and upper-casing each
/// entry and skipping blanks.
fn parse_symbol_list(list: &str) -> AppResult<Vec<String>> {
    let symbols: Vec<String> = list
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_uppercase)
        .collect();

    if symbols.is_empty() {
        return Err(AppError::Validation(
            "No symbols in display list".to_string(),
        ));
    }
    Ok(symbols)
}
