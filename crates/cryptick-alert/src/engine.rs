//! Alert storage and evaluation.

use crate::error::{AlertError, AlertResult};
use chrono::{DateTime, Utc};
use cryptick_store::KeyValueStore;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, warn};

const ALERTS_KEY: &str = "price_alerts";

/// Default relative tolerance band: 0.1%, the feed's tick granularity.
pub const DEFAULT_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 3);

/// One price target on one symbol.
///
/// Triggered alerts are flagged inactive rather than deleted, keeping
/// history for audit; an inactive alert never fires again unless the
/// user re-arms it by creating a new one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceAlert {
    pub symbol: String,
    pub target_price: Decimal,
    /// Persisted as an RFC 3339 string and restored on load.
    pub created_at: DateTime<Utc>,
    pub active: bool,
}

/// A trigger event handed to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggeredAlert {
    pub symbol: String,
    pub target_price: Decimal,
    pub current_price: Decimal,
}

/// User decision after an alert fired.
///
/// The engine never re-arms by itself; `Rearm` is relayed back through
/// [`AlertEngine::set_alert`] by the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AlertDecision {
    /// Leave the alert deactivated.
    Dismiss,
    /// Arm a new alert at this target for the same symbol.
    Rearm(Decimal),
}

/// Holds all alerts and evaluates dispatched updates against them.
pub struct AlertEngine<S: KeyValueStore> {
    alerts: HashMap<String, Vec<PriceAlert>>,
    tolerance: Decimal,
    store: S,
}

impl<S: KeyValueStore> AlertEngine<S> {
    /// Load persisted alerts with the given tolerance band.
    pub fn load(store: S, tolerance: Decimal) -> Self {
        let alerts: HashMap<String, Vec<PriceAlert>> = match store.get_value(ALERTS_KEY) {
            None => HashMap::new(),
            Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
                warn!(?e, "Unreadable stored alerts, starting empty");
                HashMap::new()
            }),
        };

        info!(symbols = alerts.len(), "Loaded price alerts");
        Self {
            alerts,
            tolerance,
            store,
        }
    }

    /// Append a new active alert for the symbol.
    ///
    /// A symbol may carry many concurrent alerts at different targets.
    pub fn set_alert(&mut self, symbol: impl Into<String>, target_price: Decimal) -> AlertResult<()> {
        if target_price <= Decimal::ZERO {
            return Err(AlertError::InvalidTarget(target_price.to_string()));
        }

        let symbol = symbol.into();
        let alert = PriceAlert {
            symbol: symbol.clone(),
            target_price,
            created_at: Utc::now(),
            active: true,
        };
        self.alerts.entry(symbol.clone()).or_default().push(alert);
        self.save()?;
        info!(%symbol, target = %target_price, "Alert set");
        Ok(())
    }

    /// Delete the first active alert matching the target. Idempotent on
    /// absence; the symbol entry is dropped once its list empties.
    pub fn remove_alert(&mut self, symbol: &str, target_price: Decimal) -> AlertResult<()> {
        let Some(list) = self.alerts.get_mut(symbol) else {
            return Ok(());
        };
        let Some(idx) = list
            .iter()
            .position(|a| a.target_price == target_price && a.active)
        else {
            return Ok(());
        };

        list.remove(idx);
        if list.is_empty() {
            self.alerts.remove(symbol);
        }
        self.save()?;
        info!(symbol, target = %target_price, "Alert removed");
        Ok(())
    }

    /// Flag the first active alert matching the target inactive.
    pub fn deactivate(&mut self, symbol: &str, target_price: Decimal) -> AlertResult<()> {
        let Some(alert) = self.alerts.get_mut(symbol).and_then(|list| {
            list.iter_mut()
                .find(|a| a.target_price == target_price && a.active)
        }) else {
            return Ok(());
        };

        alert.active = false;
        self.save()?;
        info!(symbol, target = %target_price, "Alert deactivated");
        Ok(())
    }

    /// Evaluate every active alert on the symbol against the current
    /// price. Triggered alerts are deactivated immediately, before the
    /// caller sees them, so an in-band price cannot refire on the next
    /// tick.
    pub fn check_alerts(
        &mut self,
        symbol: &str,
        current_price: Decimal,
    ) -> AlertResult<Vec<TriggeredAlert>> {
        let tolerance = self.tolerance;
        let Some(list) = self.alerts.get_mut(symbol) else {
            return Ok(Vec::new());
        };

        let mut triggered = Vec::new();
        for alert in list.iter_mut().filter(|a| a.active) {
            let relative_gap =
                (current_price - alert.target_price).abs() / alert.target_price;
            if relative_gap < tolerance {
                alert.active = false;
                triggered.push(TriggeredAlert {
                    symbol: symbol.to_string(),
                    target_price: alert.target_price,
                    current_price,
                });
            }
        }

        if !triggered.is_empty() {
            self.save()?;
            for hit in &triggered {
                info!(
                    symbol = %hit.symbol,
                    target = %hit.target_price,
                    current = %hit.current_price,
                    "Alert triggered"
                );
            }
        }

        Ok(triggered)
    }

    /// All alerts, active and inactive.
    pub fn alerts(&self) -> &HashMap<String, Vec<PriceAlert>> {
        &self.alerts
    }

    /// Active alerts, optionally restricted to one symbol.
    pub fn active_alerts(&self, symbol: Option<&str>) -> Vec<PriceAlert> {
        match symbol {
            Some(symbol) => self
                .alerts
                .get(symbol)
                .map(|list| list.iter().filter(|a| a.active).cloned().collect())
                .unwrap_or_default(),
            None => self
                .alerts
                .values()
                .flat_map(|list| list.iter().filter(|a| a.active).cloned())
                .collect(),
        }
    }

    pub fn clear_symbol(&mut self, symbol: &str) -> AlertResult<()> {
        if self.alerts.remove(symbol).is_some() {
            self.save()?;
            info!(symbol, "Cleared symbol alerts");
        }
        Ok(())
    }

    pub fn clear_all(&mut self) -> AlertResult<()> {
        self.alerts.clear();
        self.save()?;
        info!("Cleared all alerts");
        Ok(())
    }

    fn save(&mut self) -> AlertResult<()> {
        let value = serde_json::to_value(&self.alerts)?;
        self.store.set_value(ALERTS_KEY, value)?;
        Ok(())
    }
}
