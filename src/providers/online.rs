use chrono::{Local, NaiveDateTime};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

use crate::core::cache::RateCache;
use crate::core::currency::{ExchangeRateProvider, RemoteRateSource};
use crate::core::rates::{RateSnapshot, sanitize_rates};

struct OnlineState {
    snapshot: Arc<RateSnapshot>,
    last_fetch: Option<NaiveDateTime>,
}

/// Rates fetched from a remote source, falling back to the on-disk cache.
///
/// Clones share state, so a clone handed to a background task refreshes the
/// table every other clone reads from.
#[derive(Clone)]
pub struct OnlineRateProvider {
    source: Arc<dyn RemoteRateSource>,
    cache: RateCache,
    base_currency: String,
    state: Arc<RwLock<OnlineState>>,
}

impl OnlineRateProvider {
    pub fn new(source: Arc<dyn RemoteRateSource>, cache: RateCache, base_currency: &str) -> Self {
        let base_currency = base_currency.trim().to_uppercase();
        let state = OnlineState {
            snapshot: Arc::new(RateSnapshot::new(&base_currency, Default::default())),
            last_fetch: None,
        };
        OnlineRateProvider {
            source,
            cache,
            base_currency,
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Refreshes the table from the remote source.
    ///
    /// Returns `true` only for a fresh remote table. On failure the cached
    /// table is adopted if there is one, and `false` is returned either way.
    pub async fn fetch_rates(&self) -> bool {
        match self.source.fetch_latest(&self.base_currency).await {
            Ok(rates) => {
                let rates = sanitize_rates(rates);
                if rates.is_empty() {
                    warn!("Remote source returned no usable rates");
                    self.load_cached();
                    return false;
                }

                let now = Local::now().naive_local();
                let snapshot =
                    RateSnapshot::new(&self.base_currency, rates).with_captured_at(Some(now));
                self.cache.save(&snapshot);
                self.replace(snapshot, Some(now));
                info!("Rates updated from remote source");
                true
            }
            Err(e) => {
                warn!("Failed to fetch rates: {e:#}");
                if self.load_cached() {
                    info!("Using cached rates");
                }
                false
            }
        }
    }

    /// Adopts the cached table without touching the network. The last fetch
    /// time is left alone since cached data is never fresh.
    pub fn load_cached(&self) -> bool {
        let cached = self.cache.load();
        if cached.is_empty() {
            debug!("No cached rates, keeping current table");
            return false;
        }
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.snapshot = Arc::new(cached);
        true
    }

    pub fn last_fetch(&self) -> Option<NaiveDateTime> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .last_fetch
    }

    pub fn cache(&self) -> &RateCache {
        &self.cache
    }

    fn current(&self) -> Arc<RateSnapshot> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&state.snapshot)
    }

    fn replace(&self, snapshot: RateSnapshot, fetched_at: Option<NaiveDateTime>) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.snapshot = Arc::new(snapshot);
        state.last_fetch = fetched_at;
    }
}

impl ExchangeRateProvider for OnlineRateProvider {
    fn get_exchange_rate(&self, from: &str, to: &str) -> f64 {
        self.current().exchange_rate(from, to)
    }

    fn get_all_rates(&self) -> RateSnapshot {
        RateSnapshot::clone(&self.current())
    }
}
