use std::sync::Arc;
use tracing::{debug, info};

use crate::core::cache::RateCache;
use crate::core::currency::ExchangeRateProvider;
use crate::core::rates::RateSnapshot;

/// Where an offline table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateOrigin {
    Cache,
    Static,
}

/// A read-only table loaded once from the cache, or the built-in static
/// rates when nothing is cached. Never touches the network.
#[derive(Debug, Clone)]
pub struct OfflineRateProvider {
    snapshot: Arc<RateSnapshot>,
    origin: RateOrigin,
}

impl OfflineRateProvider {
    pub fn new(cache: &RateCache) -> Self {
        let cached = cache.load();
        if cached.is_empty() {
            info!("No cached rates available, using built-in rates");
            return Self::from_snapshot(RateSnapshot::builtin(), RateOrigin::Static);
        }
        debug!("Offline provider using {} cached rates", cached.rates.len());
        Self::from_snapshot(cached, RateOrigin::Cache)
    }

    pub fn from_snapshot(snapshot: RateSnapshot, origin: RateOrigin) -> Self {
        Self {
            snapshot: Arc::new(snapshot),
            origin,
        }
    }

    pub fn origin(&self) -> RateOrigin {
        self.origin
    }
}

impl ExchangeRateProvider for OfflineRateProvider {
    fn get_exchange_rate(&self, from: &str, to: &str) -> f64 {
        self.snapshot.exchange_rate(from, to)
    }

    fn get_all_rates(&self) -> RateSnapshot {
        RateSnapshot::clone(&self.snapshot)
    }
}
