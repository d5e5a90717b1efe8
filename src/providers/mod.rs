//! Rate providers and the remote sources behind them

pub mod exchange_rate_api;
pub mod offline;
pub mod online;

use anyhow::Result;
use chrono::NaiveDateTime;
use std::sync::Arc;
use tracing::debug;

use crate::core::cache::RateCache;
use crate::core::config::{AppConfig, ProviderConfig};
use crate::core::currency::ExchangeRateProvider;
use crate::core::rates::RateSnapshot;
use exchange_rate_api::ExchangeRateApi;
pub use offline::{OfflineRateProvider, RateOrigin};
pub use online::OnlineRateProvider;

/// The rate provider installed in a conversion engine.
#[derive(Clone)]
pub enum RateProvider {
    Online(OnlineRateProvider),
    Offline(OfflineRateProvider),
}

impl RateProvider {
    pub fn is_online(&self) -> bool {
        matches!(self, RateProvider::Online(_))
    }

    /// Refreshes an online provider. Offline providers never refresh.
    pub async fn fetch_rates(&self) -> bool {
        match self {
            RateProvider::Online(provider) => provider.fetch_rates().await,
            RateProvider::Offline(_) => {
                debug!("Offline provider, skipping refresh");
                false
            }
        }
    }

    /// When the current table was captured, if known.
    pub fn last_update(&self) -> Option<NaiveDateTime> {
        self.get_all_rates().captured_at
    }

    pub fn label(&self) -> &'static str {
        match self {
            RateProvider::Online(_) => "online",
            RateProvider::Offline(p) => match p.origin() {
                RateOrigin::Cache => "offline (cached rates)",
                RateOrigin::Static => "offline (built-in rates)",
            },
        }
    }
}

impl ExchangeRateProvider for RateProvider {
    fn get_exchange_rate(&self, from: &str, to: &str) -> f64 {
        match self {
            RateProvider::Online(p) => p.get_exchange_rate(from, to),
            RateProvider::Offline(p) => p.get_exchange_rate(from, to),
        }
    }

    fn get_all_rates(&self) -> RateSnapshot {
        match self {
            RateProvider::Online(p) => p.get_all_rates(),
            RateProvider::Offline(p) => p.get_all_rates(),
        }
    }
}

impl From<OnlineRateProvider> for RateProvider {
    fn from(provider: OnlineRateProvider) -> Self {
        RateProvider::Online(provider)
    }
}

impl From<OfflineRateProvider> for RateProvider {
    fn from(provider: OfflineRateProvider) -> Self {
        RateProvider::Offline(provider)
    }
}

/// Builds providers that share one cache file, for start-up and for
/// switching modes mid-session.
#[derive(Debug, Clone)]
pub struct ProviderFactory {
    config: ProviderConfig,
    cache: RateCache,
}

impl ProviderFactory {
    pub fn new(config: ProviderConfig, cache: RateCache) -> Self {
        Self { config, cache }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let cache = RateCache::new(config.cache_path()?);
        Ok(Self::new(config.provider.clone(), cache))
    }

    /// An online provider, primed from the cache so it is usable before
    /// its first refresh.
    pub fn online(&self) -> Result<RateProvider> {
        let api = ExchangeRateApi::new(&self.config.base_url, self.config.timeout())?;
        let provider =
            OnlineRateProvider::new(Arc::new(api), self.cache.clone(), &self.config.base_currency);
        provider.load_cached();
        Ok(provider.into())
    }

    pub fn offline(&self) -> RateProvider {
        OfflineRateProvider::new(&self.cache).into()
    }

    pub fn build(&self, offline: bool) -> Result<RateProvider> {
        if offline {
            Ok(self.offline())
        } else {
            self.online()
        }
    }

    pub fn cache(&self) -> &RateCache {
        &self.cache
    }
}
