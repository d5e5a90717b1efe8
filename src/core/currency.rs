//! Currency codes and exchange rate abstractions

use crate::core::rates::RateSnapshot;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub enum Currency {
    Usd,
    Eur,
    Uah,
    Gbp,
    Jpy,
    Cad,
    Aud,
    Chf,
    Cny,
    Sek,
    Nok,
    Pln,
    Czk,
    Try,
}

impl Currency {
    /// Every currency a conversion may be requested for, in display order.
    pub const ALL: [Currency; 14] = [
        Currency::Usd,
        Currency::Eur,
        Currency::Uah,
        Currency::Gbp,
        Currency::Jpy,
        Currency::Cad,
        Currency::Aud,
        Currency::Chf,
        Currency::Cny,
        Currency::Sek,
        Currency::Nok,
        Currency::Pln,
        Currency::Czk,
        Currency::Try,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Uah => "UAH",
            Currency::Gbp => "GBP",
            Currency::Jpy => "JPY",
            Currency::Cad => "CAD",
            Currency::Aud => "AUD",
            Currency::Chf => "CHF",
            Currency::Cny => "CNY",
            Currency::Sek => "SEK",
            Currency::Nok => "NOK",
            Currency::Pln => "PLN",
            Currency::Czk => "CZK",
            Currency::Try => "TRY",
        }
    }

    /// Human readable name, for display only.
    pub fn name(&self) -> &'static str {
        match self {
            Currency::Usd => "US Dollar",
            Currency::Eur => "Euro",
            Currency::Uah => "Ukrainian Hryvnia",
            Currency::Gbp => "Pound Sterling",
            Currency::Jpy => "Japanese Yen",
            Currency::Cad => "Canadian Dollar",
            Currency::Aud => "Australian Dollar",
            Currency::Chf => "Swiss Franc",
            Currency::Cny => "Chinese Yuan",
            Currency::Sek => "Swedish Krona",
            Currency::Nok => "Norwegian Krone",
            Currency::Pln => "Polish Zloty",
            Currency::Czk => "Czech Koruna",
            Currency::Try => "Turkish Lira",
        }
    }

    pub fn is_supported(code: &str) -> bool {
        code.parse::<Currency>().is_ok()
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_uppercase();
        Currency::ALL
            .iter()
            .find(|c| c.code() == code)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("Unsupported currency: {}", s))
    }
}

/// Pairwise rate lookup over a loaded rate table.
///
/// Lookups are total: an unknown pair yields `0.0`, never an error. Callers
/// must treat any rate `<= 0.0` as "no rate available".
pub trait ExchangeRateProvider: Send + Sync {
    fn get_exchange_rate(&self, from: &str, to: &str) -> f64;

    /// Returns an owned copy of the current rate table.
    fn get_all_rates(&self) -> RateSnapshot;
}

/// A remote quote source returning every rate relative to `base`.
#[async_trait]
pub trait RemoteRateSource: Send + Sync {
    async fn fetch_latest(&self, base: &str) -> Result<HashMap<String, f64>>;
}
