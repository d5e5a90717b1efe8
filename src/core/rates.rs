//! Rate tables and cross-rate calculation

use chrono::NaiveDateTime;
use std::collections::HashMap;

pub const DEFAULT_BASE_CURRENCY: &str = "USD";

/// Built-in rates against USD, used when no cached table exists.
const STATIC_RATES: [(&str, f64); 15] = [
    ("USD", 1.0),
    ("EUR", 0.85),
    ("UAH", 37.0),
    ("GBP", 0.73),
    ("JPY", 110.0),
    ("CAD", 1.25),
    ("AUD", 1.35),
    ("CHF", 0.92),
    ("CNY", 6.45),
    ("SEK", 8.75),
    ("NOK", 8.95),
    ("PLN", 3.85),
    ("CZK", 21.5),
    ("TRY", 8.25),
    ("RUB", 75.0),
];

/// A table of multipliers relative to `base_currency`.
///
/// A multiplier of `0.0` means the rate is unknown.
#[derive(Debug, Clone, PartialEq)]
pub struct RateSnapshot {
    pub base_currency: String,
    pub rates: HashMap<String, f64>,
    pub captured_at: Option<NaiveDateTime>,
}

impl RateSnapshot {
    pub fn new(base_currency: &str, rates: HashMap<String, f64>) -> Self {
        RateSnapshot {
            base_currency: base_currency.to_string(),
            rates,
            captured_at: None,
        }
    }

    pub fn empty() -> Self {
        Self::new(DEFAULT_BASE_CURRENCY, HashMap::new())
    }

    pub fn builtin() -> Self {
        let rates = STATIC_RATES
            .iter()
            .map(|(code, rate)| (code.to_string(), *rate))
            .collect();
        Self::new(DEFAULT_BASE_CURRENCY, rates)
    }

    pub fn with_captured_at(mut self, captured_at: Option<NaiveDateTime>) -> Self {
        self.captured_at = captured_at;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    fn rate_of(&self, code: &str) -> f64 {
        self.rates.get(code).copied().unwrap_or(0.0)
    }

    /// Cross rate from `from` to `to`, triangulated through the base currency.
    ///
    /// Returns `1.0` for identical codes and `0.0` whenever either leg is
    /// missing or zero. A missing code and a zero multiplier are
    /// indistinguishable here.
    pub fn exchange_rate(&self, from: &str, to: &str) -> f64 {
        if from == to {
            return 1.0;
        }
        if self.rates.is_empty() {
            return 0.0;
        }

        if from == self.base_currency {
            return self.rate_of(to);
        }
        if to == self.base_currency {
            let from_rate = self.rate_of(from);
            return if from_rate == 0.0 { 0.0 } else { 1.0 / from_rate };
        }

        let from_rate = self.rate_of(from);
        let to_rate = self.rate_of(to);
        if from_rate == 0.0 || to_rate == 0.0 {
            return 0.0;
        }
        to_rate / from_rate
    }
}

impl Default for RateSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

/// Drops multipliers that can never be valid rates.
pub fn sanitize_rates(rates: HashMap<String, f64>) -> HashMap<String, f64> {
    rates
        .into_iter()
        .filter(|(code, rate)| {
            let keep = rate.is_finite() && *rate >= 0.0;
            if !keep {
                tracing::debug!("Discarding invalid rate {} for {}", rate, code);
            }
            keep
        })
        .collect()
}
