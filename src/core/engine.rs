//! Amount validation, conversion and history bookkeeping.
use crate::core::currency::{Currency, ExchangeRateProvider};
use crate::core::history::{ConversionHistory, ConversionRecord};
use crate::core::rates::RateSnapshot;
use crate::providers::RateProvider;
use chrono::Local;
use thiserror::Error;
use tracing::debug;

/// Why a conversion was refused.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    #[error("Invalid amount: {0:?}")]
    InvalidAmount(String),

    #[error("Amount cannot be negative: {0}")]
    NegativeAmount(f64),

    /// No usable rate, including pairs with an unsupported currency.
    #[error("Exchange rate not available for {from} to {to}")]
    RateUnavailable { from: String, to: String },
}

/// Converts amounts with the installed provider and records each success.
pub struct ConversionEngine {
    provider: RateProvider,
    history: ConversionHistory,
}

impl ConversionEngine {
    pub fn new(provider: RateProvider) -> Self {
        Self::with_history(provider, ConversionHistory::new())
    }

    pub fn with_history(provider: RateProvider, history: ConversionHistory) -> Self {
        Self { provider, history }
    }

    /// Parses `amount_text` and converts it from `from` to `to`.
    ///
    /// History is only touched when the conversion succeeds. An amount so
    /// large that the result overflows is reported as `InvalidAmount`.
    pub fn convert(
        &mut self,
        amount_text: &str,
        from: &str,
        to: &str,
    ) -> Result<f64, ConversionError> {
        let amount = parse_amount(amount_text)?;
        self.convert_amount(amount, from, to)
    }

    pub fn convert_amount(
        &mut self,
        amount: f64,
        from: &str,
        to: &str,
    ) -> Result<f64, ConversionError> {
        if !amount.is_finite() {
            return Err(ConversionError::InvalidAmount(amount.to_string()));
        }
        if amount < 0.0 {
            return Err(ConversionError::NegativeAmount(amount));
        }

        let unavailable = || ConversionError::RateUnavailable {
            from: from.to_string(),
            to: to.to_string(),
        };
        let from_currency = from.parse::<Currency>().map_err(|_| unavailable())?;
        let to_currency = to.parse::<Currency>().map_err(|_| unavailable())?;

        let rate = self
            .provider
            .get_exchange_rate(from_currency.code(), to_currency.code());
        if !rate.is_finite() || rate <= 0.0 {
            debug!("No usable rate for {from_currency} -> {to_currency}: {rate}");
            return Err(unavailable());
        }

        let result = amount * rate;
        if !result.is_finite() {
            debug!("Conversion of {amount} at rate {rate} overflowed");
            return Err(ConversionError::InvalidAmount(amount.to_string()));
        }
        debug!("Converted {amount} from {from_currency} to {to_currency} at rate {rate}: {result}");
        self.history.save_entry(ConversionRecord {
            timestamp: Local::now(),
            amount,
            from_currency: from_currency.code().to_string(),
            to_currency: to_currency.code().to_string(),
            rate,
            result,
        });
        Ok(result)
    }

    pub fn get_exchange_rate(&self, from: &str, to: &str) -> f64 {
        self.provider.get_exchange_rate(from, to)
    }

    pub fn get_all_rates(&self) -> RateSnapshot {
        self.provider.get_all_rates()
    }

    /// Refreshes the installed provider; always `false` when offline.
    pub async fn fetch_rates(&self) -> bool {
        self.provider.fetch_rates().await
    }

    /// Installs `provider` and hands back the one it replaces.
    pub fn set_provider(&mut self, provider: RateProvider) -> RateProvider {
        debug!("Switching rate provider to {}", provider.label());
        std::mem::replace(&mut self.provider, provider)
    }

    pub fn provider(&self) -> &RateProvider {
        &self.provider
    }

    pub fn get_history(&self) -> Vec<ConversionRecord> {
        self.history.get_history()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn supported_currencies() -> &'static [Currency] {
        &Currency::ALL
    }
}

fn parse_amount(text: &str) -> Result<f64, ConversionError> {
    let trimmed = text.trim();
    match trimmed.parse::<f64>() {
        Ok(amount) if amount.is_finite() => Ok(amount),
        _ => Err(ConversionError::InvalidAmount(trimmed.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{OfflineRateProvider, RateOrigin};
    use std::collections::HashMap;

    fn provider_with(rates: &[(&str, f64)]) -> RateProvider {
        let rates: HashMap<String, f64> =
            rates.iter().map(|(c, r)| (c.to_string(), *r)).collect();
        OfflineRateProvider::from_snapshot(RateSnapshot::new("USD", rates), RateOrigin::Cache)
            .into()
    }

    fn sample_engine() -> ConversionEngine {
        ConversionEngine::new(provider_with(&[("USD", 1.0), ("EUR", 0.85), ("UAH", 37.0)]))
    }

    #[test]
    fn test_cross_currency_conversion() {
        let mut engine = sample_engine();

        let result = engine.convert("100", "UAH", "EUR").unwrap();
        assert!((result - 2.297297).abs() < 1e-6);

        let history = engine.get_history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].amount, 100.0);
        assert_eq!(history[0].from_currency, "UAH");
        assert_eq!(history[0].to_currency, "EUR");
        assert!((history[0].rate - 0.022973).abs() < 1e-6);
        assert_eq!(history[0].result, result);
    }

    #[test]
    fn test_result_is_amount_times_rate() {
        let mut engine = sample_engine();
        for amount in [0.0, 0.01, 1.0, 12.5, 1e6] {
            let rate = engine.get_exchange_rate("EUR", "UAH");
            let result = engine.convert(&amount.to_string(), "EUR", "UAH").unwrap();
            assert!((result - amount * rate).abs() < 1e-9 * (1.0 + amount * rate));
        }
        assert_eq!(engine.get_history().len(), 5);
    }

    #[test]
    fn test_zero_amount_is_valid() {
        let mut engine = sample_engine();
        assert_eq!(engine.convert("0", "USD", "EUR"), Ok(0.0));
    }

    #[test]
    fn test_amount_text_is_trimmed_and_codes_normalized() {
        let mut engine = sample_engine();
        assert_eq!(engine.convert("  10 ", "usd", " eur"), Ok(8.5));
        assert_eq!(engine.get_history()[0].from_currency, "USD");
        assert_eq!(engine.get_history()[0].to_currency, "EUR");
    }

    #[test]
    fn test_overflowing_result_is_rejected() {
        let mut engine = ConversionEngine::new(provider_with(&[("USD", 1.0), ("JPY", 150.0)]));

        assert!(matches!(
            engine.convert("1e308", "USD", "JPY"),
            Err(ConversionError::InvalidAmount(_))
        ));
        assert!(engine.get_history().is_empty());
        assert!(engine.convert("1e300", "USD", "JPY").is_ok());
    }

    #[test]
    fn test_same_currency_converts_at_one() {
        let mut engine = ConversionEngine::new(provider_with(&[]));
        assert_eq!(engine.convert("42", "JPY", "JPY"), Ok(42.0));
    }

    #[test]
    fn test_negative_amount() {
        let mut engine = sample_engine();
        assert_eq!(
            engine.convert("-5", "USD", "EUR"),
            Err(ConversionError::NegativeAmount(-5.0))
        );
        assert!(engine.get_history().is_empty());
    }

    #[test]
    fn test_invalid_amounts() {
        let mut engine = sample_engine();
        for text in ["abc", "", "  ", "1,5", "NaN", "inf", "-inf", "12abc"] {
            assert!(
                matches!(
                    engine.convert(text, "USD", "EUR"),
                    Err(ConversionError::InvalidAmount(_))
                ),
                "{text:?} should be rejected"
            );
        }
        assert!(engine.get_history().is_empty());
        assert!(matches!(
            engine.convert_amount(f64::NAN, "USD", "EUR"),
            Err(ConversionError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_empty_table_has_no_rate() {
        let mut engine = ConversionEngine::new(provider_with(&[]));
        assert_eq!(
            engine.convert("10", "USD", "EUR"),
            Err(ConversionError::RateUnavailable {
                from: "USD".to_string(),
                to: "EUR".to_string()
            })
        );
        assert!(engine.get_history().is_empty());
    }

    #[test]
    fn test_unsupported_currency_is_unavailable() {
        // RUB has a table entry but is not a supported currency.
        let mut engine = ConversionEngine::new(provider_with(&[("USD", 1.0), ("RUB", 75.0)]));
        assert!(matches!(
            engine.convert("10", "USD", "RUB"),
            Err(ConversionError::RateUnavailable { .. })
        ));
        assert!(matches!(
            engine.convert("10", "XYZ", "XYZ"),
            Err(ConversionError::RateUnavailable { .. })
        ));
        assert!(engine.get_history().is_empty());
    }

    #[test]
    fn test_missing_leg_is_unavailable() {
        let mut engine = sample_engine();
        assert!(matches!(
            engine.convert("10", "GBP", "EUR"),
            Err(ConversionError::RateUnavailable { .. })
        ));
    }

    #[test]
    fn test_set_provider_takes_effect_on_next_convert() {
        let mut engine = sample_engine();
        assert_eq!(engine.convert("10", "USD", "EUR"), Ok(8.5));

        let previous = engine.set_provider(provider_with(&[("USD", 1.0), ("EUR", 0.5)]));
        assert_eq!(previous.get_exchange_rate("USD", "EUR"), 0.85);
        assert_eq!(engine.convert("10", "USD", "EUR"), Ok(5.0));
        assert_eq!(engine.get_history().len(), 2);
    }

    #[test]
    fn test_clear_history() {
        let mut engine = sample_engine();
        engine.convert("1", "USD", "EUR").unwrap();
        engine.clear_history();
        assert!(engine.get_history().is_empty());
    }

    #[test]
    fn test_history_is_bounded() {
        let mut engine = sample_engine();
        for i in 0..60 {
            engine.convert(&i.to_string(), "USD", "EUR").unwrap();
        }
        let history = engine.get_history();
        assert_eq!(history.len(), 50);
        assert_eq!(history[0].amount, 10.0);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ConversionError::InvalidAmount("abc".to_string()).to_string(),
            "Invalid amount: \"abc\""
        );
        assert_eq!(
            ConversionError::NegativeAmount(-5.0).to_string(),
            "Amount cannot be negative: -5"
        );
        assert_eq!(
            ConversionError::RateUnavailable {
                from: "USD".to_string(),
                to: "EUR".to_string()
            }
            .to_string(),
            "Exchange rate not available for USD to EUR"
        );
    }
}
