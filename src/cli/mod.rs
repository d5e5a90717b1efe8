pub mod convert;
pub mod rates;
pub mod setup;
pub mod shell;
pub mod ui;

use crate::core::{ConversionEngine, ExchangeRateProvider};
use crate::core::cache::CACHE_TIME_FORMAT;
use crate::providers::RateProvider;

/// Refreshes the installed provider behind a spinner.
pub async fn refresh_with_spinner(engine: &ConversionEngine) -> bool {
    let spinner = ui::new_spinner("Fetching exchange rates...");
    let updated = engine.fetch_rates().await;
    spinner.finish_and_clear();
    updated
}

/// One-line description of where the current rates came from.
pub fn rates_status(provider: &RateProvider) -> String {
    let updated = provider
        .last_update()
        .map_or("never".to_string(), |ts| ts.format(CACHE_TIME_FORMAT).to_string());
    format!("Rates: {}, last update: {}", provider.label(), updated)
}

/// Human readable outcome of a refresh.
pub fn refresh_message(updated: bool, provider: &RateProvider) -> String {
    if updated {
        ui::style_text("Rates updated", ui::StyleType::Success)
    } else if !provider.is_online() {
        ui::style_text("Offline mode, rates not refreshed", ui::StyleType::Subtle)
    } else if provider.get_all_rates().is_empty() {
        ui::style_text("Update failed, no rates available", ui::StyleType::Error)
    } else {
        ui::style_text("Update failed, using cached rates", ui::StyleType::Warning)
    }
}
