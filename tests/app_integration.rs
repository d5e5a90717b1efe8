use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use fxconv::core::cache::CACHE_FILE_NAME;
use fxconv::core::{ConversionEngine, ConversionError, ExchangeRateProvider, RateCache};
use fxconv::providers::exchange_rate_api::ExchangeRateApi;
use fxconv::providers::{OfflineRateProvider, OnlineRateProvider, RateProvider};
use fxconv::{AppCommand, RunOptions};

mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub const USD_RATES: &str = r#"{
        "base": "USD",
        "date": "2024-03-01",
        "rates": {"USD": 1, "EUR": 0.85, "UAH": 37.0, "GBP": 0.73}
    }"#;

    pub async fn create_mock_server(status: u16, mock_response: &str) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/USD"))
            .respond_with(ResponseTemplate::new(status).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        mock_server
    }
}

fn write_config(dir: &Path, base_url: &str) -> std::path::PathBuf {
    let config_path = dir.join("config.yaml");
    let config_content = format!(
        r#"
        provider:
          base_url: {}
          base_currency: "USD"
          timeout_secs: 2
        cache_path: {}
    "#,
        base_url,
        dir.join(CACHE_FILE_NAME).display()
    );
    fs::write(&config_path, config_content).expect("Failed to write config file");
    config_path
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_mock() {
    let mock_server = test_utils::create_mock_server(200, test_utils::USD_RATES).await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = write_config(dir.path(), &mock_server.uri());

    let result = fxconv::run_command(
        AppCommand::Convert {
            amount: "100".to_string(),
            from: "UAH".to_string(),
            to: "EUR".to_string(),
        },
        RunOptions {
            config_path: Some(config_path.to_str().unwrap()),
            offline: false,
        },
    )
    .await;
    assert!(
        result.is_ok(),
        "Convert command failed with: {:?}",
        result.err()
    );

    let cached = RateCache::new(dir.path().join(CACHE_FILE_NAME)).load();
    assert_eq!(cached.rates.get("EUR"), Some(&0.85));
    assert!(cached.captured_at.is_some());
}

#[test_log::test(tokio::test)]
async fn test_refresh_failure_keeps_cache() {
    let mock_server = test_utils::create_mock_server(503, "").await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = write_config(dir.path(), &mock_server.uri());
    let cache_file = dir.path().join(CACHE_FILE_NAME);
    let cached = r#"{"rates": {"USD": 1.0, "EUR": 0.9}, "base_currency": "USD", "last_update": "2024-01-02 03:04:05"}"#;
    fs::write(&cache_file, cached).unwrap();

    let result = fxconv::run_command(
        AppCommand::Refresh,
        RunOptions {
            config_path: Some(config_path.to_str().unwrap()),
            offline: false,
        },
    )
    .await;
    assert!(result.is_ok(), "Refresh failed with: {:?}", result.err());
    assert_eq!(fs::read_to_string(&cache_file).unwrap(), cached);
}

#[test_log::test(tokio::test)]
async fn test_offline_convert_without_cache() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    // Unreachable endpoint; offline mode must never call it.
    let config_path = write_config(dir.path(), "http://127.0.0.1:9");

    let result = fxconv::run_command(
        AppCommand::Convert {
            amount: "10".to_string(),
            from: "USD".to_string(),
            to: "JPY".to_string(),
        },
        RunOptions {
            config_path: Some(config_path.to_str().unwrap()),
            offline: true,
        },
    )
    .await;
    assert!(result.is_ok(), "Offline convert failed: {:?}", result.err());
    assert!(!dir.path().join(CACHE_FILE_NAME).exists());
}

#[test_log::test(tokio::test)]
async fn test_convert_rejects_negative_amount() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = write_config(dir.path(), "http://127.0.0.1:9");

    let result = fxconv::run_command(
        AppCommand::Convert {
            amount: "-5".to_string(),
            from: "USD".to_string(),
            to: "EUR".to_string(),
        },
        RunOptions {
            config_path: Some(config_path.to_str().unwrap()),
            offline: true,
        },
    )
    .await;
    let err = result.expect_err("Negative amount should fail");
    assert_eq!(
        err.downcast_ref::<ConversionError>(),
        Some(&ConversionError::NegativeAmount(-5.0))
    );
}

#[test_log::test(tokio::test)]
async fn test_missing_config_file_is_an_error() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let missing = dir.path().join("missing.yaml");

    let result = fxconv::run_command(
        AppCommand::Currencies,
        RunOptions {
            config_path: Some(missing.to_str().unwrap()),
            offline: true,
        },
    )
    .await;
    assert!(result.is_err());
}

#[test_log::test(tokio::test)]
async fn test_fallback_chain_remote_cache_static() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let cache = RateCache::new(dir.path().join(CACHE_FILE_NAME));

    // Remote source up: fresh rates, persisted to the cache.
    let mock_server = test_utils::create_mock_server(200, test_utils::USD_RATES).await;
    let api = ExchangeRateApi::new(&mock_server.uri(), Duration::from_secs(2)).unwrap();
    let online = OnlineRateProvider::new(Arc::new(api), cache.clone(), "USD");
    let mut engine = ConversionEngine::new(RateProvider::Online(online));

    assert!(engine.fetch_rates().await);
    let result = engine.convert("100", "UAH", "EUR").unwrap();
    assert!((result - 2.297297).abs() < 1e-6);

    // Remote source down: the cache keeps the engine working.
    let down_server = test_utils::create_mock_server(500, "").await;
    let api = ExchangeRateApi::new(&down_server.uri(), Duration::from_secs(2)).unwrap();
    let fresh = OnlineRateProvider::new(Arc::new(api), cache.clone(), "USD");
    engine.set_provider(fresh.into());
    assert!(!engine.fetch_rates().await);
    assert_eq!(engine.convert("10", "USD", "GBP").unwrap(), 10.0 * 0.73);

    // No cache at all: offline falls back to the built-in table.
    fs::remove_file(cache.path()).unwrap();
    engine.set_provider(OfflineRateProvider::new(&cache).into());
    assert_eq!(engine.get_exchange_rate("USD", "USD"), 1.0);
    assert!(engine.get_exchange_rate("USD", "TRY") > 0.0);
    assert_eq!(engine.get_history().len(), 2);
}

#[test_log::test(tokio::test)]
#[ignore = "requires network access"]
async fn test_real_exchange_rate_api() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let api = ExchangeRateApi::new(
        fxconv::providers::exchange_rate_api::DEFAULT_BASE_URL,
        fxconv::providers::exchange_rate_api::DEFAULT_TIMEOUT,
    )
    .unwrap();
    let provider = OnlineRateProvider::new(
        Arc::new(api),
        RateCache::new(dir.path().join(CACHE_FILE_NAME)),
        "USD",
    );

    info!("Fetching rates from exchangerate-api");
    if !provider.fetch_rates().await {
        error!("Rate API request failed");
        panic!("Rate API request failed");
    }

    let rate = provider.get_exchange_rate("USD", "EUR");
    info!(?rate, "Received USD to EUR rate");
    assert!(rate > 0.0, "Currency rate should be positive");
}
