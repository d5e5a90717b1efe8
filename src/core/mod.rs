//! Core business logic abstractions

pub mod cache;
pub mod config;
pub mod currency;
pub mod engine;
pub mod history;
pub mod log;
pub mod rates;

// Re-export main types for cleaner imports
pub use cache::RateCache;
pub use currency::{Currency, ExchangeRateProvider, RemoteRateSource};
pub use engine::{ConversionEngine, ConversionError};
pub use history::{ConversionHistory, ConversionRecord};
pub use rates::RateSnapshot;
