use crate::core::rates::{DEFAULT_BASE_CURRENCY, RateSnapshot, sanitize_rates};
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const CACHE_FILE_NAME: &str = "exchange_rates_cache.json";
pub const CACHE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// On-disk layout of the rate cache. A missing or `null` base currency or
/// timestamp falls back to its default instead of rejecting the file.
#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    #[serde(default)]
    rates: HashMap<String, f64>,
    #[serde(default)]
    base_currency: Option<String>,
    #[serde(default)]
    last_update: Option<String>,
}

/// Best-effort persistence of the last known rate table.
///
/// Neither `save` nor `load` ever fails: write errors are logged and read
/// errors produce an empty snapshot, which callers treat as a cache miss.
#[derive(Debug, Clone)]
pub struct RateCache {
    path: PathBuf,
}

impl RateCache {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, snapshot: &RateSnapshot) {
        match self.try_save(snapshot) {
            Ok(()) => debug!("Cache PUT {} rates to {}", snapshot.rates.len(), self.path.display()),
            Err(e) => warn!("Failed to save rate cache: {e:#}"),
        }
    }

    pub fn load(&self) -> RateSnapshot {
        match self.try_load() {
            Ok(snapshot) => {
                if snapshot.is_empty() {
                    debug!("Cache MISS: no rates in {}", self.path.display());
                } else {
                    debug!("Cache HIT: {} rates", snapshot.rates.len());
                }
                snapshot
            }
            Err(e) => {
                debug!("Cache MISS: {e:#}");
                RateSnapshot::empty()
            }
        }
    }

    fn try_save(&self, snapshot: &RateSnapshot) -> Result<()> {
        let contents = CacheFile {
            rates: sanitize_rates(snapshot.rates.clone()),
            base_currency: Some(snapshot.base_currency.clone()),
            last_update: Some(
                snapshot
                    .captured_at
                    .map(|ts| ts.format(CACHE_TIME_FORMAT).to_string())
                    .unwrap_or_default(),
            ),
        };
        let json = serde_json::to_vec(&contents).context("Failed to serialize rate cache")?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

        // Readers only ever see the old file or the complete new one.
        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
        tmp.write_all(&json)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }

    fn try_load(&self) -> Result<RateSnapshot> {
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read cache file: {}", self.path.display()))?;
        let contents: CacheFile = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse cache file: {}", self.path.display()))?;

        let captured_at = contents.last_update.as_deref().and_then(parse_timestamp);
        let base_currency = contents
            .base_currency
            .unwrap_or_else(|| DEFAULT_BASE_CURRENCY.to_string());
        Ok(RateSnapshot::new(&base_currency, sanitize_rates(contents.rates))
            .with_captured_at(captured_at))
    }
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    if value.is_empty() {
        return None;
    }
    match NaiveDateTime::parse_from_str(value, CACHE_TIME_FORMAT) {
        Ok(ts) => Some(ts),
        Err(e) => {
            debug!("Ignoring unparseable cache timestamp {:?}: {}", value, e);
            None
        }
    }
}
