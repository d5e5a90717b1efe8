use chrono::{DateTime, Local};
use std::collections::VecDeque;

pub const DEFAULT_HISTORY_SIZE: usize = 50;

/// A completed conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRecord {
    pub timestamp: DateTime<Local>,
    pub amount: f64,
    pub from_currency: String,
    pub to_currency: String,
    pub rate: f64,
    pub result: f64,
}

/// Bounded log of conversions, oldest first. Once full, each new entry
/// evicts the oldest one.
#[derive(Debug, Clone)]
pub struct ConversionHistory {
    entries: VecDeque<ConversionRecord>,
    capacity: usize,
}

impl ConversionHistory {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_SIZE)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::new(),
            capacity,
        }
    }

    pub fn save_entry(&mut self, record: ConversionRecord) {
        self.entries.push_back(record);
        if self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn get_history(&self) -> Vec<ConversionRecord> {
        self.entries.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for ConversionHistory {
    fn default() -> Self {
        Self::new()
    }
}
