// =============================================================================
// Daily price series — ordered OHLCV bars keyed by trading date
// =============================================================================
//
// A `PriceSeries` is the single input shape consumed by every indicator:
// ascending trading dates, no duplicates, immutable once built. The provider
// layer constructs it; nothing downstream mutates it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single daily OHLCV bar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// An ordered sequence of daily bars, ascending by date, no duplicate dates.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PriceSeries {
    bars: Vec<Bar>,
}

impl PriceSeries {
    /// Build a series from provider bars.
    ///
    /// Sorts ascending by date and drops duplicate dates (keeping the first
    /// occurrence), so the invariant holds regardless of what the provider
    /// returned.
    pub fn new(mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|b| b.date);
        bars.dedup_by_key(|b| b.date);
        Self { bars }
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    pub fn opens(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.open).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    /// First and last close, when the series is non-empty.
    pub fn endpoints(&self) -> Option<(f64, f64)> {
        let first = self.bars.first()?.close;
        let last = self.bars.last()?.close;
        Some((first, last))
    }
}
