use serde::Deserialize;

use crate::config::IndexSpec;

// ---------------------------------------------------------------------------
// Universe metadata
// ---------------------------------------------------------------------------

/// One entry of a ticker universe file. Stock universes carry `name` and
/// `sector_kr`; the ETF universe carries `name` and `category`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SymbolInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sector_kr: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

// ---------------------------------------------------------------------------
// Raw quote fields
// ---------------------------------------------------------------------------

/// One symbol's fields from a daily batch fetch. An absent field means the
/// upstream returned nothing usable for it: unknown, never zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct Quote {
    pub close: Option<f64>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub volume: Option<f64>,
}

// ---------------------------------------------------------------------------
// Per-run snapshots
// ---------------------------------------------------------------------------

/// A validated stock row: only built when the close passed the validity gate.
#[derive(Debug, Clone)]
pub struct StockSnapshot {
    pub ticker: String,
    pub name: String,
    pub sector_kr: String,
    pub close: f64,
    pub change_pct: f64,
    pub volume: f64,
    pub avg_volume: f64,
    pub vol_ratio: f64,
}

#[derive(Debug, Clone)]
pub struct EtfSnapshot {
    pub ticker: String,
    pub name: String,
    pub category: String,
    pub close: f64,
    pub change_pct: f64,
    pub volume: f64,
}

/// Header-bar index reading. `value` is None when the fetch produced nothing
/// usable; the renderer shows N/A rather than a zero.
#[derive(Debug, Clone, Copy)]
pub struct IndexQuote {
    pub spec: IndexSpec,
    pub value: Option<f64>,
    pub change_pct: Option<f64>,
}

// ---------------------------------------------------------------------------
// 52-week high events
// ---------------------------------------------------------------------------

/// Emitted when a candidate closes at or within the tolerance band of its
/// trailing one-year high.
#[derive(Debug, Clone)]
pub struct NewHighEvent {
    pub snapshot: StockSnapshot,
    /// Trailing 1y high as reported by the data source this run.
    pub prev_high: f64,
    /// `(close - prev_high) / prev_high * 100`, negative inside the band.
    pub beat_pct: f64,
}
