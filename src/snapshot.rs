use std::collections::HashMap;

use crate::types::{EtfSnapshot, Quote, StockSnapshot};
use crate::universe::Universe;

/// Why a symbol was excluded from today's views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    MissingClose,
    ZeroClose,
}

/// Exclusion tally for one aggregation pass.
#[derive(Debug, Default)]
pub struct SnapshotStats {
    pub total: usize,
    pub accepted: usize,
    pub rejected_missing_close: usize,
    pub rejected_zero_close: usize,
}

impl SnapshotStats {
    fn reject(&mut self, rejection: Rejection) {
        match rejection {
            Rejection::MissingClose => self.rejected_missing_close += 1,
            Rejection::ZeroClose => self.rejected_zero_close += 1,
        }
    }
}

/// The close validity gate: present, finite, non-zero. Everything else about
/// a row may be unknown; the close may not.
fn check_close(quote: &Quote) -> Result<f64, Rejection> {
    match quote.close {
        Some(c) if c == 0.0 => Err(Rejection::ZeroClose),
        Some(c) if c.is_finite() => Ok(c),
        _ => Err(Rejection::MissingClose),
    }
}

/// `(close - open) / open * 100`, 0 when the open is unknown or non-positive.
pub fn change_pct(close: f64, open: Option<f64>) -> f64 {
    match open {
        Some(o) if o > 0.0 => (close - o) / o * 100.0,
        _ => 0.0,
    }
}

/// `volume / avg`, 0 when either side is unknown or the average non-positive.
pub fn volume_ratio(volume: Option<f64>, avg: Option<f64>) -> f64 {
    match (volume, avg) {
        (Some(v), Some(a)) if a > 0.0 => v / a,
        _ => 0.0,
    }
}

/// Build validated stock rows from the merged universe, in universe order.
/// Symbols failing the close gate are tallied and dropped from every view.
pub fn build_stock_snapshots(
    universe: &Universe,
    quotes: &HashMap<String, Quote>,
    avg_volumes: &HashMap<String, f64>,
) -> (Vec<StockSnapshot>, SnapshotStats) {
    let mut stats = SnapshotStats::default();
    let mut snapshots = Vec::new();

    for (ticker, info) in universe {
        stats.total += 1;
        let quote = quotes.get(ticker).copied().unwrap_or_default();
        let close = match check_close(&quote) {
            Ok(c) => c,
            Err(rejection) => {
                stats.reject(rejection);
                continue;
            }
        };
        let avg_volume = avg_volumes.get(ticker).copied();

        snapshots.push(StockSnapshot {
            ticker: ticker.clone(),
            name: info.name.clone().unwrap_or_else(|| ticker.clone()),
            sector_kr: info.sector_kr.clone().unwrap_or_default(),
            close,
            change_pct: change_pct(close, quote.open),
            volume: quote.volume.unwrap_or(0.0),
            avg_volume: avg_volume.unwrap_or(0.0),
            vol_ratio: volume_ratio(quote.volume, avg_volume),
        });
        stats.accepted += 1;
    }

    (snapshots, stats)
}

/// Build validated ETF rows. Same close gate; no volume-average pass.
pub fn build_etf_snapshots(
    universe: &Universe,
    quotes: &HashMap<String, Quote>,
) -> (Vec<EtfSnapshot>, SnapshotStats) {
    let mut stats = SnapshotStats::default();
    let mut snapshots = Vec::new();

    for (ticker, info) in universe {
        stats.total += 1;
        let quote = quotes.get(ticker).copied().unwrap_or_default();
        let close = match check_close(&quote) {
            Ok(c) => c,
            Err(rejection) => {
                stats.reject(rejection);
                continue;
            }
        };

        snapshots.push(EtfSnapshot {
            ticker: ticker.clone(),
            name: info.name.clone().unwrap_or_else(|| ticker.clone()),
            category: info.category.clone().unwrap_or_default(),
            close,
            change_pct: change_pct(close, quote.open),
            volume: quote.volume.unwrap_or(0.0),
        });
        stats.accepted += 1;
    }

    (snapshots, stats)
}

/// Rows for the fixed large-cap card grid. The card list carries its own
/// Korean display names; invalid closes drop the card silently.
pub fn build_card_snapshots(
    cards: &[(&str, &str)],
    quotes: &HashMap<String, Quote>,
) -> Vec<StockSnapshot> {
    let mut snapshots = Vec::new();
    for &(ticker, name) in cards {
        let quote = match quotes.get(ticker) {
            Some(q) => *q,
            None => continue,
        };
        let close = match check_close(&quote) {
            Ok(c) => c,
            Err(_) => continue,
        };
        snapshots.push(StockSnapshot {
            ticker: ticker.to_string(),
            name: name.to_string(),
            sector_kr: String::new(),
            close,
            change_pct: change_pct(close, quote.open),
            volume: quote.volume.unwrap_or(0.0),
            avg_volume: 0.0,
            vol_ratio: 0.0,
        });
    }
    snapshots
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::universe::Universe;

    fn quote(close: Option<f64>, open: Option<f64>, volume: Option<f64>) -> Quote {
        Quote { close, open, high: None, low: None, volume }
    }

    fn universe(entries: &str) -> Universe {
        serde_json::from_str(entries).unwrap()
    }

    #[test]
    fn change_pct_guards_missing_or_bad_open() {
        assert_eq!(change_pct(110.0, Some(100.0)), 10.0);
        assert_eq!(change_pct(110.0, None), 0.0);
        assert_eq!(change_pct(110.0, Some(0.0)), 0.0);
        assert_eq!(change_pct(110.0, Some(-5.0)), 0.0);
    }

    #[test]
    fn volume_ratio_guards_missing_or_bad_average() {
        assert_eq!(volume_ratio(Some(300.0), Some(100.0)), 3.0);
        assert_eq!(volume_ratio(Some(300.0), None), 0.0);
        assert_eq!(volume_ratio(Some(300.0), Some(0.0)), 0.0);
        assert_eq!(volume_ratio(None, Some(100.0)), 0.0);
    }

    #[test]
    fn invalid_closes_are_excluded_and_tallied() {
        let u = universe(
            r#"{"GOOD": {"name": "좋음"}, "GONE": {"name": "없음"}, "ZERO": {"name": "영"}}"#,
        );
        let mut quotes = HashMap::new();
        quotes.insert("GOOD".to_string(), quote(Some(50.0), Some(40.0), Some(100.0)));
        quotes.insert("ZERO".to_string(), quote(Some(0.0), Some(40.0), Some(100.0)));
        // GONE has no quote at all.

        let (snapshots, stats) = build_stock_snapshots(&u, &quotes, &HashMap::new());
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].ticker, "GOOD");
        assert_eq!(stats.total, 3);
        assert_eq!(stats.accepted, 1);
        assert_eq!(stats.rejected_missing_close, 1);
        assert_eq!(stats.rejected_zero_close, 1);
    }

    #[test]
    fn snapshot_carries_guarded_derived_fields() {
        let u = universe(r#"{"AAPL": {"name": "애플", "sector_kr": "기술"}}"#);
        let mut quotes = HashMap::new();
        quotes.insert("AAPL".to_string(), quote(Some(110.0), Some(100.0), Some(3000.0)));
        let mut avgs = HashMap::new();
        avgs.insert("AAPL".to_string(), 1000.0);

        let (snapshots, _) = build_stock_snapshots(&u, &quotes, &avgs);
        let s = &snapshots[0];
        assert!((s.change_pct - 10.0).abs() < 1e-9);
        assert!((s.vol_ratio - 3.0).abs() < 1e-9);
        assert_eq!(s.sector_kr, "기술");
    }

    #[test]
    fn missing_average_volume_reads_as_zero_ratio() {
        let u = universe(r#"{"AAPL": {"name": "애플"}}"#);
        let mut quotes = HashMap::new();
        quotes.insert("AAPL".to_string(), quote(Some(110.0), Some(100.0), Some(3000.0)));

        let (snapshots, _) = build_stock_snapshots(&u, &quotes, &HashMap::new());
        assert_eq!(snapshots[0].vol_ratio, 0.0);
        assert_eq!(snapshots[0].avg_volume, 0.0);
    }

    #[test]
    fn etf_rows_carry_category() {
        let u = universe(r#"{"SPY": {"name": "SPDR S&P 500", "category": "대형주"}}"#);
        let mut quotes = HashMap::new();
        quotes.insert("SPY".to_string(), quote(Some(500.0), Some(495.0), Some(7e7)));

        let (snapshots, stats) = build_etf_snapshots(&u, &quotes);
        assert_eq!(stats.accepted, 1);
        assert_eq!(snapshots[0].category, "대형주");
    }

    #[test]
    fn cards_skip_symbols_without_quotes() {
        let cards = [("AAPL", "애플"), ("MSFT", "마이크로소프트")];
        let mut quotes = HashMap::new();
        quotes.insert("AAPL".to_string(), quote(Some(210.0), Some(200.0), Some(1e6)));

        let snapshots = build_card_snapshots(&cards, &quotes);
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].name, "애플");
        assert!((snapshots[0].change_pct - 5.0).abs() < 1e-9);
    }
}
