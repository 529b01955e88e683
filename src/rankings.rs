use std::cmp::Ordering;

use crate::config::TOP_N;
use crate::types::{EtfSnapshot, StockSnapshot};

fn desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Top gainers by today's percentage change.
pub fn top_gainers(snapshots: &[StockSnapshot]) -> Vec<StockSnapshot> {
    let mut rows = snapshots.to_vec();
    rows.sort_by(|x, y| desc(x.change_pct, y.change_pct));
    rows.truncate(TOP_N);
    rows
}

/// Rows whose volume ratio reaches `min_ratio`, highest ratio first.
pub fn unusual_volume(snapshots: &[StockSnapshot], min_ratio: f64) -> Vec<StockSnapshot> {
    let mut rows: Vec<StockSnapshot> = snapshots
        .iter()
        .filter(|s| s.vol_ratio >= min_ratio)
        .cloned()
        .collect();
    rows.sort_by(|x, y| desc(x.vol_ratio, y.vol_ratio));
    rows.truncate(TOP_N);
    rows
}

/// The bounded momentum window handed to the 52-week tracker: the `cap`
/// strongest gainers of the day, not the whole universe. Symbols outside
/// the window are not checked this run even if they made a yearly high.
pub fn momentum_candidates(snapshots: &[StockSnapshot], cap: usize) -> Vec<StockSnapshot> {
    let mut rows = snapshots.to_vec();
    rows.sort_by(|x, y| desc(x.change_pct, y.change_pct));
    rows.truncate(cap);
    rows
}

pub fn etf_gainers(snapshots: &[EtfSnapshot]) -> Vec<EtfSnapshot> {
    let mut rows = snapshots.to_vec();
    rows.sort_by(|x, y| desc(x.change_pct, y.change_pct));
    rows.truncate(TOP_N);
    rows
}

pub fn etf_losers(snapshots: &[EtfSnapshot]) -> Vec<EtfSnapshot> {
    let mut rows = snapshots.to_vec();
    rows.sort_by(|x, y| desc(y.change_pct, x.change_pct));
    rows.truncate(TOP_N);
    rows
}

pub fn etf_most_active(snapshots: &[EtfSnapshot]) -> Vec<EtfSnapshot> {
    let mut rows = snapshots.to_vec();
    rows.sort_by(|x, y| desc(x.volume, y.volume));
    rows.truncate(TOP_N);
    rows
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn stock(ticker: &str, change_pct: f64, vol_ratio: f64) -> StockSnapshot {
        StockSnapshot {
            ticker: ticker.to_string(),
            name: ticker.to_string(),
            sector_kr: String::new(),
            close: 100.0,
            change_pct,
            volume: 1000.0,
            avg_volume: 500.0,
            vol_ratio,
        }
    }

    fn etf(ticker: &str, change_pct: f64, volume: f64) -> EtfSnapshot {
        EtfSnapshot {
            ticker: ticker.to_string(),
            name: ticker.to_string(),
            category: String::new(),
            close: 100.0,
            change_pct,
            volume,
        }
    }

    #[test]
    fn gainers_sorted_descending_and_truncated() {
        let snapshots: Vec<StockSnapshot> =
            (0..15).map(|i| stock(&format!("T{i}"), i as f64, 1.0)).collect();

        let top = top_gainers(&snapshots);
        assert_eq!(top.len(), TOP_N);
        assert_eq!(top[0].ticker, "T14");
        assert_eq!(top[9].ticker, "T5");
    }

    #[test]
    fn gainers_sort_is_stable_on_ties() {
        let snapshots = vec![stock("FIRST", 2.0, 1.0), stock("SECOND", 2.0, 1.0)];
        let top = top_gainers(&snapshots);
        assert_eq!(top[0].ticker, "FIRST");
        assert_eq!(top[1].ticker, "SECOND");
    }

    #[test]
    fn unusual_volume_threshold_is_inclusive() {
        let snapshots = vec![
            stock("LOW", 0.0, 1.49),
            stock("EDGE", 0.0, 1.5),
            stock("HIGH", 0.0, 6.0),
        ];

        let rows = unusual_volume(&snapshots, 1.5);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].ticker, "HIGH");
        assert_eq!(rows[1].ticker, "EDGE");
    }

    #[test]
    fn momentum_window_is_bounded() {
        let snapshots: Vec<StockSnapshot> =
            (0..300).map(|i| stock(&format!("T{i}"), i as f64, 1.0)).collect();

        let candidates = momentum_candidates(&snapshots, 200);
        assert_eq!(candidates.len(), 200);
        // The weakest half of the day never enters the window.
        assert!(candidates.iter().all(|s| s.change_pct >= 100.0));
    }

    #[test]
    fn etf_views_sort_each_direction() {
        let snapshots = vec![etf("UP", 3.0, 100.0), etf("DOWN", -2.0, 900.0), etf("FLAT", 0.0, 500.0)];

        assert_eq!(etf_gainers(&snapshots)[0].ticker, "UP");
        assert_eq!(etf_losers(&snapshots)[0].ticker, "DOWN");
        assert_eq!(etf_most_active(&snapshots)[0].ticker, "DOWN");
    }

    #[test]
    fn empty_input_produces_empty_views() {
        assert!(top_gainers(&[]).is_empty());
        assert!(unusual_volume(&[], 1.5).is_empty());
        assert!(etf_gainers(&[]).is_empty());
    }
}
