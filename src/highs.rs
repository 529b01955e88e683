use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::config::TOP_N;
use crate::error::Result;
use crate::types::{NewHighEvent, StockSnapshot};

/// A momentum candidate paired with the trailing-year high the data source
/// reported for it this run. `trailing_high` is None when the historical
/// fetch produced nothing for the symbol.
#[derive(Debug, Clone)]
pub struct HighCandidate {
    pub snapshot: StockSnapshot,
    pub trailing_high: Option<f64>,
}

/// Durable symbol → highest-observed-close map.
///
/// Loaded once at the start of a run, persisted once at the end; recorded
/// values only ever increase. The map is an audit trail maintained alongside
/// the new-high check, not an input to it: qualification always uses the
/// trailing-year high reported by the data source this run.
#[derive(Debug)]
pub struct HighWaterStore {
    path: PathBuf,
    highs: BTreeMap<String, f64>,
}

impl HighWaterStore {
    /// Load the store from `path`. A missing or malformed file is an empty
    /// store, never an error: the next persist reseeds it.
    pub fn load(path: &Path) -> Self {
        let highs = match fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str::<BTreeMap<String, f64>>(&raw) {
                Ok(map) => map,
                Err(e) => {
                    warn!(
                        "malformed high-water store at {} ({e}), starting empty",
                        path.display()
                    );
                    BTreeMap::new()
                }
            },
            Err(_) => BTreeMap::new(),
        };
        Self { path: path.to_path_buf(), highs }
    }

    pub fn recorded_high(&self, symbol: &str) -> Option<f64> {
        self.highs.get(symbol).copied()
    }

    pub fn len(&self) -> usize {
        self.highs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.highs.is_empty()
    }

    /// Evaluate this run's momentum candidates, in request-batch order.
    ///
    /// A candidate with no usable trailing high is skipped outright: no
    /// event, and its recorded high stays untouched for this run. Every
    /// other candidate advances its recorded high to `max(existing, close)`
    /// whether or not an event fires; the run's own close is the
    /// high-water candidate, not the reported trailing high. A symbol can
    /// therefore close at a true yearly high and stay unrecorded until it
    /// re-enters the momentum window on a later day.
    ///
    /// Returns events ranked by descending `beat_pct`, truncated to the view
    /// size.
    pub fn evaluate(&mut self, candidates: &[HighCandidate], tolerance: f64) -> Vec<NewHighEvent> {
        let mut events = Vec::new();

        for candidate in candidates {
            let close = candidate.snapshot.close;
            let trailing = match candidate.trailing_high {
                Some(h) if h.is_finite() && h > 0.0 => h,
                _ => continue,
            };

            if close >= trailing * tolerance {
                events.push(NewHighEvent {
                    snapshot: candidate.snapshot.clone(),
                    prev_high: trailing,
                    beat_pct: (close - trailing) / trailing * 100.0,
                });
            }

            let entry = self.highs.entry(candidate.snapshot.ticker.clone()).or_insert(0.0);
            if close > *entry {
                *entry = close;
            }
        }

        events.sort_by(|a, b| {
            b.beat_pct
                .partial_cmp(&a.beat_pct)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        events.truncate(TOP_N);
        events
    }

    /// Persist the map: serialize to a sibling temp file, then rename over
    /// the store, so a crash mid-write cannot leave a truncated file for the
    /// next run to read. Called exactly once per run, after all batches.
    pub fn persist(&self) -> Result<()> {
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(&self.highs)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 0.99;

    fn snap(ticker: &str, close: f64) -> StockSnapshot {
        StockSnapshot {
            ticker: ticker.to_string(),
            name: ticker.to_string(),
            sector_kr: String::new(),
            close,
            change_pct: 0.0,
            volume: 0.0,
            avg_volume: 0.0,
            vol_ratio: 0.0,
        }
    }

    fn candidate(ticker: &str, close: f64, trailing_high: Option<f64>) -> HighCandidate {
        HighCandidate { snapshot: snap(ticker, close), trailing_high }
    }

    fn empty_store(dir: &tempfile::TempDir) -> HighWaterStore {
        HighWaterStore::load(&dir.path().join("52week_highs.json"))
    }

    #[test]
    fn close_within_band_emits_event_and_raises_record() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = empty_store(&dir);
        store.highs.insert("AAPL".to_string(), 150.0);

        let events = store.evaluate(&[candidate("AAPL", 160.0, Some(161.0))], TOLERANCE);

        // 160 >= 0.99 * 161 = 159.39
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].prev_high, 161.0);
        assert!((events[0].beat_pct - (-100.0 / 161.0)).abs() < 1e-9);
        assert_eq!(store.recorded_high("AAPL"), Some(160.0));
    }

    #[test]
    fn close_below_band_updates_record_without_event() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = empty_store(&dir);

        let events = store.evaluate(&[candidate("XOM", 100.0, Some(120.0))], TOLERANCE);

        assert!(events.is_empty());
        assert_eq!(store.recorded_high("XOM"), Some(100.0));
    }

    #[test]
    fn close_exactly_at_threshold_qualifies() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = empty_store(&dir);

        let high = 200.0;
        let events = store.evaluate(&[candidate("NVDA", high * TOLERANCE, Some(high))], TOLERANCE);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn missing_trailing_high_skips_event_and_record() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = empty_store(&dir);

        let events = store.evaluate(&[candidate("MSFT", 300.0, None)], TOLERANCE);

        assert!(events.is_empty());
        assert_eq!(store.recorded_high("MSFT"), None);
    }

    #[test]
    fn record_is_monotonic_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = empty_store(&dir);

        store.evaluate(&[candidate("AAPL", 180.0, Some(181.0))], TOLERANCE);
        assert_eq!(store.recorded_high("AAPL"), Some(180.0));

        // A later, lower close never lowers the record.
        store.evaluate(&[candidate("AAPL", 170.0, Some(181.0))], TOLERANCE);
        assert_eq!(store.recorded_high("AAPL"), Some(180.0));
    }

    #[test]
    fn evaluate_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = empty_store(&dir);
        let candidates = vec![
            candidate("AAPL", 160.0, Some(161.0)),
            candidate("MSFT", 300.0, None),
            candidate("XOM", 100.0, Some(120.0)),
        ];

        let first = store.evaluate(&candidates, TOLERANCE);
        let highs_after_first = store.highs.clone();
        let second = store.evaluate(&candidates, TOLERANCE);

        assert_eq!(first.len(), second.len());
        assert_eq!(first[0].snapshot.ticker, second[0].snapshot.ticker);
        assert_eq!(store.highs, highs_after_first);
    }

    #[test]
    fn events_ranked_by_beat_pct_and_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = empty_store(&dir);

        // 12 qualifying candidates with distinct beat percentages.
        let candidates: Vec<HighCandidate> = (0..12)
            .map(|i| candidate(&format!("T{i}"), 100.0 + i as f64, Some(100.0)))
            .collect();

        let events = store.evaluate(&candidates, TOLERANCE);
        assert_eq!(events.len(), TOP_N);
        assert_eq!(events[0].snapshot.ticker, "T11");
        for pair in events.windows(2) {
            assert!(pair[0].beat_pct >= pair[1].beat_pct);
        }
    }

    #[test]
    fn empty_candidates_leave_store_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = empty_store(&dir);
        store.highs.insert("AAPL".to_string(), 150.0);

        let events = store.evaluate(&[], TOLERANCE);
        assert!(events.is_empty());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn absent_store_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = empty_store(&dir);
        assert!(store.is_empty());
    }

    #[test]
    fn malformed_store_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("52week_highs.json");
        fs::write(&path, "{not valid json").unwrap();

        let store = HighWaterStore::load(&path);
        assert!(store.is_empty());
    }

    #[test]
    fn persist_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("52week_highs.json");

        let mut store = HighWaterStore::load(&path);
        store.evaluate(&[candidate("AAPL", 160.0, Some(161.0))], TOLERANCE);
        store.persist().unwrap();

        let reloaded = HighWaterStore::load(&path);
        assert_eq!(reloaded.recorded_high("AAPL"), Some(160.0));

        // The temp file never survives a successful persist.
        assert!(!path.with_extension("json.tmp").exists());
    }
}
