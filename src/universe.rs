use std::path::Path;

use indexmap::IndexMap;

use crate::error::{AppError, Result};
use crate::types::SymbolInfo;

/// Ticker → metadata, in file order. Batch requests follow this order.
pub type Universe = IndexMap<String, SymbolInfo>;

/// Load a universe file. Universe files are required run input: any IO or
/// parse failure aborts the run, unlike every per-symbol fetch error.
pub fn load_universe(path: &Path) -> Result<Universe> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| AppError::Input(format!("cannot read {}: {e}", path.display())))?;
    serde_json::from_str(&raw)
        .map_err(|e| AppError::Input(format!("cannot parse {}: {e}", path.display())))
}

/// Merge universes in order; the first occurrence of a ticker wins.
pub fn merge(universes: &[&Universe]) -> Universe {
    let mut out = Universe::new();
    for u in universes {
        for (ticker, info) in u.iter() {
            out.entry(ticker.clone()).or_insert_with(|| info.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_preserves_file_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"ZZZ": {{"name": "지지지"}}, "AAA": {{"name": "에이", "sector_kr": "기술"}}}}"#
        )
        .unwrap();

        let universe = load_universe(file.path()).unwrap();
        let tickers: Vec<&String> = universe.keys().collect();
        assert_eq!(tickers, ["ZZZ", "AAA"]);
        assert_eq!(universe["AAA"].sector_kr.as_deref(), Some("기술"));
    }

    #[test]
    fn missing_file_is_input_error() {
        let err = load_universe(Path::new("/nonexistent/tickers.json")).unwrap_err();
        assert!(matches!(err, AppError::Input(_)));
    }

    #[test]
    fn malformed_file_is_input_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = load_universe(file.path()).unwrap_err();
        assert!(matches!(err, AppError::Input(_)));
    }

    #[test]
    fn merge_keeps_first_occurrence() {
        let a: Universe = serde_json::from_str(r#"{"AAPL": {"name": "애플"}}"#).unwrap();
        let b: Universe =
            serde_json::from_str(r#"{"AAPL": {"name": "other"}, "IWM": {"name": "러셀"}}"#).unwrap();

        let merged = merge(&[&a, &b]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged["AAPL"].name.as_deref(), Some("애플"));
        let tickers: Vec<&String> = merged.keys().collect();
        assert_eq!(tickers, ["AAPL", "IWM"]);
    }
}
