use std::collections::HashMap;
use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::{Config, BATCH_CONCURRENCY, HTTP_TIMEOUT_SECS, INDICES};
use crate::error::Result;
use crate::types::{IndexQuote, Quote};

/// Historical window requested from the chart endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Range {
    Day,
    Week,
    Month,
    Year,
}

impl Range {
    fn as_query(self) -> &'static str {
        match self {
            Range::Day => "1d",
            Range::Week => "5d",
            Range::Month => "1mo",
            Range::Year => "1y",
        }
    }
}

/// Column arrays from one chart payload. Upstream nulls stay `None`; a
/// column the payload lacks entirely is an empty vec.
#[derive(Debug, Default)]
pub struct ChartBars {
    pub open: Vec<Option<f64>>,
    pub high: Vec<Option<f64>>,
    pub low: Vec<Option<f64>>,
    pub close: Vec<Option<f64>>,
    pub volume: Vec<Option<f64>>,
}

pub fn build_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .user_agent("Mozilla/5.0 (compatible; usmarket-tracker)")
        .build()?)
}

// ---------------------------------------------------------------------------
// Batched fetching
// ---------------------------------------------------------------------------

/// Daily OHLCV per symbol. Failed symbols are absent from the result; a
/// symbol that returned rows but no value for some field keeps that field
/// `None`.
pub async fn fetch_daily_quotes(
    client: &reqwest::Client,
    cfg: &Config,
    symbols: &[String],
) -> HashMap<String, Quote> {
    fetch_batched(client, cfg, symbols, cfg.quote_batch_size, Range::Day, |bars| {
        Some(Quote {
            close: last_value(&bars.close),
            open: last_value(&bars.open),
            high: last_value(&bars.high),
            low: last_value(&bars.low),
            volume: last_value(&bars.volume),
        })
    })
    .await
}

/// Trailing one-month average daily volume per symbol.
pub async fn fetch_avg_volumes(
    client: &reqwest::Client,
    cfg: &Config,
    symbols: &[String],
) -> HashMap<String, f64> {
    fetch_batched(client, cfg, symbols, cfg.quote_batch_size, Range::Month, |bars| {
        mean_value(&bars.volume)
    })
    .await
}

/// Trailing one-year high per symbol, from the smaller history batch size.
pub async fn fetch_trailing_highs(
    client: &reqwest::Client,
    cfg: &Config,
    symbols: &[String],
) -> HashMap<String, f64> {
    fetch_batched(client, cfg, symbols, cfg.history_batch_size, Range::Year, |bars| {
        max_value(&bars.high)
    })
    .await
}

/// Header-bar index readings, one per configured index, in display order.
/// A failed index renders as N/A; it never aborts the run.
pub async fn fetch_index_quotes(client: &reqwest::Client, cfg: &Config) -> Vec<IndexQuote> {
    let mut out = Vec::with_capacity(INDICES.len());
    for spec in INDICES {
        let quote = match fetch_chart(client, &cfg.chart_api_url, spec.symbol, Range::Week).await {
            Ok(Some(bars)) => {
                let (prev, latest) = last_two_values(&bars.close);
                match (latest, prev) {
                    (Some(value), Some(prev)) if prev > 0.0 => IndexQuote {
                        spec: *spec,
                        value: Some(value),
                        change_pct: Some((value - prev) / prev * 100.0),
                    },
                    // A single close in the window reads as an unchanged index.
                    (Some(value), _) => IndexQuote {
                        spec: *spec,
                        value: Some(value),
                        change_pct: Some(0.0),
                    },
                    _ => IndexQuote { spec: *spec, value: None, change_pct: None },
                }
            }
            Ok(None) => IndexQuote { spec: *spec, value: None, change_pct: None },
            Err(e) => {
                warn!("index fetch failed for {}: {e}", spec.symbol);
                IndexQuote { spec: *spec, value: None, change_pct: None }
            }
        };
        out.push(quote);
    }
    out
}

/// Fetch chart columns for `symbols` in fixed-size groups, reducing each
/// payload with `reduce`. A group is one logical upstream request: its
/// symbols fan out concurrently (bounded), failed symbols are re-requested
/// up to `cfg.fetch_retries` attempts, and groups are separated by
/// `cfg.batch_delay_secs` to stay under upstream rate limits. Symbols that
/// never produce a payload are absent from the result; callers must treat
/// absence as unknown, not as zero.
async fn fetch_batched<T, F>(
    client: &reqwest::Client,
    cfg: &Config,
    symbols: &[String],
    batch_size: usize,
    range: Range,
    reduce: F,
) -> HashMap<String, T>
where
    F: Fn(&ChartBars) -> Option<T>,
{
    let mut out = HashMap::new();
    let total_batches = symbols.len().div_ceil(batch_size.max(1));

    for (batch_idx, batch) in symbols.chunks(batch_size.max(1)).enumerate() {
        if batch_idx > 0 {
            sleep(Duration::from_secs(cfg.batch_delay_secs)).await;
        }
        debug!(
            "batch {}/{}: {} symbols, range {}",
            batch_idx + 1,
            total_batches,
            batch.len(),
            range.as_query()
        );

        let mut pending: Vec<String> = batch.to_vec();
        for attempt in 1..=cfg.fetch_retries {
            if pending.is_empty() {
                break;
            }
            if attempt > 1 {
                warn!(
                    "retry {}/{} for {} symbols",
                    attempt,
                    cfg.fetch_retries,
                    pending.len()
                );
                sleep(Duration::from_secs(cfg.retry_delay_secs)).await;
            }

            let attempt_symbols = std::mem::take(&mut pending);
            let results: Vec<(String, Result<Option<ChartBars>>)> =
                stream::iter(attempt_symbols.into_iter().map(|symbol| async move {
                    let res = fetch_chart(client, &cfg.chart_api_url, &symbol, range).await;
                    (symbol, res)
                }))
                .buffer_unordered(BATCH_CONCURRENCY)
                .collect()
                .await;

            for (symbol, res) in results {
                match res {
                    Ok(Some(bars)) => {
                        if let Some(value) = reduce(&bars) {
                            out.insert(symbol, value);
                        }
                    }
                    // Payload parsed but carried no rows: absent, not retried.
                    Ok(None) => {}
                    Err(e) => {
                        debug!("chart fetch failed for {symbol}: {e}");
                        pending.push(symbol);
                    }
                }
            }
        }

        if !pending.is_empty() {
            warn!(
                "batch {}/{}: no data for {} symbols after {} attempts",
                batch_idx + 1,
                total_batches,
                pending.len(),
                cfg.fetch_retries
            );
        }
    }

    out
}

/// Fetch one symbol's chart columns. `Ok(None)` means the payload carried no
/// usable result block, i.e. the symbol has no data for the window.
async fn fetch_chart(
    client: &reqwest::Client,
    base_url: &str,
    symbol: &str,
    range: Range,
) -> Result<Option<ChartBars>> {
    let url = format!(
        "{}/v8/finance/chart/{}?range={}&interval=1d",
        base_url,
        encode_symbol(symbol),
        range.as_query()
    );
    let resp: serde_json::Value = client
        .get(&url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(parse_chart_bars(&resp))
}

/// Chart symbols may carry `^` (indices) and `=` (FX pairs); encode them for
/// the path segment.
fn encode_symbol(symbol: &str) -> String {
    symbol.replace('^', "%5E").replace('=', "%3D")
}

// ---------------------------------------------------------------------------
// Payload parsing
// ---------------------------------------------------------------------------

pub fn parse_chart_bars(v: &serde_json::Value) -> Option<ChartBars> {
    let result = v.get("chart")?.get("result")?.as_array()?.first()?;
    let quote = result.get("indicators")?.get("quote")?.as_array()?.first()?;
    Some(ChartBars {
        open: parse_column(quote.get("open")),
        high: parse_column(quote.get("high")),
        low: parse_column(quote.get("low")),
        close: parse_column(quote.get("close")),
        volume: parse_column(quote.get("volume")),
    })
}

fn parse_column(v: Option<&serde_json::Value>) -> Vec<Option<f64>> {
    v.and_then(|c| c.as_array())
        .map(|a| {
            a.iter()
                .map(|x| x.as_f64().filter(|f| f.is_finite()))
                .collect()
        })
        .unwrap_or_default()
}

/// Last non-null value in a column.
pub fn last_value(col: &[Option<f64>]) -> Option<f64> {
    col.iter().rev().find_map(|v| *v)
}

/// Last two non-null values as `(previous, latest)`.
pub fn last_two_values(col: &[Option<f64>]) -> (Option<f64>, Option<f64>) {
    let mut it = col.iter().rev().filter_map(|v| *v);
    let latest = it.next();
    let prev = it.next();
    (prev, latest)
}

/// Mean of the non-null values, None for an all-null column.
pub fn mean_value(col: &[Option<f64>]) -> Option<f64> {
    let values: Vec<f64> = col.iter().filter_map(|v| *v).collect();
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Max of the non-null values, None for an all-null column.
pub fn max_value(col: &[Option<f64>]) -> Option<f64> {
    col.iter().filter_map(|v| *v).fold(None, |acc, v| {
        Some(match acc {
            Some(m) if m >= v => m,
            _ => v,
        })
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn chart_payload() -> serde_json::Value {
        json!({
            "chart": {
                "result": [{
                    "timestamp": [1, 2, 3],
                    "indicators": {
                        "quote": [{
                            "open": [10.0, null, 12.0],
                            "high": [11.0, 14.5, 12.5],
                            "low": [9.0, null, 11.0],
                            "close": [10.5, null, 12.2],
                            "volume": [1000.0, 2000.0, null]
                        }]
                    }
                }],
                "error": null
            }
        })
    }

    #[test]
    fn parses_columns_with_nulls_preserved() {
        let bars = parse_chart_bars(&chart_payload()).unwrap();
        assert_eq!(bars.close, vec![Some(10.5), None, Some(12.2)]);
        assert_eq!(bars.volume, vec![Some(1000.0), Some(2000.0), None]);
    }

    #[test]
    fn empty_result_is_none() {
        let v = json!({"chart": {"result": [], "error": null}});
        assert!(parse_chart_bars(&v).is_none());
        let v = json!({"chart": {"result": null, "error": {"code": "Not Found"}}});
        assert!(parse_chart_bars(&v).is_none());
    }

    #[test]
    fn last_value_skips_trailing_nulls() {
        let bars = parse_chart_bars(&chart_payload()).unwrap();
        assert_eq!(last_value(&bars.volume), Some(2000.0));
        assert_eq!(last_value(&bars.close), Some(12.2));
        assert_eq!(last_value(&[]), None);
    }

    #[test]
    fn last_two_values_for_index_change() {
        let col = vec![Some(1.0), None, Some(2.0), Some(3.0), None];
        assert_eq!(last_two_values(&col), (Some(2.0), Some(3.0)));
        assert_eq!(last_two_values(&[Some(5.0)]), (None, Some(5.0)));
        assert_eq!(last_two_values(&[None, None]), (None, None));
    }

    #[test]
    fn mean_ignores_nulls() {
        let col = vec![Some(10.0), None, Some(30.0)];
        assert_eq!(mean_value(&col), Some(20.0));
        assert_eq!(mean_value(&[None, None]), None);
    }

    #[test]
    fn max_ignores_nulls() {
        let bars = parse_chart_bars(&chart_payload()).unwrap();
        assert_eq!(max_value(&bars.high), Some(14.5));
        assert_eq!(max_value(&[]), None);
    }

    #[test]
    fn index_symbols_are_path_encoded() {
        assert_eq!(encode_symbol("^GSPC"), "%5EGSPC");
        assert_eq!(encode_symbol("KRW=X"), "KRW%3DX");
        assert_eq!(encode_symbol("AAPL"), "AAPL");
    }
}
