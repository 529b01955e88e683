use crate::error::{AppError, Result};

pub const CHART_API_URL: &str = "https://query1.finance.yahoo.com";

/// Timeout for a single chart request (seconds).
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Per-symbol fan-out inside one batch. The upstream treats a batch as one
/// logical request; this bounds how many chart GETs are in flight for it.
pub const BATCH_CONCURRENCY: usize = 8;

/// Rows kept per ranking view.
pub const TOP_N: usize = 10;

/// Volume ratio at which the 배율 badge switches to the extreme style.
pub const VOLUME_EXTREME_RATIO: f64 = 4.0;

/// Universe and state file names, resolved under `data_dir`.
pub const SP500_FILE: &str = "tickers_sp500.json";
pub const RUSSELL_FILE: &str = "tickers_russell2000.json";
pub const ETF_FILE: &str = "etf_list.json";
pub const HIGHS_FILE: &str = "52week_highs.json";

/// How an index value is rendered in the header bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexStyle {
    /// Comma-grouped 2dp (equity indices, FX).
    Points,
    /// 3dp with a trailing % (treasury yield).
    Yield,
    /// Plain 2dp (VIX).
    Plain,
}

#[derive(Debug, Clone, Copy)]
pub struct IndexSpec {
    pub symbol: &'static str,
    pub label: &'static str,
    pub style: IndexStyle,
    /// 원/달러: a falling rate (원화 강세) renders as the positive color.
    pub invert_color: bool,
}

/// Index bar entries, in display order.
pub const INDICES: &[IndexSpec] = &[
    IndexSpec { symbol: "^GSPC", label: "S&P 500", style: IndexStyle::Points, invert_color: false },
    IndexSpec { symbol: "^IXIC", label: "나스닥", style: IndexStyle::Points, invert_color: false },
    IndexSpec { symbol: "^DJI", label: "다우존스", style: IndexStyle::Points, invert_color: false },
    IndexSpec { symbol: "^VIX", label: "VIX", style: IndexStyle::Plain, invert_color: false },
    IndexSpec { symbol: "^TNX", label: "US 10Y", style: IndexStyle::Yield, invert_color: false },
    IndexSpec { symbol: "KRW=X", label: "원/달러", style: IndexStyle::Points, invert_color: true },
];

/// Large-cap card grid: fixed symbols with Korean display names.
pub const LARGE_CAPS: &[(&str, &str)] = &[
    ("AAPL", "애플"),
    ("MSFT", "마이크로소프트"),
    ("GOOGL", "알파벳"),
    ("AMZN", "아마존"),
    ("NVDA", "엔비디아"),
    ("META", "메타"),
    ("TSLA", "테슬라"),
    ("PLTR", "팔란티어"),
];

#[derive(Debug, Clone)]
pub struct Config {
    pub chart_api_url: String,
    /// Directory holding universe files and the high-water store (DATA_DIR)
    pub data_dir: String,
    /// Where the rendered dashboard is written (OUTPUT_PATH)
    pub output_path: String,
    pub log_level: String,
    /// Symbols per daily-quote batch (QUOTE_BATCH_SIZE)
    pub quote_batch_size: usize,
    /// Symbols per historical-window batch (HISTORY_BATCH_SIZE)
    pub history_batch_size: usize,
    /// Sleep between batches, seconds (BATCH_DELAY_SECS)
    pub batch_delay_secs: u64,
    /// Attempts per batch before its missing symbols are given up (FETCH_RETRIES)
    pub fetch_retries: u32,
    /// Sleep between retry attempts, seconds (RETRY_DELAY_SECS)
    pub retry_delay_secs: u64,
    /// Momentum window checked against trailing-year highs (CANDIDATE_CAP)
    pub candidate_cap: usize,
    /// close >= trailing_high * high_tolerance qualifies (HIGH_TOLERANCE)
    pub high_tolerance: f64,
    /// Minimum vol_ratio for the unusual-volume view (MIN_VOLUME_RATIO)
    pub min_volume_ratio: f64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            chart_api_url: std::env::var("CHART_API_URL")
                .unwrap_or_else(|_| CHART_API_URL.to_string()),
            data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()),
            output_path: std::env::var("OUTPUT_PATH").unwrap_or_else(|_| "index.html".to_string()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            quote_batch_size: std::env::var("QUOTE_BATCH_SIZE")
                .unwrap_or_else(|_| "100".to_string())
                .parse::<usize>()
                .unwrap_or(100)
                .max(1),
            history_batch_size: std::env::var("HISTORY_BATCH_SIZE")
                .unwrap_or_else(|_| "50".to_string())
                .parse::<usize>()
                .unwrap_or(50)
                .max(1),
            batch_delay_secs: std::env::var("BATCH_DELAY_SECS")
                .unwrap_or_else(|_| "2".to_string())
                .parse::<u64>()
                .unwrap_or(2),
            fetch_retries: std::env::var("FETCH_RETRIES")
                .unwrap_or_else(|_| "2".to_string())
                .parse::<u32>()
                .unwrap_or(2)
                .max(1),
            retry_delay_secs: std::env::var("RETRY_DELAY_SECS")
                .unwrap_or_else(|_| "5".to_string())
                .parse::<u64>()
                .unwrap_or(5),
            candidate_cap: std::env::var("CANDIDATE_CAP")
                .unwrap_or_else(|_| "200".to_string())
                .parse::<usize>()
                .unwrap_or(200),
            high_tolerance: std::env::var("HIGH_TOLERANCE")
                .unwrap_or_else(|_| "0.99".to_string())
                .parse::<f64>()
                .map_err(|_| AppError::Config("HIGH_TOLERANCE must be a number".to_string()))?,
            min_volume_ratio: std::env::var("MIN_VOLUME_RATIO")
                .unwrap_or_else(|_| "1.5".to_string())
                .parse::<f64>()
                .map_err(|_| AppError::Config("MIN_VOLUME_RATIO must be a number".to_string()))?,
        })
    }

    pub fn data_path(&self, file: &str) -> std::path::PathBuf {
        std::path::Path::new(&self.data_dir).join(file)
    }
}
