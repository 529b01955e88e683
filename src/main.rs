mod config;
mod error;
mod fetcher;
mod highs;
mod rankings;
mod render;
mod snapshot;
mod types;
mod universe;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::{Config, ETF_FILE, HIGHS_FILE, LARGE_CAPS, RUSSELL_FILE, SP500_FILE};
use crate::error::Result;
use crate::highs::{HighCandidate, HighWaterStore};
use crate::render::{kst_update_stamp, render_dashboard, DashboardData};

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    let updated_at = kst_update_stamp();
    info!("미국 시장 트랙커 — {updated_at}");

    // --- Universe files: the only input whose failure aborts the run ---
    let sp500 = universe::load_universe(&cfg.data_path(SP500_FILE))?;
    let russell = universe::load_universe(&cfg.data_path(RUSSELL_FILE))?;
    let etfs = universe::load_universe(&cfg.data_path(ETF_FILE))?;
    info!(
        "Universe loaded: {} S&P 500, {} Russell 2000, {} ETFs",
        sp500.len(),
        russell.len(),
        etfs.len()
    );

    let client = fetcher::build_client()?;
    let mut store = HighWaterStore::load(&cfg.data_path(HIGHS_FILE));
    let stored_symbols = store.len();

    // --- Index bar ---
    let indices = fetcher::fetch_index_quotes(&client, &cfg).await;
    info!(
        "Index data: {}/{} available",
        indices.iter().filter(|q| q.value.is_some()).count(),
        indices.len()
    );

    // --- Large-cap cards ---
    let card_symbols: Vec<String> = LARGE_CAPS.iter().map(|(t, _)| t.to_string()).collect();
    let card_quotes = fetcher::fetch_daily_quotes(&client, &cfg, &card_symbols).await;
    let cards = snapshot::build_card_snapshots(LARGE_CAPS, &card_quotes);
    info!("Large caps: {}/{} cards", cards.len(), LARGE_CAPS.len());

    // --- Stock universe: daily quotes + trailing month volume ---
    let stock_universe = universe::merge(&[&sp500, &russell]);
    let stock_symbols: Vec<String> = stock_universe.keys().cloned().collect();
    info!("Fetching daily quotes for {} stocks", stock_symbols.len());
    let stock_quotes = fetcher::fetch_daily_quotes(&client, &cfg, &stock_symbols).await;
    info!("Fetching 1-month volume history");
    let avg_volumes = fetcher::fetch_avg_volumes(&client, &cfg, &stock_symbols).await;

    let (snapshots, stats) =
        snapshot::build_stock_snapshots(&stock_universe, &stock_quotes, &avg_volumes);
    info!(
        accepted = stats.accepted,
        missing_close = stats.rejected_missing_close,
        zero_close = stats.rejected_zero_close,
        "Stock snapshots: {}/{} accepted",
        stats.accepted,
        stats.total
    );

    let gainers = rankings::top_gainers(&snapshots);
    let unusual = rankings::unusual_volume(&snapshots, cfg.min_volume_ratio);

    // --- 52-week highs over the momentum window ---
    let candidates = rankings::momentum_candidates(&snapshots, cfg.candidate_cap);
    let candidate_symbols: Vec<String> = candidates.iter().map(|s| s.ticker.clone()).collect();
    info!(
        "Checking 52-week highs for {} candidates",
        candidate_symbols.len()
    );
    let trailing_highs = fetcher::fetch_trailing_highs(&client, &cfg, &candidate_symbols).await;

    let high_candidates: Vec<HighCandidate> = candidates
        .into_iter()
        .map(|snapshot| {
            let trailing_high = trailing_highs.get(&snapshot.ticker).copied();
            HighCandidate { snapshot, trailing_high }
        })
        .collect();
    let new_highs = store.evaluate(&high_candidates, cfg.high_tolerance);
    store.persist()?;
    info!(
        "52-week highs: {} events, store {} → {} symbols",
        new_highs.len(),
        stored_symbols,
        store.len()
    );

    // --- ETFs ---
    let etf_symbols: Vec<String> = etfs.keys().cloned().collect();
    let etf_quotes = fetcher::fetch_daily_quotes(&client, &cfg, &etf_symbols).await;
    let (etf_snapshots, etf_stats) = snapshot::build_etf_snapshots(&etfs, &etf_quotes);
    info!(
        "ETF snapshots: {}/{} accepted",
        etf_stats.accepted, etf_stats.total
    );

    let etf_gainers = rankings::etf_gainers(&etf_snapshots);
    let etf_losers = rankings::etf_losers(&etf_snapshots);
    let etf_active = rankings::etf_most_active(&etf_snapshots);

    // --- Render and write the single deliverable ---
    let html = render_dashboard(&DashboardData {
        updated_at: &updated_at,
        indices: &indices,
        cards: &cards,
        gainers: &gainers,
        unusual_volume: &unusual,
        new_highs: &new_highs,
        etf_gainers: &etf_gainers,
        etf_losers: &etf_losers,
        etf_active: &etf_active,
    });
    std::fs::write(&cfg.output_path, &html)?;
    info!("Dashboard written to {} ({} bytes)", cfg.output_path, html.len());

    Ok(())
}
