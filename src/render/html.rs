use crate::config::VOLUME_EXTREME_RATIO;
use crate::render::format::{fmt_index_value, fmt_number, fmt_pct, fmt_pct_opt, fmt_price};
use crate::types::{EtfSnapshot, IndexQuote, NewHighEvent, StockSnapshot};

/// Everything one run feeds into the page, pre-ranked and pre-validated.
pub struct DashboardData<'a> {
    pub updated_at: &'a str,
    pub indices: &'a [IndexQuote],
    pub cards: &'a [StockSnapshot],
    pub gainers: &'a [StockSnapshot],
    pub unusual_volume: &'a [StockSnapshot],
    pub new_highs: &'a [NewHighEvent],
    pub etf_gainers: &'a [EtfSnapshot],
    pub etf_losers: &'a [EtfSnapshot],
    pub etf_active: &'a [EtfSnapshot],
}

/// Update badge in Korean standard time: `2026.08.06 07:30 KST`.
pub fn kst_update_stamp() -> String {
    chrono::Utc::now()
        .with_timezone(&chrono_tz::Asia::Seoul)
        .format("%Y.%m.%d %H:%M KST")
        .to_string()
}

const EMPTY_MSG: &str = "데이터를 불러오는 중 오류가 발생했습니다.";
const EMPTY_MSG_HIGHS: &str = "오늘 신고가 종목 없음";

fn change_class(pct: f64) -> &'static str {
    if pct >= 0.0 {
        "change-positive"
    } else {
        "change-negative"
    }
}

// 원/달러: 환율 하락(원화 강세)이 긍정적이라 색이 반전된다.
fn index_change_class(invert: bool, pct: f64) -> &'static str {
    if invert {
        if pct > 0.0 {
            "change-negative"
        } else {
            "change-positive"
        }
    } else {
        change_class(pct)
    }
}

/// Names land inside single-quoted onclick arguments.
fn js_escape(name: &str) -> String {
    name.replace('\\', "\\\\").replace('\'', "\\'")
}

fn empty_row(msg: &str) -> String {
    format!(
        r#"<tr><td colspan="6" style="text-align:center;color:var(--hv-text-tertiary);padding:24px;">{msg}</td></tr>"#
    )
}

fn rows_or_empty(rows: String, msg: &str) -> String {
    if rows.is_empty() {
        empty_row(msg)
    } else {
        rows
    }
}

fn row_open(ticker: &str, name: &str) -> String {
    format!(
        r#"<tr data-ticker="{ticker}" onclick="selectTicker('{ticker}', '{name}')" style="cursor:pointer;">"#,
        name = js_escape(name)
    )
}

fn ticker_cell(ticker: &str, name: &str) -> String {
    format!(
        r#"<td><div class="ticker-cell"><span class="ticker-symbol">{ticker}</span><span class="ticker-name">{name}</span></div></td>"#
    )
}

fn sector_cell(sector_kr: &str) -> String {
    if sector_kr.is_empty() {
        r#"<td class="hide-mobile"></td>"#.to_string()
    } else {
        format!(r#"<td class="hide-mobile"><span class="sector-tag">{sector_kr}</span></td>"#)
    }
}

fn index_items(indices: &[IndexQuote]) -> String {
    let mut out = String::new();
    for q in indices {
        let cls = index_change_class(q.spec.invert_color, q.change_pct.unwrap_or(0.0));
        out.push_str(&format!(
            r#"<div class="index-item">
  <div class="label">{label}</div>
  <div><span class="value">{value}</span><span class="change {cls}">{change}</span></div>
</div>
"#,
            label = q.spec.label,
            value = fmt_index_value(q.value, q.spec.style),
            change = fmt_pct_opt(q.change_pct),
        ));
    }
    out
}

fn card_items(cards: &[StockSnapshot]) -> String {
    let mut out = String::new();
    for card in cards {
        let change_cls = if card.change_pct >= 0.0 { "up" } else { "down" };
        out.push_str(&format!(
            r#"<div class="mag7-card" onclick="selectTicker('{ticker}', '{name_js}')">
  <div class="mag7-card-top"><span class="mag7-ticker">{ticker}</span><span class="mag7-name">{name}</span></div>
  <div class="mag7-price">{price}</div>
  <div class="mag7-change {change_cls}">{change}</div>
  <div class="mag7-vol">Vol {volume}</div>
</div>
"#,
            ticker = card.ticker,
            name = card.name,
            name_js = js_escape(&card.name),
            price = fmt_price(card.close),
            change = fmt_pct(card.change_pct),
            volume = fmt_number(card.volume),
        ));
    }
    out
}

fn gainer_rows(items: &[StockSnapshot]) -> String {
    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        out.push_str(&format!(
            "{open}<td class=\"rank\">{rank}</td>{ticker}{sector}<td class=\"right price\">{price}</td><td class=\"right {cls}\">{change}</td><td class=\"right volume hide-mobile\">{volume}</td></tr>\n",
            open = row_open(&item.ticker, &item.name),
            rank = i + 1,
            ticker = ticker_cell(&item.ticker, &item.name),
            sector = sector_cell(&item.sector_kr),
            price = fmt_price(item.close),
            cls = change_class(item.change_pct),
            change = fmt_pct(item.change_pct),
            volume = fmt_number(item.volume),
        ));
    }
    out
}

fn volume_rows(items: &[StockSnapshot]) -> String {
    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        let ratio_cls = if item.vol_ratio >= VOLUME_EXTREME_RATIO {
            "volume-extreme"
        } else {
            "volume-high"
        };
        out.push_str(&format!(
            "{open}<td class=\"rank\">{rank}</td>{ticker}<td class=\"right price\">{price}</td><td class=\"right {cls}\">{change}</td><td class=\"right volume hide-mobile\">{volume}</td><td class=\"right\"><span class=\"volume-ratio {ratio_cls}\">{ratio:.1}배</span></td></tr>\n",
            open = row_open(&item.ticker, &item.name),
            rank = i + 1,
            ticker = ticker_cell(&item.ticker, &item.name),
            price = fmt_price(item.close),
            cls = change_class(item.change_pct),
            change = fmt_pct(item.change_pct),
            volume = fmt_number(item.volume),
            ratio = item.vol_ratio,
        ));
    }
    out
}

fn high_rows(items: &[NewHighEvent]) -> String {
    let mut out = String::new();
    for (i, event) in items.iter().enumerate() {
        let s = &event.snapshot;
        out.push_str(&format!(
            "{open}<td class=\"rank\">{rank}</td>{ticker}{sector}<td class=\"right price\">{price}</td><td class=\"right hide-mobile\">{prev_high}</td><td class=\"right {cls}\">{beat}</td></tr>\n",
            open = row_open(&s.ticker, &s.name),
            rank = i + 1,
            ticker = ticker_cell(&s.ticker, &s.name),
            sector = sector_cell(&s.sector_kr),
            price = fmt_price(s.close),
            prev_high = fmt_price(event.prev_high),
            cls = change_class(event.beat_pct),
            beat = fmt_pct(event.beat_pct),
        ));
    }
    out
}

fn etf_rows(items: &[EtfSnapshot]) -> String {
    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        out.push_str(&format!(
            "{open}<td class=\"rank\">{rank}</td><td><div class=\"ticker-cell\"><span class=\"ticker-symbol\">{ticker}</span><span class=\"ticker-name hide-mobile\">{name}</span></div></td><td><span class=\"etf-category\">{category}</span></td><td class=\"right price\">{price}</td><td class=\"right {cls}\">{change}</td><td class=\"right volume hide-mobile\">{volume}</td></tr>\n",
            open = row_open(&item.ticker, &item.name),
            rank = i + 1,
            ticker = item.ticker,
            name = item.name,
            category = item.category,
            price = fmt_price(item.close),
            cls = change_class(item.change_pct),
            change = fmt_pct(item.change_pct),
            volume = fmt_number(item.volume),
        ));
    }
    out
}

fn section(title: &str, badge: &str, badge_cls: &str, head: &str, body: String) -> String {
    format!(
        r#"<div class="section">
  <div class="section-header"><span class="section-title">{title}</span><span class="section-badge {badge_cls}">{badge}</span></div>
  <div class="table-wrapper"><table class="data-table"><thead><tr>{head}</tr></thead><tbody>
{body}</tbody></table></div>
</div>
"#
    )
}

/// Assemble the complete self-contained dashboard document.
pub fn render_dashboard(d: &DashboardData) -> String {
    let mut html = String::with_capacity(64 * 1024);

    html.push_str(DOC_HEAD);
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n");

    html.push_str(&format!(
        r#"<header class="hv-header">
  <div class="hv-header-inner">
    <div class="hv-header-center">
      <h1 style="text-align:center">미국 시장 트랙커</h1>
      <span class="hv-header-category">US MARKET · STOCKS · ETF</span>
    </div>
    <div class="hv-header-right">
      <div class="hv-update-badge"><span class="hv-live-dot"></span><span>{}</span></div>
    </div>
  </div>
</header>
"#,
        d.updated_at
    ));

    html.push_str("<div class=\"container\">\n");
    html.push_str(&format!(
        "<div class=\"index-bar\">{}</div>\n",
        index_items(d.indices)
    ));
    html.push_str(
        r#"<div class="color-note">미국식 색상: <span style="color:var(--green)">상승</span> / <span style="color:var(--red)">하락</span></div>
<div class="chart-section">
  <div class="chart-header">
    <span class="chart-ticker" id="chartTicker">SPY</span>
    <span class="chart-name" id="chartName">SPDR S&P 500</span>
  </div>
  <div class="chart-container" id="tradingview_chart"></div>
</div>
<div class="tab-container">
  <button class="tab-btn active" onclick="switchTab('stocks')">개별 주식</button>
  <button class="tab-btn" onclick="switchTab('etf')">ETF</button>
</div>
"#,
    );

    // --- Stocks tab ---
    html.push_str("<div id=\"tab-stocks\" class=\"tab-content active\">\n");
    html.push_str(&format!(
        r#"<div class="section mag7-section">
  <div class="section-header"><span class="section-title">주요 주식</span><span class="section-badge badge-blue">TOP 8</span></div>
  <div class="mag7-grid">{}</div>
</div>
"#,
        card_items(d.cards)
    ));
    html.push_str(&section(
        "급등주 Top 10",
        "오늘",
        "badge-green",
        r#"<th style="width:24px">#</th><th>종목</th><th class="hide-mobile">섹터</th><th class="right" style="width:70px">종가</th><th class="right" style="width:60px">등락</th><th class="right hide-mobile">거래량</th>"#,
        rows_or_empty(gainer_rows(d.gainers), EMPTY_MSG),
    ));
    html.push_str(&section(
        "이상 거래량",
        "급증",
        "badge-yellow",
        r#"<th style="width:24px">#</th><th>종목</th><th class="right" style="width:70px">종가</th><th class="right" style="width:60px">등락</th><th class="right hide-mobile">거래량</th><th class="right" style="width:55px">배율</th>"#,
        rows_or_empty(volume_rows(d.unusual_volume), EMPTY_MSG),
    ));
    html.push_str(&section(
        "52주 신고가",
        "갱신",
        "badge-blue",
        r#"<th style="width:24px">#</th><th>종목</th><th class="hide-mobile">섹터</th><th class="right" style="width:70px">종가</th><th class="right hide-mobile">이전고가</th><th class="right" style="width:60px">갱신</th>"#,
        rows_or_empty(high_rows(d.new_highs), EMPTY_MSG_HIGHS),
    ));
    html.push_str("</div>\n");

    // --- ETF tab ---
    let etf_head = r#"<th style="width:24px">#</th><th>ETF</th><th>카테고리</th><th class="right" style="width:70px">종가</th><th class="right" style="width:60px">등락</th><th class="right hide-mobile">거래량</th>"#;
    html.push_str("<div id=\"tab-etf\" class=\"tab-content\">\n");
    html.push_str(&section(
        "ETF 상승 Top 10",
        "오늘",
        "badge-green",
        etf_head,
        rows_or_empty(etf_rows(d.etf_gainers), EMPTY_MSG),
    ));
    html.push_str(&section(
        "ETF 하락 Top 10",
        "오늘",
        "badge-red",
        etf_head,
        rows_or_empty(etf_rows(d.etf_losers), EMPTY_MSG),
    ));
    html.push_str(&section(
        "ETF 거래량 Top 10",
        "활발",
        "badge-blue",
        etf_head,
        rows_or_empty(etf_rows(d.etf_active), EMPTY_MSG),
    ));
    html.push_str("</div>\n");

    html.push_str(SHARE_BAR);
    html.push_str("</div>\n");
    html.push_str(SCRIPT);
    html.push_str("</body>\n</html>\n");

    html
}

const DOC_HEAD: &str = r#"<!DOCTYPE html>
<html lang="ko">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width,initial-scale=1.0,maximum-scale=1.0,user-scalable=no">
<title>미국 시장 트랙커 | Herdvibe</title>
<link rel="preconnect" href="https://fonts.googleapis.com">
<link href="https://fonts.googleapis.com/css2?family=Noto+Sans+KR:wght@300;400;500;600;700&family=JetBrains+Mono:wght@400;500;600;700&family=Plus+Jakarta+Sans:wght@400;500;600;700;800&display=swap" rel="stylesheet">
<script src="https://t1.kakaocdn.net/kakao_js_sdk/2.7.1/kakao.min.js" crossorigin="anonymous" async></script>
<style>
"#;

const STYLE: &str = r#":root{
  --hv-primary:#3b82f6;--hv-primary-light:#60a5fa;--hv-primary-dark:#2563eb;
  --hv-primary-glow:rgba(59,130,246,0.12);
  --hv-up:#22c55e;--hv-up-bg:rgba(34,197,94,0.1);
  --hv-down:#ef4444;--hv-down-bg:rgba(239,68,68,0.1);
  --hv-warning:#f59e0b;--hv-warning-bg:rgba(245,158,11,0.1);
  --hv-neutral:#6b7280;
  --hv-bg-base:#000;--hv-bg-surface:#0a0a0a;--hv-bg-card:#111;
  --hv-bg-card-hover:#181818;--hv-bg-elevated:#1a1a1a;
  --hv-text-primary:#e5e5e5;--hv-text-secondary:#8a8a8a;
  --hv-text-tertiary:#555;--hv-text-muted:#3a3a3a;
  --hv-border:rgba(255,255,255,0.06);--hv-border-strong:rgba(255,255,255,0.12);
  --hv-font-display:'Plus Jakarta Sans',sans-serif;
  --hv-font-body:'Noto Sans KR',-apple-system,BlinkMacSystemFont,sans-serif;
  --hv-font-mono:'JetBrains Mono','SF Mono',monospace;
  --hv-radius-sm:6px;--hv-radius-md:10px;--hv-radius-lg:14px;
  --hv-shadow-sm:0 1px 3px rgba(0,0,0,.5);--hv-shadow-lg:0 8px 32px rgba(0,0,0,.7);
  --hv-transition-fast:150ms ease;--hv-transition:250ms ease;
  --hv-max-width:1280px;--hv-header-height:60px;
  --green:#22c55e;--green-bg:rgba(34,197,94,0.1);
  --red:#ef4444;--red-bg:rgba(239,68,68,0.1);
  --accent:#3b82f6;--accent-bg:rgba(59,130,246,0.12);
  --yellow:#f59e0b;--yellow-bg:rgba(245,158,11,0.1);
}
*,*::before,*::after{box-sizing:border-box;margin:0;padding:0}
html{font-size:16px;scroll-behavior:smooth;-webkit-font-smoothing:antialiased;height:100%}
body{font-family:var(--hv-font-body);background:var(--hv-bg-base);color:var(--hv-text-primary);line-height:1.6;min-height:100%;overflow-y:auto;-webkit-overflow-scrolling:touch}
::selection{background:var(--hv-primary);color:#fff}
::-webkit-scrollbar{width:5px;height:5px}
::-webkit-scrollbar-track{background:var(--hv-bg-base)}
::-webkit-scrollbar-thumb{background:#333;border-radius:3px}
.hv-header{position:sticky;top:0;z-index:100;height:var(--hv-header-height);background:rgba(0,0,0,.92);backdrop-filter:blur(20px) saturate(180%);-webkit-backdrop-filter:blur(20px) saturate(180%);border-bottom:1px solid var(--hv-border);display:flex;align-items:center;padding:0 24px}
.hv-header-inner{width:100%;max-width:var(--hv-max-width);margin:0 auto;display:flex;align-items:center;justify-content:space-between;gap:16px}
.hv-header-center{display:flex;flex-direction:column;min-width:0}
.hv-header-center h1{font-family:var(--hv-font-display);font-size:.938rem;font-weight:600;color:var(--hv-text-primary);white-space:nowrap}
.hv-header-category{font-size:.7rem;color:var(--hv-text-tertiary);font-weight:500;text-transform:uppercase;letter-spacing:.08em}
.hv-header-right{display:flex;align-items:center;gap:8px;flex-shrink:0}
.hv-update-badge{font-family:var(--hv-font-mono);font-size:.688rem;color:var(--hv-text-tertiary);white-space:nowrap;display:flex;align-items:center;gap:6px}
.hv-live-dot{width:5px;height:5px;background:var(--green);border-radius:50%;animation:pulse 2s infinite}
@keyframes pulse{0%,100%{opacity:1}50%{opacity:.3}}
.container{max-width:var(--hv-max-width);margin:0 auto;padding:16px 24px 48px}
.index-bar{display:grid;grid-template-columns:repeat(3,1fr);gap:8px;margin-bottom:12px}
.index-item{background:var(--hv-bg-card);border:1px solid var(--hv-border);border-radius:var(--hv-radius-md);padding:12px 14px;transition:border-color .2s}
.index-item:hover{border-color:var(--hv-border-strong)}
.index-item .label{font-size:10px;font-weight:500;color:var(--hv-text-muted);text-transform:uppercase;letter-spacing:.5px;margin-bottom:4px}
.index-item .value{font-family:var(--hv-font-mono);font-size:15px;font-weight:700;color:var(--hv-text-primary)}
.index-item .change{font-family:var(--hv-font-mono);font-size:11px;font-weight:600;margin-left:6px}
.color-note{font-size:11px;color:var(--hv-text-secondary);margin-bottom:16px;padding:8px 14px;background:var(--hv-bg-card);border-radius:var(--hv-radius-sm);border-left:3px solid var(--accent)}
.chart-section{margin-bottom:16px}
.chart-header{display:flex;align-items:center;gap:10px;margin-bottom:8px}
.chart-ticker{font-family:var(--hv-font-mono);font-size:18px;font-weight:700;color:var(--hv-text-primary)}
.chart-name{font-size:12px;color:var(--hv-text-secondary)}
.chart-container{background:var(--hv-bg-card);border:1px solid var(--hv-border);border-radius:var(--hv-radius-lg);overflow:hidden;height:260px}
.tab-container{display:flex;gap:3px;margin-bottom:16px;background:var(--hv-bg-card);padding:4px;border-radius:var(--hv-radius-md);border:1px solid var(--hv-border)}
.tab-btn{flex:1;padding:10px 12px;background:transparent;border:none;border-radius:var(--hv-radius-sm);color:var(--hv-text-tertiary);font-family:var(--hv-font-body);font-size:13px;font-weight:600;cursor:pointer;transition:all .2s;display:flex;align-items:center;justify-content:center;gap:6px;-webkit-tap-highlight-color:transparent}
.tab-btn:hover{color:var(--hv-text-secondary)}
.tab-btn.active{background:var(--hv-bg-elevated);color:var(--hv-text-primary);box-shadow:var(--hv-shadow-sm)}
.tab-content{display:none}
.tab-content.active{display:block}
.section{margin-bottom:20px}
.section-header{display:flex;align-items:center;gap:8px;margin-bottom:10px;padding-bottom:8px;border-bottom:1px solid var(--hv-border);justify-content:center}
.section-title{font-size:14px;font-weight:700;color:var(--hv-text-primary)}
.section-badge{font-size:9px;font-weight:600;padding:3px 8px;border-radius:4px;margin-left:auto;white-space:nowrap;font-family:var(--hv-font-mono);letter-spacing:.3px}
.badge-green{background:var(--green-bg);color:var(--green)}
.badge-red{background:var(--red-bg);color:var(--red)}
.badge-blue{background:var(--accent-bg);color:var(--accent)}
.badge-yellow{background:var(--yellow-bg);color:var(--yellow)}
.table-wrapper{border-radius:var(--hv-radius-lg);border:1px solid var(--hv-border);background:var(--hv-bg-card);overflow:hidden;overflow-x:auto;-webkit-overflow-scrolling:touch;position:relative}
.data-table{width:100%;border-collapse:collapse;font-size:12px;table-layout:fixed}
.data-table thead th{font-family:var(--hv-font-mono);font-size:9px;font-weight:600;color:var(--hv-text-muted);text-transform:uppercase;letter-spacing:.6px;padding:10px 8px;text-align:left;border-bottom:1px solid var(--hv-border);white-space:nowrap;background:var(--hv-bg-surface)}
.data-table thead th.right{text-align:right}
.data-table tbody tr{border-bottom:1px solid var(--hv-border);transition:background .12s}
.data-table tbody tr:last-child{border-bottom:none}
.data-table tbody tr:hover,.data-table tbody tr:active{background:var(--hv-bg-card-hover)}
.data-table tbody tr.selected{background:var(--accent-bg);border-left:3px solid var(--accent)}
.data-table tbody td{padding:10px 8px;vertical-align:middle}
.data-table tbody td.right{text-align:right}
.rank{font-family:var(--hv-font-mono);font-size:10px;font-weight:700;color:var(--hv-text-muted);width:22px;text-align:center}
.ticker-cell{display:flex;flex-direction:column;gap:2px;min-width:0}
.ticker-symbol{font-family:var(--hv-font-mono);font-weight:700;font-size:12px;color:var(--hv-text-primary)}
.ticker-name{font-size:10px;color:var(--hv-text-secondary);white-space:nowrap;overflow:hidden;text-overflow:ellipsis}
.sector-tag{font-size:9px;padding:2px 6px;border-radius:4px;background:rgba(255,255,255,0.04);color:var(--hv-text-secondary);font-weight:500}
.price{font-family:var(--hv-font-mono);font-weight:600;font-size:12px;color:var(--hv-text-primary)}
.change-positive{color:var(--green);font-family:var(--hv-font-mono);font-weight:700;font-size:12px}
.change-negative{color:var(--red);font-family:var(--hv-font-mono);font-weight:700;font-size:12px}
.volume{font-family:var(--hv-font-mono);font-size:10px;color:var(--hv-text-secondary)}
.volume-ratio{font-family:var(--hv-font-mono);font-weight:700;font-size:11px}
.volume-high{color:var(--yellow)}
.volume-extreme{color:var(--red)}
.etf-category{font-size:9px;color:var(--accent);white-space:nowrap;overflow:hidden;text-overflow:ellipsis;max-width:80px;display:inline-block;font-weight:500}
.hv-share-bar{display:flex;align-items:center;justify-content:space-between;padding:12px 24px;border:1px solid var(--hv-border);border-radius:var(--hv-radius-lg);background:var(--hv-bg-surface);margin-top:24px}
.hv-share-bar-preview{font-size:.75rem;color:var(--hv-text-tertiary);overflow:hidden;text-overflow:ellipsis;white-space:nowrap;max-width:50%;font-family:var(--hv-font-mono)}
.hv-share-bar-preview span{color:var(--hv-text-secondary);font-weight:500}
.hv-share-bar-buttons{display:flex;align-items:center;gap:6px;flex-shrink:0}
.share-btn{display:inline-flex;align-items:center;gap:6px;padding:7px 14px;border-radius:6px;font-size:.75rem;font-weight:600;font-family:var(--hv-font-body);cursor:pointer;transition:all var(--hv-transition-fast);border:1px solid var(--hv-border-strong);background:var(--hv-bg-card);color:#999;white-space:nowrap}
.share-btn:hover{transform:translateY(-1px);box-shadow:var(--hv-shadow-sm);color:var(--hv-text-primary)}
.share-btn svg{flex-shrink:0}
.share-btn--x:hover{border-color:#fff;color:#fff;background:#111}
.share-btn--kakao:hover{border-color:#FEE500;color:#191919;background:#FEE500}
.share-btn--tg:hover{border-color:#26A5E4;color:#fff;background:rgba(38,165,228,.15)}
.share-btn--ig:hover{border-color:#E4405F;color:#fff;background:rgba(228,64,95,.15)}
.share-btn--copy:hover{border-color:var(--hv-primary);color:var(--hv-primary-light);background:var(--hv-primary-glow)}
.toast-wrap{position:fixed;bottom:20px;right:20px;z-index:200;display:flex;flex-direction:column;gap:8px}
.toast{background:var(--hv-bg-elevated);border:1px solid var(--hv-border-strong);border-radius:var(--hv-radius-md);padding:10px 18px;font-size:.788rem;color:var(--hv-text-primary);box-shadow:var(--hv-shadow-lg);animation:toastIn .3s ease;border-left:3px solid var(--green)}
@keyframes toastIn{from{opacity:0;transform:translateY(12px)}to{opacity:1;transform:translateY(0)}}
.mag7-section{margin-bottom:20px}
.mag7-grid{display:grid;grid-template-columns:repeat(4,1fr);gap:8px}
.mag7-card{background:var(--hv-bg-card);border:1px solid var(--hv-border);border-radius:var(--hv-radius-md);padding:14px 16px;cursor:pointer;transition:all .2s;position:relative;overflow:hidden}
.mag7-card:hover{border-color:var(--hv-border-strong);transform:translateY(-1px);box-shadow:var(--hv-shadow-sm)}
.mag7-card.selected{border-color:var(--accent);background:var(--accent-bg)}
.mag7-card-top{display:flex;align-items:center;justify-content:space-between;margin-bottom:8px}
.mag7-ticker{font-family:var(--hv-font-mono);font-size:13px;font-weight:700;color:var(--hv-text-primary)}
.mag7-name{font-size:9px;color:var(--hv-text-tertiary);font-weight:500}
.mag7-price{font-family:var(--hv-font-mono);font-size:15px;font-weight:700;color:var(--hv-text-primary);margin-bottom:2px}
.mag7-change{font-family:var(--hv-font-mono);font-size:12px;font-weight:700}
.mag7-change.up{color:var(--green)}
.mag7-change.down{color:var(--red)}
.mag7-vol{font-family:var(--hv-font-mono);font-size:9px;color:var(--hv-text-muted);margin-top:4px}
.hide-mobile{display:none}
@media(min-width:600px){
  .container{padding:20px 24px 48px}
  .index-bar{grid-template-columns:repeat(6,1fr)}
  .index-item .value{font-size:16px}
  .chart-container{height:320px}
  .chart-ticker{font-size:20px}
  .data-table{font-size:13px}
  .data-table thead th{padding:10px 12px;font-size:10px}
  .data-table tbody td{padding:12px 10px}
  .ticker-symbol{font-size:13px}
  .ticker-name{font-size:11px}
  .price{font-size:13px}
  .change-positive,.change-negative{font-size:13px}
  .section-title{font-size:15px}
  .hide-mobile{display:table-cell}
  .etf-category{max-width:none}
}
@media(min-width:900px){
  .chart-container{height:360px}
}
@media(max-width:600px){
  :root{--hv-header-height:52px}
  .hv-header{padding:0 14px}
  .hv-update-badge{display:none}
  .container{padding:12px 14px 40px}
  .index-item{padding:10px 12px}
  .index-item .value{font-size:14px}
  .chart-container{height:240px}
  .mag7-grid{grid-template-columns:repeat(2,1fr)}
  .mag7-card{padding:10px 12px}
  .mag7-price{font-size:13px}
  .hv-share-bar{flex-direction:column;gap:10px;align-items:stretch;padding:12px 14px}
  .hv-share-bar-preview{max-width:100%}
  .hv-share-bar-buttons{justify-content:center;flex-wrap:wrap}
  .share-btn span.label-text{display:none}
  .share-btn{padding:8px 10px}
}
"#;

const SHARE_BAR: &str = r##"<div class="hv-share-bar">
  <div class="hv-share-bar-preview"><span>미국 시장 트랙커</span> — herdvibe.com</div>
  <div class="hv-share-bar-buttons">
    <button class="share-btn share-btn--x" onclick="doShare('twitter')"><svg width="14" height="14" viewBox="0 0 24 24" fill="currentColor"><path d="M18.244 2.25h3.308l-7.227 8.26 8.502 11.24H16.17l-5.214-6.817L4.99 21.75H1.68l7.73-8.835L1.254 2.25H8.08l4.713 6.231zm-1.161 17.52h1.833L7.084 4.126H5.117z"/></svg><span class="label-text">트위터</span></button>
    <button class="share-btn share-btn--kakao" onclick="doShare('kakao')"><svg width="14" height="14" viewBox="0 0 24 24" fill="currentColor"><path d="M12 3C6.477 3 2 6.463 2 10.691c0 2.724 1.8 5.112 4.508 6.458l-1.148 4.265a.5.5 0 0 0 .764.533l4.94-3.26c.304.02.612.03.936.03 5.523 0 10-3.462 10-7.735C22 6.463 17.523 3 12 3z"/></svg><span class="label-text">카카오톡</span></button>
    <button class="share-btn share-btn--tg" onclick="doShare('telegram')"><svg width="14" height="14" viewBox="0 0 24 24" fill="currentColor"><path d="M11.944 0A12 12 0 0 0 0 12a12 12 0 0 0 12 12 12 12 0 0 0 12-12A12 12 0 0 0 12 0zm4.962 7.224c.1-.002.321.023.465.14a.506.506 0 0 1 .171.325c.016.093.036.306.02.472-.18 1.898-.962 6.502-1.36 8.627-.168.9-.499 1.201-.82 1.23-.696.065-1.225-.46-1.9-.902-1.056-.693-1.653-1.124-2.678-1.8-1.185-.78-.417-1.21.258-1.91.177-.184 3.247-2.977 3.307-3.23.007-.032.014-.15-.056-.212s-.174-.041-.249-.024c-.106.024-1.793 1.14-5.061 3.345-.479.33-.913.49-1.302.48-.428-.008-1.252-.241-1.865-.44-.752-.245-1.349-.374-1.297-.789.027-.216.325-.437.893-.663 3.498-1.524 5.83-2.529 6.998-3.014 3.332-1.386 4.025-1.627 4.476-1.635z"/></svg><span class="label-text">텔레그램</span></button>
    <button class="share-btn share-btn--ig" onclick="doShare('instagram',this)"><svg width="14" height="14" viewBox="0 0 24 24" fill="currentColor"><path d="M12 2.163c3.204 0 3.584.012 4.85.07 3.252.148 4.771 1.691 4.919 4.919.058 1.265.069 1.645.069 4.849 0 3.205-.012 3.584-.069 4.849-.149 3.225-1.664 4.771-4.919 4.919-1.266.058-1.644.07-4.85.07-3.204 0-3.584-.012-4.849-.07-3.26-.149-4.771-1.699-4.919-4.92-.058-1.265-.07-1.644-.07-4.849 0-3.204.013-3.583.07-4.849.149-3.227 1.664-4.771 4.919-4.919 1.266-.057 1.645-.069 4.849-.069zM12 0C8.741 0 8.333.014 7.053.072 2.695.272.273 2.69.073 7.052.014 8.333 0 8.741 0 12c0 3.259.014 3.668.072 4.948.2 4.358 2.618 6.78 6.98 6.98C8.333 23.986 8.741 24 12 24c3.259 0 3.668-.014 4.948-.072 4.354-.2 6.782-2.618 6.979-6.98.059-1.28.073-1.689.073-4.948 0-3.259-.014-3.667-.072-4.947-.196-4.354-2.617-6.78-6.979-6.98C15.668.014 15.259 0 12 0zm0 5.838a6.162 6.162 0 100 12.324 6.162 6.162 0 000-12.324zM12 16a4 4 0 110-8 4 4 0 010 8zm6.406-11.845a1.44 1.44 0 100 2.881 1.44 1.44 0 000-2.881z"/></svg><span class="label-text">인스타</span></button>
    <button class="share-btn share-btn--copy" onclick="doShare('link',this)"><svg width="14" height="14" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round"><path d="M10 13a5 5 0 0 0 7.54.54l3-3a5 5 0 0 0-7.07-7.07l-1.72 1.71"/><path d="M14 11a5 5 0 0 0-7.54-.54l-3 3a5 5 0 0 0 7.07 7.07l1.71-1.71"/></svg><span class="label-text">링크 복사</span></button>
  </div>
</div>
"##;

const SCRIPT: &str = r##"<script type="text/javascript" src="https://s3.tradingview.com/tv.js"></script>
<script>
var SHARE_URL='https://herdvibe.com/15';
var SHARE_TITLE='미국 시장 트랙커 — 급등주 · ETF · 거래량 | Herdvibe';
function ensureKakao(){try{if(typeof Kakao!=='undefined'&&!Kakao.isInitialized())Kakao.init('a43ed7b39fac35458f4f9df925a279b5');return typeof Kakao!=='undefined'&&Kakao.isInitialized();}catch(e){return false;}}
function copyToClipboard(t){try{window.parent.postMessage({type:'clipboard',text:t},'*');}catch(e){}try{navigator.clipboard.writeText(t);}catch(e){}}
function flashCopied(btn){if(!btn)return;var o=btn.innerHTML;btn.style.background='#22c55e';btn.style.color='#fff';btn.style.borderColor='#22c55e';var hl=btn.querySelector('.label-text');btn.innerHTML='<svg width="13" height="13" viewBox="0 0 24 24" fill="none" stroke="#fff" stroke-width="3" stroke-linecap="round"><path d="M5 13l4 4L19 7"/></svg>'+(hl?'<span class="label-text" style="color:#fff">복사됨!</span>':'');setTimeout(function(){btn.style.background='';btn.style.color='';btn.style.borderColor='';btn.innerHTML=o;},2000);}
function toast(m){var c=document.querySelector('.toast-wrap');if(!c){c=document.createElement('div');c.className='toast-wrap';document.body.appendChild(c);}var t=document.createElement('div');t.className='toast';t.textContent=m;c.appendChild(t);setTimeout(function(){t.style.opacity='0';t.style.transform='translateY(12px)';t.style.transition='.3s';setTimeout(function(){t.remove();},300);},3000);}
function doShare(p,btn){var u=SHARE_URL,t=encodeURIComponent(SHARE_TITLE),eu=encodeURIComponent(u);switch(p){case'twitter':window.open('https://twitter.com/intent/tweet?text='+t+'&url='+eu,'_blank');break;case'telegram':window.open('https://t.me/share/url?url='+eu+'&text='+t,'_blank');break;case'kakao':if(!ensureKakao()){copyToClipboard(u);toast('링크 복사완료!');}else try{Kakao.Share.sendDefault({objectType:'feed',content:{title:'미국 시장 트랙커',description:'급등주 · ETF · 거래량 분석',imageUrl:'https://raw.githubusercontent.com/kittycapital/kittycapital.github.io/main/assets/herdvibe-og.png',link:{mobileWebUrl:u,webUrl:u}},buttons:[{title:'대시보드 보기',link:{mobileWebUrl:u,webUrl:u}}]});}catch(e){copyToClipboard(u);toast('링크 복사완료!');}break;case'instagram':copyToClipboard(u);flashCopied(btn);toast('링크 복사완료! 인스타그램에 붙여넣기 하세요');break;case'link':copyToClipboard(u);flashCopied(btn);toast('링크가 복사되었습니다');break;}}
ensureKakao();
let currentTicker='SPY';
function switchTab(tabName){
  document.querySelectorAll('.tab-content').forEach(t=>t.classList.remove('active'));
  document.querySelectorAll('.tab-btn').forEach(b=>b.classList.remove('active'));
  document.getElementById('tab-'+tabName).classList.add('active');
  document.querySelectorAll('.tab-btn')[tabName==='stocks'?0:1].classList.add('active');
  sendHeight();
}
function selectTicker(ticker,name){
  if(ticker===currentTicker)return;
  currentTicker=ticker;
  document.getElementById('chartTicker').textContent=ticker;
  document.getElementById('chartName').textContent=name;
  document.querySelectorAll('.data-table tbody tr').forEach(row=>{
    row.classList.toggle('selected',row.dataset.ticker===ticker);
  });
  loadChart(ticker);
  document.querySelector('.chart-section').scrollIntoView({behavior:'smooth',block:'start'});
}
function loadChart(ticker){
  var container=document.getElementById('tradingview_chart');
  container.innerHTML='';
  new TradingView.widget({
    "autosize":true,"symbol":ticker,"interval":"D","timezone":"Asia/Seoul",
    "theme":"dark","style":"1","locale":"kr","toolbar_bg":"#111111",
    "enable_publishing":false,"allow_symbol_change":false,
    "hide_top_toolbar":false,"hide_legend":false,"save_image":false,
    "container_id":"tradingview_chart","range":"12M",
    "backgroundColor":"#111111","gridColor":"#181818"
  });
}
document.addEventListener('DOMContentLoaded',function(){loadChart('SPY');setTimeout(sendHeight,500);});
var _lastH=0,_ht;
function sendHeight(){clearTimeout(_ht);_ht=setTimeout(function(){var h=document.documentElement.scrollHeight;if(Math.abs(h-_lastH)>5){_lastH=h;try{window.parent.postMessage({type:'resize',height:h,id:'hvUSMarket'},'*');window.parent.postMessage({height:h,id:'hvUSMarket'},'*');}catch(e){}}},120);}
window.addEventListener('load',function(){sendHeight();setTimeout(sendHeight,500);setTimeout(sendHeight,2000);});
window.addEventListener('resize',sendHeight);
new ResizeObserver(sendHeight).observe(document.body);
new MutationObserver(sendHeight).observe(document.body,{childList:true,subtree:true});
</script>
"##;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{IndexSpec, IndexStyle};

    fn stock(ticker: &str, name: &str) -> StockSnapshot {
        StockSnapshot {
            ticker: ticker.to_string(),
            name: name.to_string(),
            sector_kr: "기술".to_string(),
            close: 123.45,
            change_pct: 2.5,
            volume: 3_400_000.0,
            avg_volume: 1_000_000.0,
            vol_ratio: 3.4,
        }
    }

    fn empty_data<'a>(updated_at: &'a str, indices: &'a [IndexQuote]) -> DashboardData<'a> {
        DashboardData {
            updated_at,
            indices,
            cards: &[],
            gainers: &[],
            unusual_volume: &[],
            new_highs: &[],
            etf_gainers: &[],
            etf_losers: &[],
            etf_active: &[],
        }
    }

    #[test]
    fn empty_sections_render_placeholders() {
        let html = render_dashboard(&empty_data("2026.01.02 07:30 KST", &[]));
        assert!(html.contains(EMPTY_MSG));
        assert!(html.contains(EMPTY_MSG_HIGHS));
        assert!(html.contains("2026.01.02 07:30 KST"));
    }

    #[test]
    fn failed_index_renders_na() {
        let indices = [IndexQuote {
            spec: IndexSpec {
                symbol: "^GSPC",
                label: "S&P 500",
                style: IndexStyle::Points,
                invert_color: false,
            },
            value: None,
            change_pct: None,
        }];
        let html = render_dashboard(&empty_data("now", &indices));
        assert!(html.contains("S&P 500"));
        assert!(html.contains("N/A"));
    }

    #[test]
    fn stock_rows_carry_ticker_and_click_handler() {
        let gainers = [stock("AAPL", "애플")];
        let mut data = empty_data("now", &[]);
        data.gainers = &gainers;

        let html = render_dashboard(&data);
        assert!(html.contains(r#"data-ticker="AAPL""#));
        assert!(html.contains("selectTicker('AAPL', '애플')"));
        assert!(html.contains("$123.45"));
        assert!(html.contains("+2.50%"));
    }

    #[test]
    fn volume_ratio_badge_style_switches_at_extreme() {
        let mut hot = stock("HOT", "핫");
        hot.vol_ratio = 5.2;
        let rows = [stock("WARM", "웜"), hot];
        let mut data = empty_data("now", &[]);
        data.unusual_volume = &rows;

        let html = render_dashboard(&data);
        assert!(html.contains("volume-high"));
        assert!(html.contains("volume-extreme"));
        assert!(html.contains("5.2배"));
    }

    #[test]
    fn new_high_rows_show_prev_high_and_beat() {
        let events = [NewHighEvent {
            snapshot: stock("NVDA", "엔비디아"),
            prev_high: 125.0,
            beat_pct: -1.24,
        }];
        let mut data = empty_data("now", &[]);
        data.new_highs = &events;

        let html = render_dashboard(&data);
        assert!(html.contains("$125.00"));
        assert!(html.contains("-1.24%"));
    }

    #[test]
    fn quoted_names_are_escaped_for_onclick() {
        let mut s = stock("BRK'B", "버크셔's");
        s.name = "버크셔's".to_string();
        let gainers = [s];
        let mut data = empty_data("now", &[]);
        data.gainers = &gainers;

        let html = render_dashboard(&data);
        assert!(html.contains(r"버크셔\'s"));
    }

    #[test]
    fn page_embeds_chart_and_resize_protocol() {
        let html = render_dashboard(&empty_data("now", &[]));
        assert!(html.contains("tradingview_chart"));
        assert!(html.contains("postMessage"));
        assert!(html.contains(r#"type:'clipboard'"#));
        assert!(html.contains("<html lang=\"ko\">"));
    }
}
