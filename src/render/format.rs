use crate::config::IndexStyle;

/// `$1,234.56`. Non-finite values render as N/A.
pub fn fmt_price(p: f64) -> String {
    if !p.is_finite() {
        return "N/A".to_string();
    }
    format!("${}", group_thousands(p, 2))
}

/// Signed percentage with two decimals: `+1.23%`.
pub fn fmt_pct(p: f64) -> String {
    if !p.is_finite() {
        return "N/A".to_string();
    }
    format!("{p:+.2}%")
}

pub fn fmt_pct_opt(p: Option<f64>) -> String {
    match p {
        Some(v) => fmt_pct(v),
        None => "N/A".to_string(),
    }
}

/// Magnitude-suffixed volume: `1.2B`, `3.4M`, `5.6K`, `789`.
pub fn fmt_number(n: f64) -> String {
    if !n.is_finite() {
        return "N/A".to_string();
    }
    let abs = n.abs();
    if abs >= 1_000_000_000.0 {
        format!("{:.1}B", n / 1_000_000_000.0)
    } else if abs >= 1_000_000.0 {
        format!("{:.1}M", n / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{:.1}K", n / 1_000.0)
    } else {
        format!("{n:.0}")
    }
}

/// Index bar value, styled per index: VIX plain, US 10Y as a yield, the rest
/// comma-grouped.
pub fn fmt_index_value(value: Option<f64>, style: IndexStyle) -> String {
    let Some(v) = value else {
        return "N/A".to_string();
    };
    match style {
        IndexStyle::Plain => format!("{v:.2}"),
        IndexStyle::Yield => format!("{v:.3}%"),
        IndexStyle::Points => group_thousands(v, 2),
    }
}

/// Comma-grouped fixed-point rendering: `1234567.891` → `1,234,567.89`.
pub fn group_thousands(v: f64, decimals: usize) -> String {
    let s = format!("{:.*}", decimals, v.abs());
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if v < 0.0 { "-" } else { "" };
    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
