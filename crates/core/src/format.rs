use chrono::NaiveDate;

pub const NOT_AVAILABLE: &str = "N/A";

pub fn display_or_na(s: &str) -> String {
    let t = s.trim();
    if t.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        t.to_string()
    }
}

/// Axis-style currency: `$1.3M`, `$450K`, `$900`. The unit is chosen after rounding,
/// so 999,600 reads `$1.0M` rather than `$1000K`.
pub fn currency_compact(amount: f64) -> String {
    let thousands = (amount / 1_000.0).round();
    if thousands >= 1_000.0 {
        let m = (amount / 1_000_000.0 * 10.0).round() / 10.0;
        format!("${m:.1}M")
    } else if amount.round() >= 1_000.0 {
        format!("${thousands:.0}K")
    } else {
        format!("${:.0}", amount.round())
    }
}

/// Headline contract value in millions with up to two decimals, never fewer than one:
/// 1,250,000 → `$1.25M`, 1,500,000 → `$1.5M`, 2,000,000 → `$2.0M`.
pub fn millions_headline(amount: f64) -> String {
    let mut s = format!("{:.2}", amount / 1_000_000.0);
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.push('0');
    }
    format!("${s}M")
}

/// Short month label used on timing chart axes: `Mar 2025`.
pub fn month_year(date: NaiveDate) -> String {
    date.format("%b %Y").to_string()
}

/// Contract dates arrive as ISO dates or timestamps; shown as `March 2025`.
/// Anything unparseable is shown as sent.
pub fn contract_date(raw: &str) -> String {
    match parse_date_prefix(raw) {
        Some(d) => d.format("%B %Y").to_string(),
        None => display_or_na(raw),
    }
}

/// Parses `YYYY-MM-DD`, ignoring any time portion after it.
pub fn parse_date_prefix(s: &str) -> Option<NaiveDate> {
    let t = s.trim();
    let head = t.get(..10).unwrap_or(t);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}
