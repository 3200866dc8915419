//! Plain-text rendering of shaped results for terminal output.

use procurement_core::analysis::{AccuracyStat, PlanAnalysis};
use procurement_core::chart::DistributionChart;
use procurement_core::domain::agency::AgencyAnalysisResponse;
use procurement_core::domain::prediction::TimingModelResponse;
use procurement_core::domain::procurement::Page;
use procurement_core::domain::status::{HealthStatus, ScrapeOutcome};
use procurement_core::format::{self, display_or_na};
use procurement_core::search::{DualSearchResult, FilterOptions};
use procurement_core::vendors::CompetitorRow;
use procurement_core::view::Panel;

fn finish(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Notes a panel that has nothing to show; ready panels are rendered by the caller.
fn panel_note<T>(title: &str, panel: &Panel<T>, lines: &mut Vec<String>) {
    match panel {
        Panel::Ready(_) => {}
        Panel::NotFound { message } => lines.push(format!("{title}: {message}")),
        Panel::Failed { message } => lines.push(format!("{title}: error: {message}")),
    }
}

pub fn health(h: &HealthStatus) -> String {
    finish(vec![format!(
        "{} {}",
        display_or_na(&h.status),
        h.message.trim()
    )])
}

fn page_summary<T>(title: &str, page: &Page<T>) -> String {
    match page.showing_range() {
        Some((a, b)) => format!(
            "{title}: showing results {a} to {b} of {} (page {} of {})",
            page.total_count, page.page, page.total_pages
        ),
        None => format!("{title}: no results"),
    }
}

pub fn search(result: &DualSearchResult) -> String {
    let mut lines = Vec::new();

    panel_note("Procurement plans", &result.plans, &mut lines);
    if let Some(page) = result.plans.ready() {
        lines.push(page_summary("Procurement plans", page));
        for r in &page.records {
            lines.push(format!(
                "  {:<14} {:<8} FY{} Q{}  {}",
                display_or_na(&r.plan_id),
                display_or_na(&r.agency),
                display_or_na(&r.fiscal_year),
                display_or_na(&r.fiscal_quarter),
                display_or_na(&r.services_description),
            ));
        }
    }

    panel_note("Awards", &result.awards, &mut lines);
    if let Some(page) = result.awards.ready() {
        lines.push(page_summary("Awards", page));
        for r in &page.records {
            lines.push(format!(
                "  {:<12} {:<16} {}  {}",
                display_or_na(&r.award_date),
                r.award_status.as_str(),
                display_or_na(&r.agency),
                display_or_na(&r.title),
            ));
        }
    }

    finish(lines)
}

fn chart_lines(chart: &DistributionChart, lines: &mut Vec<String>) {
    match chart {
        DistributionChart::Placeholder { message } => lines.push(format!("  {message}")),
        DistributionChart::Chart(d) => {
            let axis: Vec<String> = d
                .labels
                .iter()
                .map(|l| format!("{:+}σ {}", l.sigma, l.text))
                .collect();
            lines.push(format!("  mean {}  σ {}", d.mean_label, d.sigma_label));
            lines.push(format!("  {}", axis.join(" | ")));
        }
    }
}

fn accuracy_line(stats: &[AccuracyStat]) -> String {
    let parts: Vec<String> = stats
        .iter()
        .map(|s| format!("{} {}", s.label, s.value))
        .collect();
    format!("  model: {}", parts.join(", "))
}

fn competitor_lines(title: &str, rows: &[CompetitorRow], lines: &mut Vec<String>) {
    lines.push(format!("  {title}:"));
    if rows.is_empty() {
        lines.push("    no recommendations".to_string());
    }
    for r in rows {
        lines.push(format!(
            "    {:>4}  {:<40} {:>8}  {}",
            r.win_probability, r.vendor, r.total_contracts_value, r.most_recent_contract_date
        ));
    }
}

pub fn plan(a: &PlanAnalysis) -> String {
    let o = &a.overview;
    let mut lines = vec![
        format!("Plan {}", o.plan_id),
        format!("  {}", o.services_description),
        format!(
            "  agency {}  method {}  FY{} Q{}",
            o.agency, o.procurement_method, o.fiscal_year, o.fiscal_quarter
        ),
    ];

    panel_note("Timing", &a.timing, &mut lines);
    if let Some(t) = a.timing.ready() {
        lines.push(format!(
            "Timing: {} (confidence {})",
            t.predicted_month, t.confidence
        ));
        chart_lines(&t.chart, &mut lines);
        lines.push(accuracy_line(&t.accuracy));
    }

    panel_note("Contract size", &a.size, &mut lines);
    if let Some(s) = a.size.ready() {
        lines.push(format!("Contract size: {}", s.headline));
        if let Some((lo, hi)) = &s.confidence_range {
            lines.push(format!("  range {lo} to {hi}"));
        }
        chart_lines(&s.chart, &mut lines);
        lines.push(accuracy_line(&s.accuracy));
    }

    panel_note("Competitors", &a.competitors, &mut lines);
    if let Some(c) = a.competitors.ready() {
        lines.push("Competitors:".to_string());
        if let Some(err) = &c.error {
            lines.push(format!("  {err}"));
        }
        competitor_lines("prime", &c.prime_rows, &mut lines);
        competitor_lines("MWBE", &c.mwbe_rows, &mut lines);
    }

    finish(lines)
}

pub fn agency(r: &AgencyAnalysisResponse) -> String {
    match r {
        AgencyAnalysisResponse::Error(e) => {
            finish(vec![format!("{}: {}", display_or_na(&e.agency), e.error)])
        }
        AgencyAnalysisResponse::Report(report) => {
            let mut lines = vec![format!(
                "{}: {} across {} procurements (avg {})",
                display_or_na(&report.agency),
                format::millions_headline(report.total_budget),
                report.total_count,
                format::currency_compact(report.avg_contract_size),
            )];
            for c in &report.categories {
                lines.push(format!(
                    "  {:>5.1}%  {:<40} {}",
                    c.budget_percentage,
                    c.category_name,
                    format::millions_headline(c.total_budget)
                ));
                for s in &c.subcategories {
                    lines.push(format!(
                        "          {:>5.1}%  {} ({} contracts)",
                        s.budget_percentage, s.subcategory_name, s.count
                    ));
                }
            }
            finish(lines)
        }
    }
}

pub fn filters(o: &FilterOptions) -> String {
    let list = |name: &str, items: &[String]| {
        if items.is_empty() {
            format!("{name}: (none)")
        } else {
            format!("{name}: {}", items.join(", "))
        }
    };
    finish(vec![
        list("agencies", &o.agencies),
        list("procurement methods", &o.procurement_methods),
        list("fiscal quarters", &o.fiscal_quarters),
        list("job titles", &o.job_titles),
    ])
}

pub fn scrape(o: &ScrapeOutcome) -> String {
    finish(vec![format!("[{}] {}", o.status, o.message)])
}

pub fn prediction(p: &TimingModelResponse) -> String {
    finish(vec![format!(
        "Predicted month: {} (confidence {})",
        display_or_na(&p.predicted_month_name),
        display_or_na(&p.confidence)
    )])
}
