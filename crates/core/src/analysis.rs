//! Plan analysis: the timing, contract size and competitor lookups for one plan id,
//! issued together and settled independently into per-panel states.

use crate::chart::{self, DistributionChart};
use crate::client::error::ApiError;
use crate::client::ApiClient;
use crate::domain::prediction::{
    CompetitorSearchResponse, ContractSizeSearchResponse, TimingSearchResponse,
};
use crate::domain::procurement::ProcurementRecord;
use crate::format;
use crate::vendors::{CompetitorRankings, HistoryMode};
use crate::view::Panel;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccuracyStat {
    pub label: &'static str,
    pub value: &'static str,
}

pub const TIMING_ACCURACY: [AccuracyStat; 3] = [
    AccuracyStat {
        label: "R-squared",
        value: "97.63%",
    },
    AccuracyStat {
        label: "Mean Absolute Error",
        value: "0.30 days",
    },
    AccuracyStat {
        label: "Prediction Std Dev",
        value: "1.89 days",
    },
];

pub const SIZE_ACCURACY: [AccuracyStat; 3] = [
    AccuracyStat {
        label: "R-squared",
        value: "91.19%",
    },
    AccuracyStat {
        label: "Mean Absolute Error",
        value: "$16.3K",
    },
    AccuracyStat {
        label: "Root Mean Squared Error",
        value: "$20.6K",
    },
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanOverview {
    pub plan_id: String,
    pub services_description: String,
    pub agency: String,
    pub procurement_method: String,
    pub fiscal_quarter: String,
    pub fiscal_year: String,
}

impl PlanOverview {
    pub fn from_record(plan_id: &str, record: Option<&ProcurementRecord>) -> Self {
        let field = |f: fn(&ProcurementRecord) -> &str| {
            format::display_or_na(record.map(f).unwrap_or_default())
        };
        let plan_id = match record.map(|r| r.plan_id.trim()) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => format::display_or_na(plan_id),
        };
        Self {
            plan_id,
            services_description: field(|r| r.services_description.as_str()),
            agency: field(|r| r.agency.as_str()),
            procurement_method: field(|r| r.procurement_method.as_str()),
            fiscal_quarter: field(|r| r.fiscal_quarter.as_str()),
            fiscal_year: field(|r| r.fiscal_year.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimingPanel {
    pub predicted_month: String,
    pub confidence: String,
    pub predicted_date: Option<NaiveDate>,
    pub chart: DistributionChart,
    pub accuracy: [AccuracyStat; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizePanel {
    pub predicted_value: Option<f64>,
    pub headline: String,
    pub confidence_range: Option<(String, String)>,
    pub key_factors: Vec<String>,
    pub chart: DistributionChart,
    pub accuracy: [AccuracyStat; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanAnalysis {
    pub plan_id: String,
    pub overview: PlanOverview,
    pub timing: Panel<TimingPanel>,
    pub size: Panel<SizePanel>,
    pub competitors: Panel<CompetitorRankings>,
}

pub async fn analyze_plan(
    client: &ApiClient,
    plan_id: &str,
    history: HistoryMode,
) -> Result<PlanAnalysis, ApiError> {
    let plan_id = plan_id.trim();
    if plan_id.is_empty() {
        return Err(ApiError::InvalidRequest("plan id must be non-empty".into()));
    }

    let (timing, size, competitors) = tokio::join!(
        client.timing_by_plan_id(plan_id),
        client.contract_size_by_plan_id(plan_id),
        client.competitors_by_plan_id(plan_id),
    );

    for (panel, res) in [
        ("timing", timing.as_ref().err()),
        ("contract_size", size.as_ref().err()),
        ("competitors", competitors.as_ref().err()),
    ] {
        if let Some(err) = res {
            tracing::warn!(%plan_id, panel, error = %err, "plan lookup failed");
        }
    }

    let first_record = [
        timing.as_ref().ok().and_then(|r| r.records.first()),
        size.as_ref().ok().and_then(|r| r.records.first()),
        competitors.as_ref().ok().and_then(|r| r.records.first()),
    ]
    .into_iter()
    .flatten()
    .next();
    let overview = PlanOverview::from_record(plan_id, first_record);

    Ok(PlanAnalysis {
        plan_id: plan_id.to_string(),
        overview,
        timing: settle(timing, |r| timing_panel(plan_id, r)),
        size: settle(size, |r| size_panel(plan_id, r)),
        competitors: settle(competitors, |r| competitor_panel(plan_id, r, history)),
    })
}

fn settle<R, T>(res: Result<R, ApiError>, shape: impl FnOnce(&R) -> Panel<T>) -> Panel<T> {
    match res {
        Ok(r) => shape(&r),
        Err(err) => Panel::failed(&err),
    }
}

fn not_found<T>(plan_id: &str, search_message: &str) -> Panel<T> {
    let message = if search_message.trim().is_empty() {
        format!("No procurement plan found for {plan_id}")
    } else {
        search_message.trim().to_string()
    };
    Panel::NotFound { message }
}

fn timing_panel(plan_id: &str, res: &TimingSearchResponse) -> Panel<TimingPanel> {
    let predicted_date = res.predicted_date();
    if !res.found || (res.predictions.is_empty() && predicted_date.is_none()) {
        return not_found(plan_id, &res.search_message);
    }

    let first = res.predictions.first();
    Panel::Ready(TimingPanel {
        predicted_month: format::display_or_na(
            first.map(|p| p.predicted_month_name.as_str()).unwrap_or_default(),
        ),
        confidence: format::display_or_na(
            first.map(|p| p.confidence.as_str()).unwrap_or_default(),
        ),
        predicted_date,
        chart: chart::timing_distribution(predicted_date),
        accuracy: TIMING_ACCURACY,
    })
}

fn size_panel(plan_id: &str, res: &ContractSizeSearchResponse) -> Panel<SizePanel> {
    let Some(prediction) = res.contract_size_predictions.first().filter(|_| res.found) else {
        return not_found(plan_id, &res.search_message);
    };

    let value = prediction
        .predicted_contract_size
        .filter(|v| v.is_finite() && *v > 0.0);
    if value.is_none() {
        if let Some(err) = &prediction.error {
            tracing::debug!(%plan_id, error = %err, "size model returned no value");
        }
    }

    Panel::Ready(SizePanel {
        predicted_value: value,
        headline: value
            .map(format::millions_headline)
            .unwrap_or_else(|| format::NOT_AVAILABLE.to_string()),
        confidence_range: prediction
            .confidence_lower
            .zip(prediction.confidence_upper)
            .map(|(lo, hi)| (format::currency_compact(lo), format::currency_compact(hi))),
        key_factors: prediction.key_factors.clone(),
        chart: chart::size_distribution(value),
        accuracy: SIZE_ACCURACY,
    })
}

fn competitor_panel(
    plan_id: &str,
    res: &CompetitorSearchResponse,
    history: HistoryMode,
) -> Panel<CompetitorRankings> {
    match res.vendor_predictions.first().filter(|_| res.found) {
        Some(prediction) => Panel::Ready(CompetitorRankings::from_prediction(prediction, history)),
        None => not_found(plan_id, &res.search_message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ResponseCache;
    use crate::client::fake::FakeTransport;
    use crate::vendors::VendorRanking;
    use serde_json::json;
    use std::sync::Arc;

    const TIMING: &str = "/api/v1/procurement/search-by-plan-id";
    const SIZE: &str = "/api/v1/contract-size/search-by-plan-id";
    const COMPETITOR: &str = "/api/v1/competitor-analysis/search-by-plan-id";

    fn record() -> serde_json::Value {
        json!({
            "ID": 12,
            "PlanID": "FY25RNDCLA1",
            "Agency": "DOB",
            "Services_Description": "Elevator inspection services",
            "Procurement_Method": "Competitive Sealed Proposal",
            "Fiscal_Quarter": "3",
            "Fiscal_Year": "2025"
        })
    }

    fn backend() -> Arc<FakeTransport> {
        let fake = Arc::new(FakeTransport::new());
        fake.respond(
            TIMING,
            Ok(json!({
                "plan_id": "FY25RNDCLA1",
                "found": true,
                "records": [record()],
                "predictions": [{"predicted_month": 3, "predicted_month_name": "March", "confidence": "high"}],
                "procurement_date_predictions": [{"predicted_date": "2026-03-15"}],
                "total_records": 1,
                "search_message": "Found 1 record"
            })),
        );
        fake.respond(
            SIZE,
            Ok(json!({
                "plan_id": "FY25RNDCLA1",
                "found": true,
                "records": [record()],
                "contract_size_predictions": [{
                    "predicted_contract_size": 1250000.0,
                    "confidence_lower": 900000.0,
                    "confidence_upper": 1600000.0,
                    "key_factors": ["agency", "method"]
                }],
                "total_records": 1
            })),
        );
        fake.respond(
            COMPETITOR,
            Ok(json!({
                "plan_id": "FY25RNDCLA1",
                "found": true,
                "vendor_predictions": [{
                    "prime_vendor_recommendations": [
                        {"vendor": "B Corp", "probability": 0.2},
                        {"vendor": "A Corp", "probability": 0.8}
                    ],
                    "mwbe_vendor_recommendations": []
                }]
            })),
        );
        fake
    }

    fn client(fake: &Arc<FakeTransport>) -> ApiClient {
        ApiClient::new(fake.clone(), Arc::new(ResponseCache::new()))
    }

    #[tokio::test]
    async fn all_three_panels_ready() {
        let fake = backend();
        let analysis = analyze_plan(&client(&fake), "FY25RNDCLA1", HistoryMode::Reported)
            .await
            .unwrap();

        assert_eq!(analysis.overview.agency, "DOB");
        assert_eq!(analysis.overview.services_description, "Elevator inspection services");

        let timing = analysis.timing.ready().unwrap();
        assert_eq!(timing.predicted_month, "March");
        assert_eq!(timing.chart.chart().unwrap().mean_label, "Mar 2026");

        let size = analysis.size.ready().unwrap();
        assert_eq!(size.headline, "$1.25M");
        assert_eq!(
            size.confidence_range,
            Some(("$900K".to_string(), "$1.6M".to_string()))
        );

        let competitors = analysis.competitors.ready().unwrap();
        assert_eq!(competitors.prime.vendors()[0].vendor, "A Corp");
        assert_eq!(competitors.prime.vendors()[0].percent, 80);
        assert_eq!(competitors.mwbe, VendorRanking::NoRecommendations);
    }

    #[tokio::test]
    async fn failing_competitor_lookup_leaves_other_panels_ready() {
        let fake = backend();
        fake.respond(
            COMPETITOR,
            Err(ApiError::Http {
                status: 500,
                message: "HTTP error 500".into(),
            }),
        );

        let analysis = analyze_plan(&client(&fake), "FY25RNDCLA1", HistoryMode::Reported)
            .await
            .unwrap();

        assert!(analysis.timing.ready().is_some());
        assert!(analysis.size.ready().is_some());
        assert_eq!(
            analysis.competitors,
            Panel::Failed {
                message: "HTTP error 500".into()
            }
        );
        assert_eq!(fake.calls(TIMING), 1);
        assert_eq!(fake.calls(SIZE), 1);
        assert_eq!(fake.calls(COMPETITOR), 1);
    }

    #[tokio::test]
    async fn unknown_plan_is_not_found_not_failed() {
        let fake = Arc::new(FakeTransport::new());
        for path in [TIMING, SIZE, COMPETITOR] {
            fake.respond(
                path,
                Ok(json!({"plan_id": "FY99NOPE", "found": false, "search_message": "No records found"})),
            );
        }

        let analysis = analyze_plan(&client(&fake), "FY99NOPE", HistoryMode::Reported)
            .await
            .unwrap();

        assert_eq!(
            analysis.size,
            Panel::NotFound {
                message: "No records found".into()
            }
        );
        assert!(matches!(analysis.timing, Panel::NotFound { .. }));
        assert!(matches!(analysis.competitors, Panel::NotFound { .. }));
        assert_eq!(analysis.overview.plan_id, "FY99NOPE");
        assert_eq!(analysis.overview.agency, "N/A");
    }

    #[tokio::test]
    async fn size_without_value_shows_placeholder_chart() {
        let fake = backend();
        fake.respond(
            SIZE,
            Ok(json!({
                "found": true,
                "contract_size_predictions": [{"predicted_contract_size": null, "error": "insufficient data"}]
            })),
        );

        let analysis = analyze_plan(&client(&fake), "FY25RNDCLA1", HistoryMode::Reported)
            .await
            .unwrap();
        let size = analysis.size.ready().unwrap();
        assert_eq!(size.headline, "N/A");
        assert!(matches!(size.chart, DistributionChart::Placeholder { .. }));
    }

    #[tokio::test]
    async fn blank_plan_id_is_rejected_up_front() {
        let fake = backend();
        let err = analyze_plan(&client(&fake), "  ", HistoryMode::Reported)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
        assert_eq!(fake.total_calls(), 0);
    }
}
