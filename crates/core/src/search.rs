//! Discovery search over the two record sources: procurement plans and published awards.
//!
//! Both sources share one filter set but paginate independently; moving one result
//! table to another page never refetches or changes the other.

use crate::client::error::ApiError;
use crate::client::ApiClient;
use crate::domain::procurement::{AwardRecord, Page, ProcurementRecord};
use crate::view::Panel;
use serde::{Deserialize, Serialize};

pub const PAGE_SIZE: u32 = 50;

/// Sent as the awards keyword when the user gave neither a keyword nor an agency;
/// the awards endpoint rejects a query with both blank.
pub const AWARDS_WILDCARD: &str = "%";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFilters {
    pub keyword: Option<String>,
    pub agency: Option<String>,
    pub procurement_method: Option<String>,
    pub fiscal_quarter: Option<String>,
    pub job_titles: Option<String>,
    pub fiscal_years: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcurementSearchRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub procurement_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiscal_quarter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_titles: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiscal_years: Option<Vec<String>>,
    pub page: u32,
    pub page_size: u32,
}

impl ProcurementSearchRequest {
    pub fn new(filters: &SearchFilters, page: u32) -> Self {
        let fiscal_years: Vec<String> = filters
            .fiscal_years
            .iter()
            .filter_map(|y| non_blank(Some(y)))
            .collect();

        Self {
            keyword: non_blank(filters.keyword.as_ref()),
            agency: non_blank(filters.agency.as_ref()),
            procurement_method: non_blank(filters.procurement_method.as_ref()),
            fiscal_quarter: non_blank(filters.fiscal_quarter.as_ref()),
            job_titles: non_blank(filters.job_titles.as_ref()),
            fiscal_years: (!fiscal_years.is_empty()).then_some(fiscal_years),
            page: page.max(1),
            page_size: PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AwardSearchRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agency: Option<String>,
    pub page: u32,
    pub page_size: u32,
}

impl AwardSearchRequest {
    pub fn new(filters: &SearchFilters, page: u32) -> Self {
        let mut keyword = non_blank(filters.keyword.as_ref());
        let agency = non_blank(filters.agency.as_ref());
        if keyword.is_none() && agency.is_none() {
            keyword = Some(AWARDS_WILDCARD.to_string());
        }

        Self {
            keyword,
            agency,
            page: page.max(1),
            page_size: PAGE_SIZE,
        }
    }
}

fn non_blank(s: Option<&String>) -> Option<String> {
    s.map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Agencies,
    ProcurementMethods,
    FiscalQuarters,
    JobTitles,
}

impl FilterKind {
    pub fn path_segment(self) -> &'static str {
        match self {
            Self::Agencies => "agencies",
            Self::ProcurementMethods => "procurement-methods",
            Self::FiscalQuarters => "fiscal-quarters",
            Self::JobTitles => "job-titles",
        }
    }

    pub fn response_key(self) -> &'static str {
        match self {
            Self::Agencies => "agencies",
            Self::ProcurementMethods => "procurement_methods",
            Self::FiscalQuarters => "fiscal_quarters",
            Self::JobTitles => "job_titles",
        }
    }
}

/// Dropdown contents for the filter bar. A list that failed to load is left empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub agencies: Vec<String>,
    pub procurement_methods: Vec<String>,
    pub fiscal_quarters: Vec<String>,
    pub job_titles: Vec<String>,
}

pub async fn load_filter_options(client: &ApiClient, fiscal_years: &[String]) -> FilterOptions {
    let (agencies, methods, quarters, titles) = tokio::join!(
        client.filter_options(FilterKind::Agencies, fiscal_years),
        client.filter_options(FilterKind::ProcurementMethods, fiscal_years),
        client.filter_options(FilterKind::FiscalQuarters, fiscal_years),
        client.filter_options(FilterKind::JobTitles, fiscal_years),
    );

    let or_empty = |kind: FilterKind, res: Result<Vec<String>, ApiError>| {
        res.unwrap_or_else(|err| {
            tracing::warn!(filter = kind.response_key(), error = %err, "filter options unavailable");
            Vec::new()
        })
    };

    FilterOptions {
        agencies: or_empty(FilterKind::Agencies, agencies),
        procurement_methods: or_empty(FilterKind::ProcurementMethods, methods),
        fiscal_quarters: or_empty(FilterKind::FiscalQuarters, quarters),
        job_titles: or_empty(FilterKind::JobTitles, titles),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DualSearchResult {
    pub plans: Panel<Page<ProcurementRecord>>,
    pub awards: Panel<Page<AwardRecord>>,
}

/// One logical search: a filter set plus an independent page cursor per source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSession {
    pub filters: SearchFilters,
    pub plan_page: u32,
    pub award_page: u32,
}

impl SearchSession {
    pub fn new(filters: SearchFilters) -> Self {
        Self {
            filters,
            plan_page: 1,
            award_page: 1,
        }
    }

    pub fn set_plan_page(&mut self, page: u32) {
        self.plan_page = page.max(1);
    }

    pub fn set_award_page(&mut self, page: u32) {
        self.award_page = page.max(1);
    }

    pub fn plan_request(&self) -> ProcurementSearchRequest {
        ProcurementSearchRequest::new(&self.filters, self.plan_page)
    }

    pub fn award_request(&self) -> AwardSearchRequest {
        AwardSearchRequest::new(&self.filters, self.award_page)
    }

    pub async fn fetch_plans(&self, client: &ApiClient) -> Panel<Page<ProcurementRecord>> {
        Panel::from_result(client.search_procurement(&self.plan_request()).await)
    }

    pub async fn fetch_awards(&self, client: &ApiClient) -> Panel<Page<AwardRecord>> {
        Panel::from_result(client.search_awards(&self.award_request()).await)
    }

    /// Both sources, concurrently. Either side may fail without affecting the other.
    pub async fn run(&self, client: &ApiClient) -> DualSearchResult {
        let (plans, awards) = tokio::join!(self.fetch_plans(client), self.fetch_awards(client));
        if let Panel::Failed { message } = &plans {
            tracing::warn!(error = %message, "procurement search failed");
        }
        if let Panel::Failed { message } = &awards {
            tracing::warn!(error = %message, "awards search failed");
        }
        DualSearchResult { plans, awards }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ResponseCache;
    use crate::client::fake::FakeTransport;
    use serde_json::json;
    use std::sync::Arc;

    const PLANS: &str = "/api/v1/procurement/search";
    const AWARDS: &str = "/api/v1/awards/search";

    fn client(fake: &Arc<FakeTransport>) -> ApiClient {
        ApiClient::new(fake.clone(), Arc::new(ResponseCache::new()))
    }

    #[test]
    fn awards_request_substitutes_wildcard_when_keyword_and_agency_blank() {
        let filters = SearchFilters {
            keyword: Some("   ".into()),
            agency: None,
            ..Default::default()
        };
        let req = AwardSearchRequest::new(&filters, 1);
        assert_eq!(req.keyword.as_deref(), Some(AWARDS_WILDCARD));
        assert_eq!(req.agency, None);
        assert_eq!(req.page_size, PAGE_SIZE);
    }

    #[test]
    fn awards_request_keeps_agency_only_query() {
        let filters = SearchFilters {
            agency: Some("Education".into()),
            ..Default::default()
        };
        let req = AwardSearchRequest::new(&filters, 3);
        assert_eq!(req.keyword, None);
        assert_eq!(req.agency.as_deref(), Some("Education"));
        assert_eq!(req.page, 3);
    }

    #[test]
    fn plan_request_drops_blank_filters_and_clamps_page() {
        let filters = SearchFilters {
            keyword: Some("fire".into()),
            agency: Some("".into()),
            fiscal_years: vec!["2025".into(), " ".into()],
            ..Default::default()
        };
        let req = ProcurementSearchRequest::new(&filters, 0);
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"keyword": "fire", "fiscal_years": ["2025"], "page": 1, "page_size": 50})
        );
    }

    #[test]
    fn page_cursors_move_independently() {
        let mut session = SearchSession::new(SearchFilters::default());
        session.set_plan_page(4);
        assert_eq!(session.plan_request().page, 4);
        assert_eq!(session.award_request().page, 1);

        session.set_award_page(2);
        assert_eq!(session.plan_request().page, 4);
        assert_eq!(session.award_request().page, 2);
    }

    #[tokio::test]
    async fn dual_search_reports_each_source_separately() {
        let fake = Arc::new(FakeTransport::new());
        fake.respond(
            PLANS,
            Ok(json!({
                "records": [{"ID": 83, "PlanID": "FY25NAC535", "Agency": "ACS"}],
                "total_count": 573, "page": 1, "page_size": 50, "total_pages": 12,
                "has_next": true, "has_previous": false
            })),
        );
        fake.respond(
            AWARDS,
            Err(ApiError::Http {
                status: 422,
                message: "keyword or agency required".into(),
            }),
        );

        let session = SearchSession::new(SearchFilters::default());
        let result = session.run(&client(&fake)).await;

        let plans = result.plans.ready().unwrap();
        assert_eq!(plans.total_pages, 12);
        assert_eq!(plans.records[0].plan_id, "FY25NAC535");
        assert!(result.awards.is_failed());
        assert_eq!(
            fake.last_body(AWARDS),
            Some(json!({"keyword": "%", "page": 1, "page_size": 50}))
        );
    }

    #[tokio::test]
    async fn advancing_plan_page_only_refetches_plans() {
        let fake = Arc::new(FakeTransport::new());
        fake.respond(PLANS, Ok(json!({"records": [], "page": 2})));
        fake.respond(AWARDS, Ok(json!({"records": [], "page": 1})));
        let client = client(&fake);

        let mut session = SearchSession::new(SearchFilters {
            keyword: Some("security".into()),
            ..Default::default()
        });
        session.run(&client).await;
        session.set_plan_page(2);
        session.fetch_plans(&client).await;

        assert_eq!(fake.calls(PLANS), 2);
        assert_eq!(fake.calls(AWARDS), 1);
        assert_eq!(fake.last_body(PLANS).unwrap()["page"], json!(2));
        assert_eq!(fake.last_body(AWARDS).unwrap()["page"], json!(1));
    }

    #[tokio::test]
    async fn filter_options_tolerate_a_failing_list() {
        let fake = Arc::new(FakeTransport::new());
        fake.respond("/api/v1/procurement/agencies", Ok(json!({"agencies": ["ACS"]})));
        fake.respond(
            "/api/v1/procurement/procurement-methods",
            Ok(json!({"procurement_methods": ["Task Order"]})),
        );
        fake.respond(
            "/api/v1/procurement/fiscal-quarters",
            Ok(json!({"fiscal_quarters": ["1", "2"]})),
        );

        let options = load_filter_options(&client(&fake), &["2025".to_string()]).await;
        assert_eq!(options.agencies, vec!["ACS"]);
        assert_eq!(options.procurement_methods, vec!["Task Order"]);
        assert_eq!(options.fiscal_quarters, vec!["1", "2"]);
        assert!(options.job_titles.is_empty());
    }
}
