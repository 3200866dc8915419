pub mod error;
pub mod http;

#[cfg(test)]
pub(crate) mod fake;

use crate::cache::ResponseCache;
use crate::config::Settings;
use crate::domain::agency::AgencyAnalysisResponse;
use crate::domain::prediction::{
    CompetitorSearchResponse, ContractSizeSearchResponse, PlanIdRequest, TimingModelRequest,
    TimingModelResponse, TimingSearchResponse,
};
use crate::domain::procurement::{AwardRecord, Page, ProcurementRecord};
use crate::domain::status::HealthStatus;
use crate::search::{AwardSearchRequest, FilterKind, ProcurementSearchRequest};
use error::ApiError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

pub const TAG_PLAN_ID: &str = "plan-id";
pub const TAG_CONTRACT_SIZE: &str = "contract-size";
pub const TAG_COMPETITOR: &str = "competitor";
pub const TAG_AGENCY_ANALYSIS: &str = "agency-analysis";

pub fn cache_key(tag: &str, identifier: &str) -> String {
    format!("{tag}-{identifier}")
}

/// Raw JSON exchange with the prediction backend. Paths are passed as unencoded segments.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    fn base_url(&self) -> &str;

    async fn get(&self, path: &[&str], query: &[(&str, String)]) -> Result<Value, ApiError>;

    async fn post(&self, path: &[&str], body: &Value) -> Result<Value, ApiError>;
}

#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    cache: Arc<ResponseCache>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.transport.base_url())
            .field("cached_entries", &self.cache.len())
            .finish()
    }
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, cache: Arc<ResponseCache>) -> Self {
        Self { transport, cache }
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let transport = http::HttpTransport::from_settings(settings)?;
        Ok(Self::new(Arc::new(transport), Arc::new(ResponseCache::new())))
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        let raw = self.transport.get(&["health"], &[]).await?;
        decode("health", raw)
    }

    pub async fn search_procurement(
        &self,
        req: &ProcurementSearchRequest,
    ) -> Result<Page<ProcurementRecord>, ApiError> {
        let body = encode(req)?;
        let raw = self
            .transport
            .post(&["api", "v1", "procurement", "search"], &body)
            .await?;
        decode("procurement search", raw)
    }

    pub async fn search_awards(
        &self,
        req: &AwardSearchRequest,
    ) -> Result<Page<AwardRecord>, ApiError> {
        let body = encode(req)?;
        let raw = self
            .transport
            .post(&["api", "v1", "awards", "search"], &body)
            .await?;
        decode("awards search", raw)
    }

    /// Option list for one filter dropdown, scoped to the given fiscal years.
    pub async fn filter_options(
        &self,
        kind: FilterKind,
        fiscal_years: &[String],
    ) -> Result<Vec<String>, ApiError> {
        let query: Vec<(&str, String)> = fiscal_years
            .iter()
            .map(|y| ("fiscal_years", y.clone()))
            .collect();
        let raw = self
            .transport
            .get(&["api", "v1", "procurement", kind.path_segment()], &query)
            .await?;

        let list = raw
            .get(kind.response_key())
            .cloned()
            .unwrap_or(Value::Array(Vec::new()));
        decode(kind.response_key(), list)
    }

    pub async fn timing_by_plan_id(&self, plan_id: &str) -> Result<TimingSearchResponse, ApiError> {
        let plan_id = require_plan_id(plan_id)?;
        self.cached(cache_key(TAG_PLAN_ID, plan_id), "plan id search", async {
            let body = encode(&PlanIdRequest { plan_id })?;
            self.transport
                .post(&["api", "v1", "procurement", "search-by-plan-id"], &body)
                .await
        })
        .await
    }

    pub async fn contract_size_by_plan_id(
        &self,
        plan_id: &str,
    ) -> Result<ContractSizeSearchResponse, ApiError> {
        let plan_id = require_plan_id(plan_id)?;
        self.cached(cache_key(TAG_CONTRACT_SIZE, plan_id), "contract size", async {
            let body = encode(&PlanIdRequest { plan_id })?;
            self.transport
                .post(&["api", "v1", "contract-size", "search-by-plan-id"], &body)
                .await
        })
        .await
    }

    pub async fn competitors_by_plan_id(
        &self,
        plan_id: &str,
    ) -> Result<CompetitorSearchResponse, ApiError> {
        let plan_id = require_plan_id(plan_id)?;
        self.cached(cache_key(TAG_COMPETITOR, plan_id), "competitor analysis", async {
            let body = encode(&PlanIdRequest { plan_id })?;
            self.transport
                .post(
                    &["api", "v1", "competitor-analysis", "search-by-plan-id"],
                    &body,
                )
                .await
        })
        .await
    }

    pub async fn agency_analysis(&self, agency: &str) -> Result<AgencyAnalysisResponse, ApiError> {
        let agency = agency.trim();
        if agency.is_empty() {
            return Err(ApiError::InvalidRequest("agency name must be non-empty".into()));
        }
        self.cached(cache_key(TAG_AGENCY_ANALYSIS, agency), "agency analysis", async {
            self.transport
                .get(&["api", "v1", "agency-analysis", agency], &[])
                .await
        })
        .await
    }

    /// Direct timing model call. Inputs have no natural key, so this is never cached.
    pub async fn predict_timing(
        &self,
        req: &TimingModelRequest,
    ) -> Result<TimingModelResponse, ApiError> {
        let body = encode(req)?;
        let raw = self
            .transport
            .post(&["api", "v1", "model", "predict"], &body)
            .await?;
        decode("model predict", raw)
    }

    async fn cached<T, F>(&self, key: String, endpoint: &str, fetch: F) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        F: Future<Output = Result<Value, ApiError>>,
    {
        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!(cache_key = %key, "cache hit");
            return decode(endpoint, hit);
        }

        let raw = fetch.await?;
        let parsed = decode(endpoint, raw.clone())?;
        self.cache.set(key, raw);
        Ok(parsed)
    }
}

fn require_plan_id(plan_id: &str) -> Result<&str, ApiError> {
    let plan_id = plan_id.trim();
    if plan_id.is_empty() {
        return Err(ApiError::InvalidRequest("plan id must be non-empty".into()));
    }
    Ok(plan_id)
}

fn encode<T: serde::Serialize>(body: &T) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::InvalidRequest(e.to_string()))
}

fn decode<T: DeserializeOwned>(endpoint: &str, raw: Value) -> Result<T, ApiError> {
    serde_json::from_value(raw).map_err(|e| ApiError::Decode {
        endpoint: endpoint.to_string(),
        detail: e.to_string(),
    })
}
