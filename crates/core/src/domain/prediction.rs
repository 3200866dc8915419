use crate::domain::nullable;
use crate::domain::procurement::ProcurementRecord;
use crate::format::parse_date_prefix;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct PlanIdRequest<'a> {
    pub plan_id: &'a str,
}

/// `POST /api/v1/procurement/search-by-plan-id`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimingSearchResponse {
    #[serde(default, deserialize_with = "nullable")]
    pub plan_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub found: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub records: Vec<ProcurementRecord>,
    #[serde(default, deserialize_with = "nullable")]
    pub predictions: Vec<TimingPrediction>,
    #[serde(default, deserialize_with = "nullable")]
    pub procurement_date_predictions: Vec<DatePrediction>,
    #[serde(default, deserialize_with = "nullable")]
    pub total_records: u64,
    #[serde(default, deserialize_with = "nullable")]
    pub search_message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimingPrediction {
    #[serde(default)]
    pub predicted_month: Option<u32>,
    #[serde(default, deserialize_with = "nullable")]
    pub predicted_month_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub confidence: String,
    #[serde(default)]
    pub input_data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatePrediction {
    #[serde(default)]
    pub predicted_date: Option<String>,
}

impl TimingSearchResponse {
    /// First usable predicted date. Accepts plain dates and RFC 3339 timestamps.
    pub fn predicted_date(&self) -> Option<NaiveDate> {
        self.procurement_date_predictions
            .iter()
            .filter_map(|p| p.predicted_date.as_deref())
            .find_map(parse_date_prefix)
    }
}

/// `POST /api/v1/contract-size/search-by-plan-id`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractSizeSearchResponse {
    #[serde(default, deserialize_with = "nullable")]
    pub plan_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub found: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub records: Vec<ProcurementRecord>,
    #[serde(default, deserialize_with = "nullable")]
    pub contract_size_predictions: Vec<ContractSizePrediction>,
    #[serde(default, deserialize_with = "nullable")]
    pub total_records: u64,
    #[serde(default, deserialize_with = "nullable")]
    pub search_message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractSizePrediction {
    #[serde(default)]
    pub predicted_contract_size: Option<f64>,
    #[serde(default, deserialize_with = "nullable")]
    pub predicted_contract_size_formatted: String,
    #[serde(default)]
    pub confidence_lower: Option<f64>,
    #[serde(default)]
    pub confidence_upper: Option<f64>,
    #[serde(default, deserialize_with = "nullable")]
    pub key_factors: Vec<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `POST /api/v1/competitor-analysis/search-by-plan-id`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompetitorSearchResponse {
    #[serde(default, deserialize_with = "nullable")]
    pub plan_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub found: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub records: Vec<ProcurementRecord>,
    #[serde(default, deserialize_with = "nullable")]
    pub vendor_predictions: Vec<VendorPrediction>,
    #[serde(default, deserialize_with = "nullable")]
    pub total_records: u64,
    #[serde(default, deserialize_with = "nullable")]
    pub search_message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VendorPrediction {
    #[serde(default)]
    pub prime_vendor_predicted: Option<f64>,
    #[serde(default)]
    pub mwbe_vendor_predicted: Option<f64>,
    #[serde(default)]
    pub prime_vendor_probability: Option<f64>,
    #[serde(default)]
    pub mwbe_vendor_probability: Option<f64>,
    #[serde(default, deserialize_with = "nullable")]
    pub prime_vendor_recommendations: Vec<VendorRecommendation>,
    #[serde(default, deserialize_with = "nullable")]
    pub mwbe_vendor_recommendations: Vec<VendorRecommendation>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VendorRecommendation {
    #[serde(default, deserialize_with = "nullable")]
    pub vendor: String,
    #[serde(default, deserialize_with = "nullable")]
    pub probability: f64,
    #[serde(default)]
    pub most_recent_contract: Option<ContractSummary>,
    #[serde(default)]
    pub most_relevant_contract: Option<ContractSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractSummary {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub agency: Option<String>,
    #[serde(default, alias = "amount")]
    pub value: Option<f64>,
    #[serde(default, alias = "start_date")]
    pub date: Option<String>,
}

/// `POST /api/v1/model/predict`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimingModelRequest {
    pub agency: String,
    pub fiscal_quarter: String,
    pub procurement_method: String,
    pub start_date: String,
    pub end_date: String,
    pub headcount: u32,
    pub services_description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimingModelResponse {
    #[serde(default)]
    pub predicted_month: Option<u32>,
    #[serde(default, deserialize_with = "nullable")]
    pub predicted_month_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub confidence: String,
    #[serde(default)]
    pub input_data: Option<TimingModelRequest>,
}
