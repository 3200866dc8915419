use crate::domain::nullable;
use serde::{Deserialize, Serialize};

/// `GET /api/v1/agency-analysis/{agency}`. The backend answers unknown agencies with the
/// same top-level fields plus an `error` string, so the error shape is tried first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgencyAnalysisResponse {
    Error(AgencyAnalysisError),
    Report(AgencyReport),
}

impl AgencyAnalysisResponse {
    pub fn agency(&self) -> &str {
        match self {
            Self::Error(e) => &e.agency,
            Self::Report(r) => &r.agency,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(e) => Some(e.error.as_str()),
            Self::Report(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgencyAnalysisError {
    #[serde(default, deserialize_with = "nullable")]
    pub agency: String,
    #[serde(default, deserialize_with = "nullable")]
    pub total_budget: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub total_count: u64,
    pub error: String,
    #[serde(default, deserialize_with = "nullable")]
    pub categories: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgencyReport {
    #[serde(default, deserialize_with = "nullable")]
    pub agency: String,
    #[serde(default, deserialize_with = "nullable")]
    pub total_budget: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub total_count: u64,
    #[serde(default, deserialize_with = "nullable")]
    pub avg_contract_size: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub avg_confidence: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub categories: Vec<BudgetCategory>,
    #[serde(default)]
    pub summary: Option<AgencySummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetCategory {
    #[serde(default, deserialize_with = "nullable")]
    pub category_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub total_budget: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub total_count: u64,
    #[serde(default, deserialize_with = "nullable")]
    pub budget_percentage: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub subcategories: Vec<BudgetSubcategory>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetSubcategory {
    #[serde(default, deserialize_with = "nullable")]
    pub subcategory_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub count: u64,
    #[serde(default, deserialize_with = "nullable")]
    pub percentage: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub total_budget: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub budget_percentage: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub avg_contract_size: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub avg_confidence: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgencySummary {
    #[serde(default, deserialize_with = "nullable")]
    pub total_categories: u64,
    #[serde(default, deserialize_with = "nullable")]
    pub total_subcategories: u64,
    #[serde(default, deserialize_with = "nullable")]
    pub largest_category: String,
    #[serde(default, deserialize_with = "nullable")]
    pub largest_category_budget: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub largest_category_percentage: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_shape_wins_when_error_present() {
        let v = json!({
            "agency": "Unknown Agency",
            "total_budget": 0,
            "total_count": 0,
            "error": "No data found for agency",
            "categories": []
        });

        let parsed: AgencyAnalysisResponse = serde_json::from_value(v).unwrap();
        assert_eq!(parsed.error(), Some("No data found for agency"));
        assert_eq!(parsed.agency(), "Unknown Agency");
    }

    #[test]
    fn parses_full_report() {
        let v = json!({
            "agency": "Parks and Recreation",
            "total_budget": 434400000.0,
            "total_count": 120,
            "avg_contract_size": 3620000.0,
            "avg_confidence": 0.81,
            "categories": [
                {
                    "category_name": "Park Operations & Maintenance",
                    "total_budget": 282800000.0,
                    "total_count": 70,
                    "budget_percentage": 65.1,
                    "subcategories": [
                        {
                            "subcategory_name": "Landscaping",
                            "count": 30,
                            "percentage": 42.8,
                            "total_budget": 100000000.0,
                            "budget_percentage": 35.4,
                            "avg_contract_size": 3333333.0,
                            "avg_confidence": 0.8
                        }
                    ]
                }
            ],
            "summary": {
                "total_categories": 1,
                "total_subcategories": 1,
                "largest_category": "Park Operations & Maintenance",
                "largest_category_budget": 282800000.0,
                "largest_category_percentage": 65.1
            }
        });

        let parsed: AgencyAnalysisResponse = serde_json::from_value(v).unwrap();
        let AgencyAnalysisResponse::Report(report) = parsed else {
            panic!("expected report variant");
        };
        assert_eq!(report.categories.len(), 1);
        assert_eq!(report.categories[0].subcategories[0].count, 30);
        assert_eq!(
            report.summary.unwrap().largest_category,
            "Park Operations & Maintenance"
        );
    }
}
