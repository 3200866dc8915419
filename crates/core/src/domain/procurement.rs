use crate::domain::{nullable, whole_number};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcurementRecord {
    #[serde(rename = "ID", default, deserialize_with = "whole_number")]
    pub id: i64,
    #[serde(rename = "PlanID", default, deserialize_with = "nullable")]
    pub plan_id: String,
    #[serde(rename = "Agency", default, deserialize_with = "nullable")]
    pub agency: String,
    #[serde(rename = "Services_Description", default, deserialize_with = "nullable")]
    pub services_description: String,
    #[serde(rename = "Start_Date", default, deserialize_with = "nullable")]
    pub start_date: String,
    #[serde(rename = "End_Date", default, deserialize_with = "nullable")]
    pub end_date: String,
    #[serde(rename = "Procurement_Method", default, deserialize_with = "nullable")]
    pub procurement_method: String,
    #[serde(rename = "Fiscal_Quarter", default, deserialize_with = "nullable")]
    pub fiscal_quarter: String,
    #[serde(rename = "Job_Titles", default, deserialize_with = "nullable")]
    pub job_titles: String,
    #[serde(rename = "Head_Count", default)]
    pub head_count: Option<f64>,
    #[serde(rename = "Fiscal_Year", default, deserialize_with = "nullable")]
    pub fiscal_year: String,
    #[serde(rename = "Data_Source", default, deserialize_with = "nullable")]
    pub data_source: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AwardRecord {
    #[serde(rename = "ID", default, deserialize_with = "nullable")]
    pub id: String,
    #[serde(rename = "Agency", default, deserialize_with = "nullable")]
    pub agency: String,
    #[serde(rename = "Title", default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(rename = "Award_Date", default, deserialize_with = "nullable")]
    pub award_date: String,
    #[serde(rename = "Description", default, deserialize_with = "nullable")]
    pub description: String,
    #[serde(rename = "Category", default, deserialize_with = "nullable")]
    pub category: String,
    #[serde(rename = "Agency_Division", default)]
    pub agency_division: Option<String>,
    #[serde(rename = "Notice_Type", default)]
    pub notice_type: Option<String>,
    #[serde(rename = "Contact_Information", default)]
    pub contact_information: Option<String>,
    #[serde(rename = "Selection_Method", default)]
    pub selection_method: Option<String>,
    #[serde(rename = "Vendor_Information", default)]
    pub vendor_information: Option<String>,
    #[serde(rename = "Award_Status", default)]
    pub award_status: AwardStatus,
}

/// Published status of an award notice. Anything the backend sends outside the
/// known set lands in `Unknown` rather than failing the whole page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum AwardStatus {
    Yes,
    No,
    IntentToAward,
    #[default]
    Unknown,
}

impl From<Option<String>> for AwardStatus {
    fn from(raw: Option<String>) -> Self {
        let Some(raw) = raw else {
            return Self::Unknown;
        };
        match raw.trim().to_ascii_uppercase().as_str() {
            "YES" => Self::Yes,
            "NO" => Self::No,
            "INTENT TO AWARD" => Self::IntentToAward,
            _ => Self::Unknown,
        }
    }
}

impl From<AwardStatus> for String {
    fn from(status: AwardStatus) -> Self {
        status.as_str().to_string()
    }
}

impl AwardStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "YES",
            Self::No => "NO",
            Self::IntentToAward => "Intent to Award",
            Self::Unknown => "unknown",
        }
    }
}

/// One page of a paginated backend search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub records: Vec<T>,
    #[serde(default)]
    pub total_count: u64,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub has_next: bool,
    #[serde(default)]
    pub has_previous: bool,
}

fn first_page() -> u32 {
    1
}

impl<T> Page<T> {
    /// 1-based inclusive range of rows shown on this page, `None` when the page is empty.
    pub fn showing_range(&self) -> Option<(u64, u64)> {
        if self.records.is_empty() || self.total_count == 0 {
            return None;
        }
        let size = u64::from(self.page_size.max(1));
        let start = u64::from(self.page.saturating_sub(1)) * size + 1;
        let end = (start + self.records.len() as u64 - 1).min(self.total_count);
        Some((start, end))
    }
}
