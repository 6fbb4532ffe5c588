use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub const PROFESSIONS: [&str; 4] = [
    "Student",
    "Recent Graduate",
    "Working Professional",
    "Job Seeking Professional",
];

pub const INTERESTS: [&str; 5] = ["Technology", "Finance", "Healthcare", "Education", "Other"];

pub const DEFAULT_ANALYSIS_TYPE: &str = "quick";

/// Reads an explicit `null` as the field's default. The backend sends `null`
/// for anything it could not compute.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub qualification: String,
    pub fields_of_interest: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub user: Option<Value>,
}

/// The authenticated identity. Only `username` is interpreted; everything else
/// the backend returned is kept so it round-trips into the session store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub username: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub job_text: String,
    pub job_url: String,
    pub company_name: String,
    pub analysis_type: String,
    pub job_title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisDetail {
    /// Flag name to indicator, in the order the backend sent them.
    #[serde(default, deserialize_with = "null_as_default")]
    pub red_flags: Map<String, Value>,
    #[serde(default)]
    pub llm_analysis: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub fraud_score: Option<f64>,
    #[serde(default)]
    pub risk_level: Option<String>,
    #[serde(default)]
    pub risk_color: Option<String>,
    #[serde(default)]
    pub verdict: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_scam: bool,
    #[serde(default)]
    pub analysis: Option<AnalysisDetail>,
}

impl AnalysisResult {
    /// Red flag keys whose value is exactly `true`.
    pub fn active_flags(&self) -> Vec<&str> {
        let Some(detail) = &self.analysis else {
            return Vec::new();
        };
        detail
            .red_flags
            .iter()
            .filter(|(_, value)| **value == Value::Bool(true))
            .map(|(key, _)| key.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub title: String,
    pub company: String,
    pub url: String,
    pub source: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendedJob {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub company: String,
    pub fraud_score: Option<f64>,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String, // HTML from the backend, never rendered as markup
    #[serde(deserialize_with = "null_as_default")]
    pub link: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationResult {
    pub total_recommendations: Option<u64>,
    pub safe_jobs_count: Option<u64>,
    pub risky_jobs_count: Option<u64>,
    #[serde(deserialize_with = "null_as_default")]
    pub recommendations: Vec<RecommendedJob>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub email: String,
    pub qualification: String,
    pub fields_of_interest: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScamReport {
    pub job_url: String,
    pub company_name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryEntry {
    pub id: u32,
    pub date: &'static str,
    pub title: &'static str,
    pub result: &'static str,
}

pub const ANALYSIS_HISTORY: [HistoryEntry; 4] = [
    HistoryEntry {
        id: 1,
        date: "2023-10-01",
        title: "Job Posting 1",
        result: "No issues detected",
    },
    HistoryEntry {
        id: 2,
        date: "2023-10-05",
        title: "Job Posting 2",
        result: "Potential fraud detected: High salary promise",
    },
    HistoryEntry {
        id: 3,
        date: "2023-10-10",
        title: "Job Posting 3",
        result: "No issues detected",
    },
    HistoryEntry {
        id: 4,
        date: "2023-10-12",
        title: "Job Posting 4",
        result: "Potential fraud detected: Lack of company details",
    },
];

pub const DOWNLOAD_HISTORY: [HistoryEntry; 3] = [
    HistoryEntry {
        id: 1,
        date: "2023-10-01",
        title: "Senior Software Engineer",
        result: "High Risk",
    },
    HistoryEntry { id: 2, date: "2023-10-05", title: "Product Manager", result: "Medium Risk" },
    HistoryEntry { id: 3, date: "2023-10-10", title: "Marketing Coordinator", result: "Low Risk" },
];
