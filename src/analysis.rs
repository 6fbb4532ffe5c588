use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use crate::api::is_truthy;
use crate::models::{AnalysisRequest, AnalysisResult, DEFAULT_ANALYSIS_TYPE};
use crate::text::title_case_key;

pub const EMPTY_INPUT: &str = "Please enter a job posting URL or description.";
pub const LOGIN_REQUIRED: &str = "Please log in to analyze job postings.";

static URL_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^https?://").unwrap());

/// Red flag key, human label, terminal icon.
pub const RED_FLAGS: [(&str, &str, &str); 8] = [
    ("vague_description", "Vague Job Description", "[?]"),
    ("unrealistic_salary", "Unrealistic Salary/Benefits", "[$]"),
    ("no_company_info", "No Company Information", "[i]"),
    ("requests_personal_details", "Request for Personal Details", "[id]"),
    ("poor_grammar", "Poor Grammar/Spelling", "[abc]"),
    ("suspicious_contact", "Suspicious Contact Methods", "[@]"),
    ("no_linkedin", "No LinkedIn Presence", "[in]"),
    ("no_company_website", "No Company Website", "[www]"),
];

pub fn flag_label(key: &str) -> (String, &'static str) {
    match RED_FLAGS.iter().find(|(k, _, _)| *k == key) {
        Some((_, label, icon)) => (label.to_string(), *icon),
        None => (title_case_key(key), "[!]"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobInput<'a> {
    Url(&'a str),
    Text(&'a str),
}

pub fn classify_input(raw: &str) -> JobInput<'_> {
    let trimmed = raw.trim();
    if URL_PREFIX.is_match(trimmed) {
        JobInput::Url(trimmed)
    } else {
        JobInput::Text(trimmed)
    }
}

/// Builds the scoring request. Exactly one of `job_text`/`job_url` is filled;
/// `None` for blank input.
pub fn build_request(raw: &str, analysis_type: &str) -> Option<AnalysisRequest> {
    let (job_text, job_url) = match classify_input(raw) {
        JobInput::Text("") => return None,
        JobInput::Url(url) => (String::new(), url.to_string()),
        JobInput::Text(text) => (text.to_string(), String::new()),
    };
    Some(AnalysisRequest {
        job_text,
        job_url,
        company_name: String::new(),
        analysis_type: analysis_type.to_string(),
        job_title: String::new(),
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Error(String),
    Scorecard(AnalysisResult),
    Raw(String),
}

/// Picks how a payload is shown from its shape. Falsy payloads show nothing.
pub fn classify_payload(payload: &Value) -> Option<AnalysisOutcome> {
    if let Some(error) = payload.get("error").filter(|e| is_truthy(e)) {
        let message = match error {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Some(AnalysisOutcome::Error(message));
    }

    if payload.get("fraud_score").is_some() {
        if let Ok(result) = serde_json::from_value::<AnalysisResult>(payload.clone()) {
            return Some(AnalysisOutcome::Scorecard(result));
        }
    }

    if !is_truthy(payload) {
        return None;
    }
    Some(AnalysisOutcome::Raw(match payload {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum AnalysisPhase {
    #[default]
    Idle,
    Analyzing,
    Done(AnalysisOutcome),
}

#[derive(Debug)]
pub struct AnalysisView {
    pub input: String,
    pub analysis_type: String,
    phase: AnalysisPhase,
}

impl Default for AnalysisView {
    fn default() -> Self {
        Self {
            input: String::new(),
            analysis_type: DEFAULT_ANALYSIS_TYPE.to_string(),
            phase: AnalysisPhase::Idle,
        }
    }
}

impl AnalysisView {
    pub fn phase(&self) -> &AnalysisPhase {
        &self.phase
    }

    pub fn is_analyzing(&self) -> bool {
        self.phase == AnalysisPhase::Analyzing
    }

    pub fn outcome(&self) -> Option<&AnalysisOutcome> {
        match &self.phase {
            AnalysisPhase::Done(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Starts an analysis. Gated on an authenticated identity and on there
    /// being no analysis in flight. Any previous result is cleared first.
    pub fn begin(&mut self, authenticated: bool) -> Option<AnalysisRequest> {
        if !authenticated || self.is_analyzing() {
            return None;
        }
        self.phase = AnalysisPhase::Idle;

        match build_request(&self.input, &self.analysis_type) {
            Some(request) => {
                self.phase = AnalysisPhase::Analyzing;
                Some(request)
            }
            None => {
                self.phase = AnalysisPhase::Done(AnalysisOutcome::Error(EMPTY_INPUT.to_string()));
                None
            }
        }
    }

    pub fn finish(&mut self, result: Result<Value, String>) {
        self.phase = match result {
            Ok(payload) => match classify_payload(&payload) {
                Some(outcome) => AnalysisPhase::Done(outcome),
                None => AnalysisPhase::Idle,
            },
            Err(message) => AnalysisPhase::Done(AnalysisOutcome::Error(message)),
        };
    }

    pub fn abandon(&mut self) {
        if self.is_analyzing() {
            self.phase = AnalysisPhase::Idle;
        }
    }

    pub fn type_char(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_url_input_fills_job_url() {
        let request = build_request("https://jobs.example.com/123", "quick").unwrap();
        assert_eq!(request.job_url, "https://jobs.example.com/123");
        assert_eq!(request.job_text, "");
        assert_eq!(request.analysis_type, "quick");
        assert_eq!(request.company_name, "");
        assert_eq!(request.job_title, "");
    }

    #[test]
    fn test_text_input_fills_job_text() {
        let text = "We need a remote assistant, $10k/week, no experience needed";
        let request = build_request(text, "quick").unwrap();
        assert_eq!(request.job_text, text);
        assert_eq!(request.job_url, "");
    }

    #[test]
    fn test_url_detection_is_case_insensitive_and_trimmed() {
        assert_eq!(
            classify_input("  HTTP://Example.com/x "),
            JobInput::Url("HTTP://Example.com/x")
        );
        assert_eq!(classify_input("Https://a.b"), JobInput::Url("Https://a.b"));
    }

    #[test]
    fn test_only_http_prefix_counts_as_url() {
        assert!(matches!(classify_input("ftp://files.example.com"), JobInput::Text(_)));
        assert!(matches!(classify_input("see https://example.com"), JobInput::Text(_)));
        assert!(matches!(classify_input("www.example.com"), JobInput::Text(_)));
    }

    #[test]
    fn test_exactly_one_field_is_populated() {
        let inputs = ["https://x.io", "http://y.io/z", "plain text", "  padded text  ", "ftp://no"];
        for input in inputs {
            let request = build_request(input, "quick").unwrap();
            assert!(request.job_text.is_empty() != request.job_url.is_empty(), "input: {input}");
        }
    }

    #[test]
    fn test_blank_input_builds_nothing() {
        assert!(build_request("   \n ", "quick").is_none());
    }

    #[test]
    fn test_classify_payload_error_field() {
        let outcome = classify_payload(&json!({"error": "Could not fetch URL", "fraud_score": 3}));
        assert_eq!(outcome, Some(AnalysisOutcome::Error("Could not fetch URL".to_string())));
    }

    #[test]
    fn test_classify_payload_scorecard() {
        let outcome = classify_payload(&json!({
            "fraud_score": 88,
            "risk_level": "High",
            "risk_color": "#e74c3c",
            "verdict": "Likely scam",
            "is_scam": true,
            "analysis": {"red_flags": {"vague_description": true}, "llm_analysis": "Too good."}
        }));
        let Some(AnalysisOutcome::Scorecard(result)) = outcome else {
            panic!("expected scorecard, got {outcome:?}");
        };
        assert_eq!(result.fraud_score, Some(88.0));
        assert!(result.is_scam);
        assert_eq!(result.active_flags(), vec!["vague_description"]);
    }

    #[test]
    fn test_classify_payload_raw_fallbacks() {
        assert_eq!(
            classify_payload(&json!("Service warming up")),
            Some(AnalysisOutcome::Raw("Service warming up".to_string()))
        );
        assert_eq!(
            classify_payload(&json!({"status": "queued"})),
            Some(AnalysisOutcome::Raw(r#"{"status":"queued"}"#.to_string()))
        );
        assert_eq!(
            classify_payload(&json!({"fraud_score": "high"})),
            Some(AnalysisOutcome::Raw(r#"{"fraud_score":"high"}"#.to_string()))
        );
    }

    #[test]
    fn test_classify_payload_falsy_shows_nothing() {
        assert_eq!(classify_payload(&Value::Null), None);
        assert_eq!(classify_payload(&json!("")), None);
        assert_eq!(
            classify_payload(&json!({"error": ""})),
            Some(AnalysisOutcome::Raw(r#"{"error":""}"#.to_string()))
        );
    }

    #[test]
    fn test_classify_payload_scorecard_with_null_fields() {
        let payload = json!({
            "fraud_score": 80,
            "verdict": "Likely scam",
            "is_scam": null,
            "analysis": { "red_flags": null, "llm_analysis": "x" }
        });
        let Some(AnalysisOutcome::Scorecard(result)) = classify_payload(&payload) else {
            panic!("expected scorecard for {payload}");
        };
        assert_eq!(result.fraud_score, Some(80.0));
        assert_eq!(result.verdict.as_deref(), Some("Likely scam"));
        assert!(!result.is_scam);
    }

    #[test]
    fn test_view_is_gated_on_identity() {
        let mut view = AnalysisView {
            input: "https://jobs.example.com/1".to_string(),
            ..Default::default()
        };
        assert!(view.begin(false).is_none());
        assert_eq!(view.phase(), &AnalysisPhase::Idle);
        assert!(view.begin(true).is_some());
    }

    #[test]
    fn test_view_guards_in_flight_analysis() {
        let mut view = AnalysisView {
            input: "text".to_string(),
            ..Default::default()
        };
        assert!(view.begin(true).is_some());
        assert!(view.begin(true).is_none());
        view.finish(Err("connection refused".to_string()));
        assert_eq!(view.outcome(), Some(&AnalysisOutcome::Error("connection refused".to_string())));
        assert!(view.begin(true).is_some());
    }

    #[test]
    fn test_view_empty_input_shows_prompt() {
        let mut view = AnalysisView::default();
        assert!(view.begin(true).is_none());
        assert_eq!(view.outcome(), Some(&AnalysisOutcome::Error(EMPTY_INPUT.to_string())));
    }

    #[test]
    fn test_flag_label_fallback() {
        assert_eq!(flag_label("poor_grammar"), ("Poor Grammar/Spelling".to_string(), "[abc]"));
        assert_eq!(flag_label("crypto_payment").0, "Crypto Payment");
    }
}
