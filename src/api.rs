use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};

use crate::models::{
    AnalysisRequest, Credentials, LoginResponse, ProfileUpdate, RecommendationRequest,
    RecommendationResult, RegistrationRequest, ScamReport,
};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_ORIGIN: &str = "http://localhost:5000";

// Paths the screens call directly against the origin rather than through the API base.
const DIRECT_ANALYZE_PATH: &str = "/api/analyze";
const DIRECT_RECOMMEND_PATH: &str = "/api/ml_recommend";
const DIRECT_LOGOUT_PATH: &str = "/api/logout";

const REQUEST_FAILED: &str = "Request failed";
pub const ANALYZE_FAILED: &str = "Failed to analyze. Please try again.";
pub const RECOMMEND_FAILED: &str = "Failed to load recommendation.";

/// Uniform failure for every backend call.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("{0}")]
    Decode(#[from] serde_json::Error),

    /// The backend answered but refused the request.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// The message to show the user, or `fallback` when the failure carries none.
    pub fn user_message(&self, fallback: &str) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            fallback.to_string()
        } else {
            message
        }
    }
}

/// JavaScript-style truthiness, which is how the backend's optional fields are read.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn server_message(payload: &Value, key: &str) -> Option<String> {
    let value = payload.get(key).filter(|v| is_truthy(v))?;
    Some(match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

fn normalize_base(url: &str) -> Result<String, ApiError> {
    let trimmed = url.trim().trim_end_matches('/');
    let lower = trimmed.to_ascii_lowercase();
    if !(lower.starts_with("http://") || lower.starts_with("https://")) {
        return Err(ApiError::Config(format!(
            "'{}' must start with http:// or https://",
            url
        )));
    }
    Ok(trimmed.to_string())
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    origin: String,
}

impl ApiClient {
    /// Builds a client whose cookie store is shared by every call, so session
    /// cookies set by `/login` ride along on later requests.
    pub fn new(base_url: &str, origin: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut builder = Client::builder().cookie_store(true);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: normalize_base(base_url)?,
            origin: normalize_base(origin)?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    async fn send<B>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
    ) -> Result<(StatusCode, Value), ApiError>
    where
        B: Serialize + ?Sized,
    {
        debug!(%method, %url, "sending request");
        let mut request = self
            .client
            .request(method, url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        let payload: Value = serde_json::from_slice(&bytes)?;
        debug!(%url, status = status.as_u16(), "received response");
        Ok((status, payload))
    }

    /// Sends one request to `{base_url}{endpoint}` and returns the parsed payload.
    ///
    /// Non-2xx responses fail with the payload's `message` field, or
    /// `"Request failed"` when it has none. Transport and parse failures pass
    /// through unchanged. There are no retries.
    pub async fn request<B>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<Value, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, endpoint);
        let result = self.send(method, &url, body).await.and_then(|(status, payload)| {
            if status.is_success() {
                Ok(payload)
            } else {
                Err(ApiError::Rejected {
                    status: status.as_u16(),
                    message: server_message(&payload, "message")
                        .unwrap_or_else(|| REQUEST_FAILED.to_string()),
                })
            }
        });

        if let Err(err) = &result {
            error!(%url, error = %err, "API error");
        }
        result
    }

    /// POST to a literal `/api/...` path on the origin. A payload carrying an
    /// `error` field counts as a failure even on 2xx.
    async fn direct<B>(&self, path: &str, body: &B, fallback: &str) -> Result<Value, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.origin, path);
        let (status, payload) = self
            .send(Method::POST, &url, Some(body))
            .await
            .inspect_err(|err| error!(%url, error = %err, "API error"))?;

        let carries_error = payload.get("error").is_some_and(is_truthy);
        if !status.is_success() || carries_error {
            let message = server_message(&payload, "error").unwrap_or_else(|| fallback.to_string());
            error!(%url, status = status.as_u16(), %message, "backend reported failure");
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message,
            });
        }
        Ok(payload)
    }

    // --- Authentication ---

    pub async fn register(&self, registration: &RegistrationRequest) -> Result<Value, ApiError> {
        self.request(Method::POST, "/register", Some(registration)).await
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        let payload = self.request(Method::POST, "/login", Some(credentials)).await?;
        Ok(serde_json::from_value(payload)?)
    }

    /// Best-effort server notification. Only the transport outcome and status
    /// matter; the body is not parsed.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let url = format!("{}{}", self.origin, DIRECT_LOGOUT_PATH);
        let response = self.client.post(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message: REQUEST_FAILED.to_string(),
            });
        }
        Ok(())
    }

    pub async fn edit_profile(&self, update: &ProfileUpdate) -> Result<Value, ApiError> {
        self.request(Method::PUT, "/edit_profile", Some(update)).await
    }

    // --- Job analysis ---

    pub async fn analyze_job(&self, job: &AnalysisRequest) -> Result<Value, ApiError> {
        self.request(Method::POST, "/analyze", Some(job)).await
    }

    pub async fn analyze_direct(&self, job: &AnalysisRequest) -> Result<Value, ApiError> {
        self.direct(DIRECT_ANALYZE_PATH, job, ANALYZE_FAILED).await
    }

    pub async fn recommend_direct(
        &self,
        job: &RecommendationRequest,
    ) -> Result<RecommendationResult, ApiError> {
        let payload = self.direct(DIRECT_RECOMMEND_PATH, job, RECOMMEND_FAILED).await?;
        Ok(serde_json::from_value(payload)?)
    }

    // --- Reporting and statistics ---

    pub async fn report_scam(&self, report: &ScamReport) -> Result<Value, ApiError> {
        self.request(Method::POST, "/report_scam", Some(report)).await
    }

    pub async fn stats(&self) -> Result<Value, ApiError> {
        self.request::<()>(Method::GET, "/stats", None).await
    }

    pub async fn recent_alerts(&self) -> Result<Value, ApiError> {
        self.request::<()>(Method::GET, "/recent_alerts", None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{client_for, serve};
    use axum::http::header::{COOKIE, SET_COOKIE};
    use axum::http::{HeaderMap, StatusCode as AxumStatus};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::json;

    fn sample_request() -> AnalysisRequest {
        AnalysisRequest {
            job_text: "Remote assistant".to_string(),
            job_url: String::new(),
            company_name: String::new(),
            analysis_type: "quick".to_string(),
            job_title: String::new(),
        }
    }

    #[test]
    fn test_new_rejects_url_without_scheme() {
        let result = ApiClient::new("localhost:5000/api", DEFAULT_ORIGIN, None);
        assert!(matches!(result, Err(ApiError::Config(_))));
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let client =
            ApiClient::new("http://localhost:5000/api/", "http://localhost:5000/", None).unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000/api");
        assert_eq!(client.origin(), "http://localhost:5000");
    }

    #[test]
    fn test_is_truthy_matches_javascript() {
        assert!(!is_truthy(&Value::Null));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(false)));
        assert!(is_truthy(&json!("x")));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!({})));
        assert!(is_truthy(&json!([])));
    }

    #[tokio::test]
    async fn test_request_returns_payload_on_success() {
        let router =
            Router::new().route("/api/stats", get(|| async { Json(json!({"analyzed": 12})) }));
        let client = client_for(&serve(router).await);

        let stats = client.stats().await.unwrap();
        assert_eq!(stats["analyzed"], 12);
    }

    #[tokio::test]
    async fn test_request_uses_server_message_on_failure() {
        let router = Router::new().route(
            "/api/login",
            post(|| async {
                (AxumStatus::UNAUTHORIZED, Json(json!({"message": "Wrong password"})))
            }),
        );
        let client = client_for(&serve(router).await);

        let creds = Credentials {
            email: "a@b.c".to_string(),
            password: "nope".to_string(),
        };
        let err = client.login(&creds).await.unwrap_err();
        match err {
            ApiError::Rejected { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Wrong password");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_request_falls_back_to_generic_message() {
        let router = Router::new().route(
            "/api/register",
            post(|| async { (AxumStatus::BAD_REQUEST, Json(json!({"detail": "?"}))) }),
        );
        let client = client_for(&serve(router).await);

        let registration = RegistrationRequest {
            username: "u".to_string(),
            email: "u@x.io".to_string(),
            password: "secret1".to_string(),
            qualification: "Student".to_string(),
            fields_of_interest: "Finance".to_string(),
        };
        let err = client.register(&registration).await.unwrap_err();
        assert_eq!(err.to_string(), "Request failed");
    }

    #[tokio::test]
    async fn test_non_json_body_is_a_decode_error() {
        let router =
            Router::new().route("/api/recent_alerts", get(|| async { "<html>oops</html>" }));
        let client = client_for(&serve(router).await);

        let err = client.recent_alerts().await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_a_transport_error() {
        let client = client_for("http://127.0.0.1:1");
        let err = client.stats().await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert!(!err.to_string().is_empty());
    }

    #[tokio::test]
    async fn test_cookies_from_login_are_sent_on_later_calls() {
        let router = Router::new()
            .route(
                "/api/login",
                post(|| async {
                    (
                        [(SET_COOKIE, "session=abc123; Path=/")],
                        Json(json!({"user": {"username": "asha"}})),
                    )
                }),
            )
            .route(
                "/api/stats",
                get(|headers: HeaderMap| async move {
                    let cookie = headers
                        .get(COOKIE)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    Json(json!({ "cookie": cookie }))
                }),
            );
        let client = client_for(&serve(router).await);

        let creds = Credentials {
            email: "asha@example.com".to_string(),
            password: "secret1".to_string(),
        };
        client.login(&creds).await.unwrap();
        let stats = client.stats().await.unwrap();
        assert_eq!(stats["cookie"], "session=abc123");
    }

    #[tokio::test]
    async fn test_analyze_direct_treats_error_field_as_failure() {
        let router = Router::new().route(
            "/api/analyze",
            post(|| async { Json(json!({"error": "Could not fetch URL"})) }),
        );
        let client = client_for(&serve(router).await);

        let err = client.analyze_direct(&sample_request()).await.unwrap_err();
        assert_eq!(err.to_string(), "Could not fetch URL");
    }

    #[tokio::test]
    async fn test_analyze_direct_falls_back_on_bare_failure() {
        let router = Router::new().route(
            "/api/analyze",
            post(|| async { (AxumStatus::INTERNAL_SERVER_ERROR, Json(json!({}))) }),
        );
        let client = client_for(&serve(router).await);

        let err = client.analyze_direct(&sample_request()).await.unwrap_err();
        assert_eq!(err.to_string(), ANALYZE_FAILED);
    }

    #[tokio::test]
    async fn test_recommend_direct_keeps_jobs_with_null_fields() {
        let router = Router::new().route(
            "/api/ml_recommend",
            post(|| async {
                Json(json!({
                    "total_recommendations": 1,
                    "recommendations": [{
                        "title": "A",
                        "company": "B",
                        "fraud_score": 10,
                        "description": null,
                        "link": null
                    }]
                }))
            }),
        );
        let client = client_for(&serve(router).await);

        let request = RecommendationRequest {
            title: "Sample Job".to_string(),
            company: "Sample Company".to_string(),
            url: String::new(),
            source: "User".to_string(),
        };
        let result = client.recommend_direct(&request).await.unwrap();
        assert_eq!(result.recommendations.len(), 1);
        assert_eq!(result.recommendations[0].company, "B");
        assert!(result.recommendations[0].description.is_empty());
    }

    #[tokio::test]
    async fn test_analyze_job_goes_through_api_base() {
        let router = Router::new().route(
            "/api/analyze",
            post(|Json(body): Json<Value>| async move {
                Json(json!({ "echo": body["job_text"] }))
            }),
        );
        let client = client_for(&serve(router).await);

        let payload = client.analyze_job(&sample_request()).await.unwrap();
        assert_eq!(payload["echo"], "Remote assistant");
    }

    #[tokio::test]
    async fn test_logout_reports_status_failures() {
        let router = Router::new()
            .route("/api/logout", post(|| async { AxumStatus::INTERNAL_SERVER_ERROR }));
        let client = client_for(&serve(router).await);

        assert!(client.logout().await.is_err());
    }
}
