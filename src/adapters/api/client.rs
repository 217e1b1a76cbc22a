//! HTTP client for the clinical-record and job API
//!
//! Every non-2xx answer becomes an [`ApiError::Http`] whose text is
//! `"{status} {reason}: {detail}"`, where `detail` is the JSON encoding of the
//! body's `detail` field when present and of the whole body otherwise. Bodies
//! that are empty decode as `null`; bodies that are not JSON are wrapped as
//! `{"raw": "<text>"}` so error messages always have something to show.

use crate::config::ApiConfig;
use crate::domain::{
    ApiError, CaredeskError, CorrelationId, Decision, EntityId, Job, JobList, JobSubmission,
    PreAuth, Result, SubmissionMode,
};
use crate::log_api_error;
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

use super::JobStatusSource;

/// Header carrying the session's correlation id on mutating requests
pub const CORRELATION_HEADER: &str = "X-Correlation-Id";

/// Typed client for the remote API
///
/// Cheap to clone; clones share the connection pool.
///
/// # Example
///
/// ```no_run
/// use caredesk::adapters::api::ApiClient;
/// use caredesk::config::ApiConfig;
/// use caredesk::domain::EntityId;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ApiClient::new(&ApiConfig::default())?;
/// let job = client.get_job(&EntityId::new("job-1")?).await?;
/// println!("{} is {}", job.id, job.status);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    /// Build a client from configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be constructed.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .build()
            .map_err(|e| {
                CaredeskError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /jobs/{id}`
    pub async fn get_job(&self, job_id: &EntityId) -> std::result::Result<Job, ApiError> {
        let path = format!("/jobs/{job_id}");
        self.send_json(Method::GET, &path, None).await
    }

    /// `GET /jobs`, optionally filtered by status
    pub async fn list_jobs(&self, status: Option<&str>) -> std::result::Result<JobList, ApiError> {
        let path = match status {
            Some(status) => format!("/jobs?status={}", encode_query_value(status)),
            None => "/jobs".to_string(),
        };
        self.send_json(Method::GET, &path, None).await
    }

    /// `GET /preauth/{id}`
    pub async fn get_preauth(
        &self,
        preauth_id: &EntityId,
    ) -> std::result::Result<PreAuth, ApiError> {
        let path = format!("/preauth/{preauth_id}");
        self.send_json(Method::GET, &path, None).await
    }

    /// `GET /preauth/{id}/latest-decision`
    ///
    /// A 404 means no decision has been recorded yet and yields `Ok(None)`.
    pub async fn latest_decision(
        &self,
        preauth_id: &EntityId,
    ) -> std::result::Result<Option<Decision>, ApiError> {
        let path = format!("/preauth/{preauth_id}/latest-decision");
        match self.send_json(Method::GET, &path, None).await {
            Ok(decision) => Ok(Some(decision)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// `POST /preauth/{id}/submit` or `POST /preauth/{id}/resubmit`
    pub async fn submit_preauth(
        &self,
        preauth_id: &EntityId,
        mode: SubmissionMode,
        correlation_id: &CorrelationId,
    ) -> std::result::Result<JobSubmission, ApiError> {
        let path = format!("/preauth/{preauth_id}/{}", mode.endpoint());
        self.send_json(Method::POST, &path, Some(correlation_id))
            .await
    }

    /// `POST /preauth/{id}/resubmit`
    pub async fn resubmit_preauth(
        &self,
        preauth_id: &EntityId,
        correlation_id: &CorrelationId,
    ) -> std::result::Result<JobSubmission, ApiError> {
        self.submit_preauth(preauth_id, SubmissionMode::Resubmit, correlation_id)
            .await
    }

    /// `POST /preauth/{id}/enqueue-review`
    pub async fn enqueue_review(
        &self,
        preauth_id: &EntityId,
        correlation_id: &CorrelationId,
    ) -> std::result::Result<JobSubmission, ApiError> {
        let path = format!("/preauth/{preauth_id}/enqueue-review");
        self.send_json(Method::POST, &path, Some(correlation_id))
            .await
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        correlation_id: Option<&CorrelationId>,
    ) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self
            .client
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json");

        if let Some(correlation_id) = correlation_id {
            request = request.header(CORRELATION_HEADER, correlation_id.as_str());
        }

        request
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        correlation_id: Option<&CorrelationId>,
    ) -> std::result::Result<T, ApiError> {
        let method_name = method.as_str().to_string();
        let result = self.send(method, path, correlation_id).await.and_then(|body| {
            serde_json::from_value(body).map_err(|e| ApiError::InvalidResponse {
                path: path.to_string(),
                message: e.to_string(),
            })
        });

        if let Err(ref error) = result {
            // An absent decision is routine; don't log it as a failure.
            if !error.is_not_found() {
                log_api_error!(method_name.as_str(), path, error);
            }
        }

        result
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        correlation_id: Option<&CorrelationId>,
    ) -> std::result::Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(method = %method, url = %url, "Sending API request");

        let response = self
            .request(method, path, correlation_id)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ApiError::Timeout(url.clone())
                } else {
                    ApiError::Network {
                        url: url.clone(),
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| ApiError::Network {
            url: url.clone(),
            message: e.to_string(),
        })?;
        let body = parse_body(&text);

        if !status.is_success() {
            return Err(http_error(status, &body));
        }

        Ok(body)
    }
}

#[async_trait]
impl JobStatusSource for ApiClient {
    async fn job_status(&self, job_id: &EntityId) -> std::result::Result<Job, ApiError> {
        self.get_job(job_id).await
    }
}

/// Decode a response body: empty is `null`, non-JSON is `{"raw": text}`
fn parse_body(text: &str) -> Value {
    if text.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| serde_json::json!({ "raw": text }))
}

fn http_error(status: StatusCode, body: &Value) -> ApiError {
    let detail_value = body
        .get("detail")
        .filter(|detail| !is_blank(detail))
        .unwrap_or(body);
    let detail = serde_json::to_string(detail_value).unwrap_or_else(|_| detail_value.to_string());

    ApiError::Http {
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or("").to_string(),
        detail,
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn encode_query_value(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}
