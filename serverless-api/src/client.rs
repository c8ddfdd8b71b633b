use crate::config::ApiConfig;
use crate::metrics_defs::{API_REQUEST_DURATION, API_REQUEST_RETRY};
use crate::types::{
    CreateTrafficFilterRequest, ElasticsearchProject, ObservabilityProject,
    PatchElasticsearchProjectRequest, PatchObservabilityProjectRequest,
    PatchSecurityProjectRequest, PatchTrafficFilterRequest, SecurityProject, TrafficFilterInfo,
};
use async_trait::async_trait;
use bytes::Bytes;
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::{counter, histogram};
use std::borrow::Cow;
use std::time::Instant;
use tokio::time::{Duration, sleep};
use url::Url;

const API_PREFIX: &[&str] = &["api", "v1", "serverless"];

/// Upper bound for a single backoff, whatever the base delay and attempt.
const MAX_BACKOFF: Duration = Duration::from_secs(30);

const RETRIABLE_STATUS_CODES: &[StatusCode] = &[
    StatusCode::TOO_MANY_REQUESTS,     // 429
    StatusCode::INTERNAL_SERVER_ERROR, // 500
    StatusCode::BAD_GATEWAY,           // 502
    StatusCode::SERVICE_UNAVAILABLE,   // 503
    StatusCode::GATEWAY_TIMEOUT,       // 504
];

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("HTTP client error: {0}")]
    ReqwestError(#[from] reqwest::Error),
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Outcome of a single API call.
///
/// `payload` is only decoded when the response carries the operation's
/// success status; the raw body is always kept for error reporting.
#[derive(Clone, Debug)]
pub struct ApiResponse<T> {
    pub status: StatusCode,
    pub payload: Option<T>,
    pub body: Bytes,
}

impl<T> ApiResponse<T> {
    pub fn new(status: StatusCode, payload: Option<T>, body: Bytes) -> Self {
        ApiResponse {
            status,
            payload,
            body,
        }
    }

    pub fn status_line(&self) -> String {
        status_line(self.status)
    }

    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Formats a status as "404 Not Found".
pub fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

/// The serverless API operations used by the traffic filter resources.
///
/// Exactly one request is in flight per call. Implementations own timeouts
/// and retries; callers treat any `ApiError` as final.
#[async_trait]
pub trait ServerlessApi: Send + Sync {
    async fn get_elasticsearch_project(
        &self,
        id: &str,
    ) -> Result<ApiResponse<ElasticsearchProject>, ApiError>;

    async fn patch_elasticsearch_project(
        &self,
        id: &str,
        request: &PatchElasticsearchProjectRequest,
    ) -> Result<ApiResponse<ElasticsearchProject>, ApiError>;

    async fn get_observability_project(
        &self,
        id: &str,
    ) -> Result<ApiResponse<ObservabilityProject>, ApiError>;

    async fn patch_observability_project(
        &self,
        id: &str,
        request: &PatchObservabilityProjectRequest,
    ) -> Result<ApiResponse<ObservabilityProject>, ApiError>;

    async fn get_security_project(&self, id: &str)
    -> Result<ApiResponse<SecurityProject>, ApiError>;

    async fn patch_security_project(
        &self,
        id: &str,
        request: &PatchSecurityProjectRequest,
    ) -> Result<ApiResponse<SecurityProject>, ApiError>;

    async fn create_traffic_filter(
        &self,
        request: &CreateTrafficFilterRequest,
    ) -> Result<ApiResponse<TrafficFilterInfo>, ApiError>;

    async fn get_traffic_filter(&self, id: &str)
    -> Result<ApiResponse<TrafficFilterInfo>, ApiError>;

    async fn patch_traffic_filter(
        &self,
        id: &str,
        request: &PatchTrafficFilterRequest,
    ) -> Result<ApiResponse<TrafficFilterInfo>, ApiError>;

    /// Deletes never carry a payload; callers inspect the status.
    async fn delete_traffic_filter(&self, id: &str) -> Result<ApiResponse<()>, ApiError>;
}

/// `ServerlessApi` over HTTP.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    endpoint: Url,
    api_key: String,
    max_retries: u32,
    retry_base_delay: Duration,
}

impl HttpClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(HttpClient {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            max_retries: config.max_retries,
            retry_base_delay: Duration::from_millis(config.retry_base_delay_ms),
        })
    }

    fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.endpoint.to_string()))?
            .pop_if_empty()
            .extend(API_PREFIX)
            .extend(segments);
        Ok(url)
    }

    // Sends the request, retrying idempotent methods on retriable statuses.
    // POST is never retried since a lost response could mean a created entity.
    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
    ) -> Result<(StatusCode, Bytes), ApiError> {
        let retriable = method != Method::POST;
        let mut retries = 0;

        loop {
            let mut request = self
                .client
                .request(method.clone(), url.clone())
                .header(AUTHORIZATION, format!("ApiKey {}", self.api_key))
                .header(ACCEPT, "application/json");

            if let Some(body) = &body {
                request = request
                    .header(CONTENT_TYPE, "application/json")
                    .body(body.clone());
            }

            let started = Instant::now();
            let response = request.send().await?;
            let status = response.status();
            histogram!(API_REQUEST_DURATION, "method" => method.to_string())
                .record(started.elapsed().as_secs_f64());

            if retriable && RETRIABLE_STATUS_CODES.contains(&status) && retries < self.max_retries {
                let delay = backoff_delay(self.retry_base_delay, retries);
                tracing::warn!(
                    method = %method,
                    url = %url,
                    status = %status,
                    retry = retries + 1,
                    "Retriable response from serverless API"
                );
                counter!(API_REQUEST_RETRY).increment(1);
                sleep(delay).await;
                retries += 1;
                continue;
            }

            let body = response.bytes().await?;
            tracing::debug!(
                method = %method,
                url = %url,
                status = %status,
                "Serverless API request completed"
            );

            return Ok((status, body));
        }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<Vec<u8>>,
        success: StatusCode,
    ) -> Result<ApiResponse<T>, ApiError> {
        let url = self.url(segments)?;
        let (status, body) = self.send(method, url, body).await?;

        let payload = if status == success {
            Some(serde_json::from_slice(&body)?)
        } else {
            None
        };

        Ok(ApiResponse::new(status, payload, body))
    }
}

/// `base * 2^retry`, capped at `MAX_BACKOFF`.
fn backoff_delay(base: Duration, retry: u32) -> Duration {
    let factor = 2_u32.checked_pow(retry).unwrap_or(u32::MAX);
    base.saturating_mul(factor).min(MAX_BACKOFF)
}

fn encode<B: Serialize>(body: &B) -> Result<Option<Vec<u8>>, ApiError> {
    Ok(Some(serde_json::to_vec(body)?))
}

#[async_trait]
impl ServerlessApi for HttpClient {
    async fn get_elasticsearch_project(
        &self,
        id: &str,
    ) -> Result<ApiResponse<ElasticsearchProject>, ApiError> {
        self.call(
            Method::GET,
            &["projects", "elasticsearch", id],
            None,
            StatusCode::OK,
        )
        .await
    }

    async fn patch_elasticsearch_project(
        &self,
        id: &str,
        request: &PatchElasticsearchProjectRequest,
    ) -> Result<ApiResponse<ElasticsearchProject>, ApiError> {
        self.call(
            Method::PATCH,
            &["projects", "elasticsearch", id],
            encode(request)?,
            StatusCode::OK,
        )
        .await
    }

    async fn get_observability_project(
        &self,
        id: &str,
    ) -> Result<ApiResponse<ObservabilityProject>, ApiError> {
        self.call(
            Method::GET,
            &["projects", "observability", id],
            None,
            StatusCode::OK,
        )
        .await
    }

    async fn patch_observability_project(
        &self,
        id: &str,
        request: &PatchObservabilityProjectRequest,
    ) -> Result<ApiResponse<ObservabilityProject>, ApiError> {
        self.call(
            Method::PATCH,
            &["projects", "observability", id],
            encode(request)?,
            StatusCode::OK,
        )
        .await
    }

    async fn get_security_project(
        &self,
        id: &str,
    ) -> Result<ApiResponse<SecurityProject>, ApiError> {
        self.call(
            Method::GET,
            &["projects", "security", id],
            None,
            StatusCode::OK,
        )
        .await
    }

    async fn patch_security_project(
        &self,
        id: &str,
        request: &PatchSecurityProjectRequest,
    ) -> Result<ApiResponse<SecurityProject>, ApiError> {
        self.call(
            Method::PATCH,
            &["projects", "security", id],
            encode(request)?,
            StatusCode::OK,
        )
        .await
    }

    async fn create_traffic_filter(
        &self,
        request: &CreateTrafficFilterRequest,
    ) -> Result<ApiResponse<TrafficFilterInfo>, ApiError> {
        self.call(
            Method::POST,
            &["traffic-filters"],
            encode(request)?,
            StatusCode::CREATED,
        )
        .await
    }

    async fn get_traffic_filter(
        &self,
        id: &str,
    ) -> Result<ApiResponse<TrafficFilterInfo>, ApiError> {
        self.call(Method::GET, &["traffic-filters", id], None, StatusCode::OK)
            .await
    }

    async fn patch_traffic_filter(
        &self,
        id: &str,
        request: &PatchTrafficFilterRequest,
    ) -> Result<ApiResponse<TrafficFilterInfo>, ApiError> {
        self.call(
            Method::PATCH,
            &["traffic-filters", id],
            encode(request)?,
            StatusCode::OK,
        )
        .await
    }

    async fn delete_traffic_filter(&self, id: &str) -> Result<ApiResponse<()>, ApiError> {
        let url = self.url(&["traffic-filters", id])?;
        let (status, body) = self.send(Method::DELETE, url, None).await?;
        Ok(ApiResponse::new(status, None, body))
    }
}
