use serde::Deserialize;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("API key cannot be empty")]
    EmptyApiKey,

    #[error("Timeout cannot be 0")]
    InvalidTimeout,

    #[error("Unsupported endpoint scheme: {0}")]
    UnsupportedScheme(String),

    #[error("max_retries cannot exceed {max}, got {0}", max = MAX_RETRIES)]
    TooManyRetries(u32),
}

pub const MAX_RETRIES: u32 = 10;

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    500
}

/// Connection settings for the serverless API
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ApiConfig {
    /// Base URL of the API, e.g. "https://api.elastic-cloud.com"
    pub endpoint: Url,
    /// API key sent as `Authorization: ApiKey <key>`
    pub api_key: String,
    /// Timeout applied to each individual HTTP request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Retries for idempotent requests answered with a retriable status
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Backoff before the first retry, doubled on each subsequent one
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
}

impl ApiConfig {
    pub fn new(endpoint: Url, api_key: String) -> Self {
        ApiConfig {
            endpoint,
            api_key,
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.api_key.trim().is_empty() {
            return Err(ValidationError::EmptyApiKey);
        }

        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }

        if self.max_retries > MAX_RETRIES {
            return Err(ValidationError::TooManyRetries(self.max_retries));
        }

        match self.endpoint.scheme() {
            "http" | "https" => Ok(()),
            other => Err(ValidationError::UnsupportedScheme(other.to_string())),
        }
    }
}
