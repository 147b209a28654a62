//! reqwest-backed verification backend.

use async_trait::async_trait;
use passgate_core::SessionConfig;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::BackendError;
use crate::traits::{HealthReport, PersistRequest, VerificationBackend};

/// Longest error body kept in a `BackendError::Status`.
const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, Clone)]
pub struct HttpBackendConfig {
    pub health_url: String,
    pub verify_url: String,
    /// Per-request timeout for both calls.
    pub timeout: Duration,
    /// Extra headers sent with the health probe only.
    pub health_headers: BTreeMap<String, String>,
}

impl HttpBackendConfig {
    pub fn from_session_config(config: &SessionConfig, timeout: Duration) -> Self {
        Self {
            health_url: config.health_url(),
            verify_url: config.callback_endpoint(),
            timeout,
            health_headers: BTreeMap::new(),
        }
    }

    pub fn with_health_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.health_headers.insert(name.into(), value.into());
        self
    }
}

pub struct HttpBackend {
    client: Client,
    health_url: String,
    verify_url: String,
    health_headers: HeaderMap,
}

impl HttpBackend {
    pub fn new(config: HttpBackendConfig) -> Result<Self, BackendError> {
        let mut health_headers = HeaderMap::new();
        for (name, value) in &config.health_headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| BackendError::InvalidConfig(format!("header {:?}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| BackendError::InvalidConfig(format!("header {}: {}", name, e)))?;
            health_headers.insert(name, value);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BackendError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            client,
            health_url: config.health_url,
            verify_url: config.verify_url,
            health_headers,
        })
    }

    pub fn verify_url(&self) -> &str {
        &self.verify_url
    }
}

async fn status_error(resp: reqwest::Response) -> BackendError {
    let status = resp.status().as_u16();
    let mut body = resp.text().await.unwrap_or_default();
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    BackendError::Status { status, body }
}

#[async_trait]
impl VerificationBackend for HttpBackend {
    async fn check_health(&self) -> Result<HealthReport, BackendError> {
        let resp = self
            .client
            .get(&self.health_url)
            .headers(self.health_headers.clone())
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }

        let status = resp.status().as_u16();
        let body = resp.json::<serde_json::Value>().await.ok();
        Ok(HealthReport { status, body })
    }

    async fn persist(&self, request: &PersistRequest) -> Result<(), BackendError> {
        let resp = self
            .client
            .post(&self.verify_url)
            .json(request)
            .send()
            .await?;

        if resp.status().is_success() {
            tracing::debug!(
                session_id = %request.session_correlation_id,
                status = resp.status().as_u16(),
                "backend accepted verification"
            );
            Ok(())
        } else {
            Err(status_error(resp).await)
        }
    }
}
