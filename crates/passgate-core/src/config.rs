use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::CoreError;
use crate::policy::{AppIdentity, DisclosurePolicy};

/// Static configuration of a verification session, supplied once when the
/// orchestrator is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Base URL of the verification backend.
    pub backend_url: String,
    /// Path the prover posts proofs to, relative to `backend_url`.
    pub verify_path: String,
    /// Health surface, relative to `backend_url`.
    pub health_path: String,
    /// Requesting application.
    pub app: AppIdentity,
    /// What the session asks the holder to prove.
    pub policy: DisclosurePolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:3000".into(),
            verify_path: "/verify".into(),
            health_path: "/health".into(),
            app: AppIdentity::default(),
            policy: DisclosurePolicy::default(),
        }
    }
}

impl SessionConfig {
    /// Endpoint embedded in the request descriptor; the prover delivers
    /// proofs there.
    pub fn callback_endpoint(&self) -> String {
        join_url(&self.backend_url, &self.verify_path)
    }

    pub fn health_url(&self) -> String {
        join_url(&self.backend_url, &self.health_path)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        for (name, value) in [
            ("backend_url", self.backend_url.clone()),
            ("callback endpoint", self.callback_endpoint()),
            ("health url", self.health_url()),
        ] {
            check_http_url(name, &value)?;
        }
        self.app.validate()?;
        self.policy.validate()
    }
}

fn check_http_url(name: &str, value: &str) -> Result<(), CoreError> {
    let url = Url::parse(value).map_err(|e| {
        CoreError::ValidationError(format!("{} is not a valid URL ({:?}): {}", name, value, e))
    })?;
    match url.scheme() {
        "http" | "https" if url.host().is_some() => Ok(()),
        _ => Err(CoreError::ValidationError(format!(
            "{} must be an http(s) URL with a host, got: {}",
            name, value
        ))),
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
