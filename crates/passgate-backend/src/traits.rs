use async_trait::async_trait;
use passgate_core::SessionId;
use serde::{Deserialize, Serialize};

use crate::error::BackendError;

/// Body of the persistence call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistRequest {
    pub session_correlation_id: SessionId,
    pub claim_metadata: serde_json::Value,
}

/// What a successful health probe saw.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthReport {
    pub status: u16,
    /// Response body, when it was JSON.
    pub body: Option<serde_json::Value>,
}

/// Verification backend interface.
#[async_trait]
pub trait VerificationBackend: Send + Sync {
    /// Probe the health surface. Any 2xx is reachable.
    async fn check_health(&self) -> Result<HealthReport, BackendError>;

    /// Durably record a verified proof. Called at most once per session.
    async fn persist(&self, request: &PersistRequest) -> Result<(), BackendError>;
}
