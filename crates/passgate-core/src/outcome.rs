use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::SessionId;

/// Result reported by the prover for one presented request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProofResult {
    /// The wallet produced a valid proof.
    Succeeded {
        /// Metadata about the disclosed claims, forwarded to the backend.
        #[serde(default)]
        claims: serde_json::Value,
    },
    /// The wallet rejected the request or the proof failed.
    Failed { error: String },
}

/// A single-shot callback from the prover, tagged with the session it
/// belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofEvent {
    pub session_id: SessionId,
    #[serde(flatten)]
    pub result: ProofResult,
}

impl ProofEvent {
    pub fn succeeded(session_id: SessionId, claims: serde_json::Value) -> Self {
        Self {
            session_id,
            result: ProofResult::Succeeded { claims },
        }
    }

    pub fn failed(session_id: SessionId, error: impl Into<String>) -> Self {
        Self {
            session_id,
            result: ProofResult::Failed {
                error: error.into(),
            },
        }
    }
}

/// Immutable record of how a session ended. Produced once per session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationOutcome {
    pub session_id: SessionId,
    /// Whether the identity claim was proven.
    pub verified: bool,
    pub timestamp: DateTime<Utc>,
    /// Which prover produced the result.
    pub source: String,
    /// Set when the proof was valid but the backend did not record it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persistence_error: Option<String>,
}

impl VerificationOutcome {
    /// Proof valid and durably recorded.
    pub fn persisted(session_id: SessionId, source: impl Into<String>) -> Self {
        Self {
            session_id,
            verified: true,
            timestamp: Utc::now(),
            source: source.into(),
            persistence_error: None,
        }
    }

    /// Proof valid but the backend did not record it.
    pub fn unpersisted(
        session_id: SessionId,
        source: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            persistence_error: Some(error.into()),
            ..Self::persisted(session_id, source)
        }
    }

    /// The prover did not produce a valid proof.
    pub fn rejected(session_id: SessionId, source: impl Into<String>) -> Self {
        Self {
            session_id,
            verified: false,
            timestamp: Utc::now(),
            source: source.into(),
            persistence_error: None,
        }
    }

    /// Verified and recorded by the backend.
    pub fn is_durable(&self) -> bool {
        self.verified && self.persistence_error.is_none()
    }
}
