use passgate_backend::{PersistRequest, VerificationBackend};
use passgate_core::{ProofResult, SessionEvent, VerificationOutcome};
use std::sync::Arc;

use crate::session::Session;

/// Final state change and outcome for one consumed proof result.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub event: SessionEvent,
    pub outcome: VerificationOutcome,
}

/// Resolves a prover result into a final session state.
///
/// A failed proof never reaches the backend. A successful proof is
/// persisted with exactly one backend call; its failure keeps
/// `verified = true` and records the persistence error.
pub struct ResultReconciler {
    backend: Arc<dyn VerificationBackend>,
    source: String,
    scope: String,
}

impl ResultReconciler {
    pub fn new(
        backend: Arc<dyn VerificationBackend>,
        source: impl Into<String>,
        scope: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            source: source.into(),
            scope: scope.into(),
        }
    }

    pub async fn reconcile(&self, session: &Session, result: ProofResult) -> Reconciliation {
        let session_id = session.id().clone();

        let claims = match result {
            ProofResult::Failed { error } => {
                tracing::warn!(session_id = %session_id, %error, "prover reported failed proof");
                return Reconciliation {
                    event: SessionEvent::ProofRejected(error),
                    outcome: VerificationOutcome::rejected(session_id, &self.source),
                };
            }
            ProofResult::Succeeded { claims } => claims,
        };

        let request = PersistRequest {
            session_correlation_id: session_id.clone(),
            claim_metadata: serde_json::json!({
                "scope": self.scope,
                "requested": session.policy().to_disclosures(),
                "disclosed": claims,
            }),
        };

        match self.backend.persist(&request).await {
            Ok(()) => {
                tracing::info!(session_id = %session_id, "verification persisted");
                Reconciliation {
                    event: SessionEvent::ProofPersisted,
                    outcome: VerificationOutcome::persisted(session_id, &self.source),
                }
            }
            Err(e) => {
                let detail = e.to_string();
                tracing::error!(
                    session_id = %session_id,
                    error = %detail,
                    "proof verified but not persisted"
                );
                Reconciliation {
                    event: SessionEvent::PersistenceFailed(detail.clone()),
                    outcome: VerificationOutcome::unpersisted(session_id, &self.source, detail),
                }
            }
        }
    }
}
