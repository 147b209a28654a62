use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Why a session ended in [`LifecycleState::Failed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The prover SDK could not build a presentable request.
    Initialization,
    /// The prover rejected the proof or the user aborted on the wallet side.
    Proof,
    /// The proof was valid but the backend did not durably record it.
    Persistence,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initialization => write!(f, "initialization"),
            Self::Proof => write!(f, "proof"),
            Self::Persistence => write!(f, "persistence"),
        }
    }
}

/// The states of a verification session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LifecycleState {
    /// A fresh session id is allocated and the request is being built.
    Initializing,
    /// The request is published; waiting for the prover callback.
    AwaitingProof,
    /// Proof accepted and persisted. Final state.
    Succeeded,
    /// The session failed. Only retry leaves this state.
    Failed { reason: FailureReason, detail: String },
}

impl LifecycleState {
    /// Whether this state ends the current session.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed { .. })
    }

    /// Whether a retry may be issued from this state.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// The failure reason, if the session failed.
    pub fn failure_reason(&self) -> Option<FailureReason> {
        match self {
            Self::Failed { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initializing => write!(f, "Initializing"),
            Self::AwaitingProof => write!(f, "AwaitingProof"),
            Self::Succeeded => write!(f, "Succeeded"),
            Self::Failed { reason, .. } => write!(f, "Failed({})", reason),
        }
    }
}

/// Events that drive session state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The prover SDK produced a presentable request.
    RequestPublished,
    /// The prover SDK failed to build a request.
    InitializationFailed(String),
    /// The prover reported success and the backend accepted the result.
    ProofPersisted,
    /// The prover reported a failed proof.
    ProofRejected(String),
    /// The prover reported success but persistence failed.
    PersistenceFailed(String),
    /// The user asked for a fresh attempt.
    Retry,
}

impl SessionEvent {
    fn name(&self) -> &'static str {
        match self {
            Self::RequestPublished => "RequestPublished",
            Self::InitializationFailed(_) => "InitializationFailed",
            Self::ProofPersisted => "ProofPersisted",
            Self::ProofRejected(_) => "ProofRejected",
            Self::PersistenceFailed(_) => "PersistenceFailed",
            Self::Retry => "Retry",
        }
    }
}

/// Manages session state transitions.
///
/// Valid transitions:
/// - Initializing → AwaitingProof (RequestPublished)
/// - Initializing → Failed(initialization) (InitializationFailed)
/// - AwaitingProof → Succeeded (ProofPersisted)
/// - AwaitingProof → Failed(proof) (ProofRejected)
/// - AwaitingProof → Failed(persistence) (PersistenceFailed)
/// - Failed → Initializing (Retry)
pub struct SessionStateMachine;

impl SessionStateMachine {
    /// Attempt a state transition based on an event.
    pub fn transition(
        current: &LifecycleState,
        event: SessionEvent,
    ) -> Result<LifecycleState, CoreError> {
        let event_name = event.name();
        let new_state = match (current, event) {
            (LifecycleState::Initializing, SessionEvent::RequestPublished) => {
                LifecycleState::AwaitingProof
            }
            (LifecycleState::Initializing, SessionEvent::InitializationFailed(detail)) => {
                LifecycleState::Failed {
                    reason: FailureReason::Initialization,
                    detail,
                }
            }

            (LifecycleState::AwaitingProof, SessionEvent::ProofPersisted) => {
                LifecycleState::Succeeded
            }
            (LifecycleState::AwaitingProof, SessionEvent::ProofRejected(detail)) => {
                LifecycleState::Failed {
                    reason: FailureReason::Proof,
                    detail,
                }
            }
            (LifecycleState::AwaitingProof, SessionEvent::PersistenceFailed(detail)) => {
                LifecycleState::Failed {
                    reason: FailureReason::Persistence,
                    detail,
                }
            }

            (LifecycleState::Failed { .. }, SessionEvent::Retry) => LifecycleState::Initializing,

            _ => {
                return Err(CoreError::InvalidStateTransition {
                    from: current.clone(),
                    event: event_name,
                });
            }
        };

        tracing::debug!(
            from = %current,
            to = %new_state,
            event = event_name,
            "session state transition"
        );

        Ok(new_state)
    }

    /// Check if a transition is valid without performing it.
    pub fn can_transition(current: &LifecycleState, event: SessionEvent) -> bool {
        Self::transition(current, event).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed(reason: FailureReason) -> LifecycleState {
        LifecycleState::Failed {
            reason,
            detail: "boom".into(),
        }
    }

    #[test]
    fn test_happy_path() {
        let s = LifecycleState::Initializing;
        let s = SessionStateMachine::transition(&s, SessionEvent::RequestPublished).unwrap();
        assert_eq!(s, LifecycleState::AwaitingProof);
        let s = SessionStateMachine::transition(&s, SessionEvent::ProofPersisted).unwrap();
        assert_eq!(s, LifecycleState::Succeeded);
        assert!(s.is_terminal());
        assert!(!s.is_retryable());
    }

    #[test]
    fn test_initialization_failure() {
        let s = SessionStateMachine::transition(
            &LifecycleState::Initializing,
            SessionEvent::InitializationFailed("sdk unavailable".into()),
        )
        .unwrap();
        assert_eq!(s.failure_reason(), Some(FailureReason::Initialization));
        assert!(s.is_retryable());
    }

    #[test]
    fn test_proof_rejected() {
        let s = SessionStateMachine::transition(
            &LifecycleState::AwaitingProof,
            SessionEvent::ProofRejected("user declined".into()),
        )
        .unwrap();
        assert_eq!(
            s,
            LifecycleState::Failed {
                reason: FailureReason::Proof,
                detail: "user declined".into()
            }
        );
    }

    #[test]
    fn test_persistence_failure_is_distinct_from_proof_failure() {
        let s = SessionStateMachine::transition(
            &LifecycleState::AwaitingProof,
            SessionEvent::PersistenceFailed("HTTP 503".into()),
        )
        .unwrap();
        assert_eq!(s.failure_reason(), Some(FailureReason::Persistence));
        assert_ne!(s.failure_reason(), Some(FailureReason::Proof));
    }

    #[test]
    fn test_retry_from_each_failure() {
        for reason in [
            FailureReason::Initialization,
            FailureReason::Proof,
            FailureReason::Persistence,
        ] {
            let s = SessionStateMachine::transition(&failed(reason), SessionEvent::Retry).unwrap();
            assert_eq!(s, LifecycleState::Initializing);
        }
    }

    #[test]
    fn test_succeeded_is_final() {
        for event in [
            SessionEvent::Retry,
            SessionEvent::RequestPublished,
            SessionEvent::ProofPersisted,
            SessionEvent::ProofRejected("late".into()),
        ] {
            assert!(!SessionStateMachine::can_transition(
                &LifecycleState::Succeeded,
                event
            ));
        }
    }

    #[test]
    fn test_cannot_skip_awaiting_proof() {
        let result = SessionStateMachine::transition(
            &LifecycleState::Initializing,
            SessionEvent::ProofPersisted,
        );
        assert!(matches!(
            result,
            Err(CoreError::InvalidStateTransition {
                event: "ProofPersisted",
                ..
            })
        ));
        assert!(!SessionStateMachine::can_transition(
            &LifecycleState::Initializing,
            SessionEvent::ProofRejected("x".into())
        ));
    }

    #[test]
    fn test_cannot_retry_while_active() {
        assert!(!SessionStateMachine::can_transition(
            &LifecycleState::Initializing,
            SessionEvent::Retry
        ));
        assert!(!SessionStateMachine::can_transition(
            &LifecycleState::AwaitingProof,
            SessionEvent::Retry
        ));
    }

    #[test]
    fn test_failed_does_not_accept_proof_events() {
        assert!(!SessionStateMachine::can_transition(
            &failed(FailureReason::Proof),
            SessionEvent::ProofPersisted
        ));
        assert!(!SessionStateMachine::can_transition(
            &failed(FailureReason::Persistence),
            SessionEvent::PersistenceFailed("again".into())
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(LifecycleState::Initializing.to_string(), "Initializing");
        assert_eq!(LifecycleState::AwaitingProof.to_string(), "AwaitingProof");
        assert_eq!(
            failed(FailureReason::Persistence).to_string(),
            "Failed(persistence)"
        );
    }

    #[test]
    fn test_serde_tagged_representation() {
        let json = serde_json::to_value(failed(FailureReason::Proof)).unwrap();
        assert_eq!(json["state"], "failed");
        assert_eq!(json["reason"], "proof");
        assert_eq!(json["detail"], "boom");

        let back: LifecycleState =
            serde_json::from_value(serde_json::json!({"state": "awaiting_proof"})).unwrap();
        assert_eq!(back, LifecycleState::AwaitingProof);
    }
}
