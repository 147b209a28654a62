//! Integration test: full verification session lifecycle across crates.
//!
//! Drives the orchestrator from passgate-session against the mock prover
//! and mock backend, covering success, persistence failure with retry,
//! rejected proofs and late callbacks.

use passgate_backend::MockBackend;
use passgate_core::{FailureReason, LifecycleState, ProofEvent, SessionId};
use passgate_integration_tests::{drain, states, MockedSession};
use passgate_session::SessionUpdate;
use serde_json::json;

fn sid(s: &str) -> SessionId {
    SessionId::new(s).expect("valid session id")
}

// =========================================================================
// Happy path
// =========================================================================

#[tokio::test]
async fn test_verified_and_persisted() {
    let mut s = MockedSession::new(MockBackend::new(), 18);
    let mut rx = s.orchestrator.subscribe();

    assert_eq!(
        s.orchestrator.start().await.unwrap(),
        LifecycleState::AwaitingProof
    );
    let request = s.orchestrator.present().unwrap();
    assert_eq!(request.session_id, sid("S1"));

    let outcome = s
        .orchestrator
        .handle_proof_event(ProofEvent::succeeded(
            sid("S1"),
            json!({ "nationality": "FRA", "olderThan": 18 }),
        ))
        .await
        .unwrap()
        .expect("outcome emitted");

    assert!(outcome.verified);
    assert_eq!(outcome.session_id, sid("S1"));
    assert!(outcome.persistence_error.is_none());
    assert_eq!(s.orchestrator.state(), Some(&LifecycleState::Succeeded));

    // One persistence call, correlated with the session.
    assert_eq!(s.backend.persist_calls(), 1);
    let persisted = s.backend.persisted();
    assert_eq!(persisted[0].session_correlation_id, sid("S1"));
    assert_eq!(persisted[0].claim_metadata["requested"]["minimumAge"], 18);
    assert_eq!(persisted[0].claim_metadata["disclosed"]["nationality"], "FRA");

    let updates = drain(&mut rx);
    assert_eq!(
        states(&updates),
        vec![
            LifecycleState::Initializing,
            LifecycleState::AwaitingProof,
            LifecycleState::Succeeded,
        ]
    );
    assert!(updates
        .iter()
        .any(|u| matches!(u, SessionUpdate::Presented { session_id } if session_id == &sid("S1"))));
    let outcomes: Vec<_> = updates
        .iter()
        .filter(|u| matches!(u, SessionUpdate::Outcome { .. }))
        .collect();
    assert_eq!(outcomes.len(), 1);
}

// =========================================================================
// Persistence failure, then retry
// =========================================================================

#[tokio::test]
async fn test_persistence_failure_then_retry() {
    let mut s = MockedSession::new(MockBackend::new().with_persist_status(503), 18);
    s.orchestrator.start().await.unwrap();

    let outcome = s
        .orchestrator
        .handle_proof_event(ProofEvent::succeeded(sid("S1"), json!({})))
        .await
        .unwrap()
        .unwrap();

    // The identity claim was proven; only the record is missing.
    assert!(outcome.verified);
    assert!(outcome
        .persistence_error
        .as_deref()
        .is_some_and(|e| e.contains("503")));
    let state = s.orchestrator.state().unwrap().clone();
    assert_eq!(state.failure_reason(), Some(FailureReason::Persistence));

    // The backend recovers; the retry is a brand new session.
    s.backend.set_persist_status(200);
    assert_eq!(
        s.orchestrator.retry().await.unwrap(),
        LifecycleState::AwaitingProof
    );
    let status = s.orchestrator.status().unwrap();
    assert_eq!(status.session_id, sid("S2"));
    assert_ne!(status.session_id, sid("S1"));
    assert!(status.outcome.is_none());
    assert_eq!(status.request.unwrap().session_id, sid("S2"));

    let outcome = s
        .orchestrator
        .handle_proof_event(ProofEvent::succeeded(sid("S2"), json!({})))
        .await
        .unwrap()
        .unwrap();
    assert!(outcome.is_durable());
    assert_eq!(s.orchestrator.state(), Some(&LifecycleState::Succeeded));
    assert_eq!(s.backend.persist_calls(), 2);
    assert_eq!(s.prover.built_for(), vec![sid("S1"), sid("S2")]);
}

#[tokio::test]
async fn test_network_failure_is_persistence_failure() {
    let mut s = MockedSession::new(MockBackend::new().with_persist_status(0), 21);
    s.orchestrator.start().await.unwrap();
    let outcome = s
        .orchestrator
        .handle_proof_event(ProofEvent::succeeded(sid("S1"), json!({})))
        .await
        .unwrap()
        .unwrap();
    assert!(outcome.verified);
    assert!(!outcome.is_durable());
    assert_eq!(
        s.orchestrator.state().unwrap().failure_reason(),
        Some(FailureReason::Persistence)
    );
}

// =========================================================================
// Rejected proofs
// =========================================================================

#[tokio::test]
async fn test_rejected_proof_never_reaches_backend() {
    let mut s = MockedSession::new(MockBackend::new(), 18);
    s.orchestrator.start().await.unwrap();

    let outcome = s
        .orchestrator
        .handle_proof_event(ProofEvent::failed(sid("S1"), "holder is under 18"))
        .await
        .unwrap()
        .unwrap();

    assert!(!outcome.verified);
    assert_eq!(s.backend.persist_calls(), 0);
    assert_eq!(
        s.orchestrator.state(),
        Some(&LifecycleState::Failed {
            reason: FailureReason::Proof,
            detail: "holder is under 18".into(),
        })
    );
    assert!(s.orchestrator.session().unwrap().request().is_none());
}

// =========================================================================
// Late and duplicate callbacks
// =========================================================================

#[tokio::test]
async fn test_late_callback_for_superseded_session() {
    let mut s = MockedSession::new(MockBackend::new(), 18);
    s.orchestrator.start().await.unwrap();
    s.orchestrator.connectivity_settled().await;
    s.orchestrator
        .handle_proof_event(ProofEvent::failed(sid("S1"), "timeout"))
        .await
        .unwrap();
    s.orchestrator.retry().await.unwrap();

    let mut rx = s.orchestrator.subscribe();
    let ignored = s
        .orchestrator
        .handle_proof_event(ProofEvent::succeeded(sid("S1"), json!({})))
        .await
        .unwrap();

    assert!(ignored.is_none());
    assert_eq!(s.orchestrator.state(), Some(&LifecycleState::AwaitingProof));
    assert_eq!(s.orchestrator.session().unwrap().id(), &sid("S2"));
    assert_eq!(s.backend.persist_calls(), 0);
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn test_second_callback_is_dropped() {
    let mut s = MockedSession::new(MockBackend::new(), 18);
    s.orchestrator.start().await.unwrap();

    let first = s
        .orchestrator
        .handle_proof_event(ProofEvent::failed(sid("S1"), "declined"))
        .await
        .unwrap();
    let second = s
        .orchestrator
        .handle_proof_event(ProofEvent::succeeded(sid("S1"), json!({})))
        .await
        .unwrap();

    assert!(first.is_some());
    assert!(second.is_none());
    assert_eq!(
        s.orchestrator.state().unwrap().failure_reason(),
        Some(FailureReason::Proof)
    );
    assert_eq!(s.backend.persist_calls(), 0);
}

// =========================================================================
// Initialization failure and connectivity
// =========================================================================

#[tokio::test]
async fn test_initialization_failure_exposes_no_request() {
    let mut s = MockedSession::new(MockBackend::new(), 18);
    s.prover.set_failing(true);

    let state = s.orchestrator.start().await.unwrap();
    assert_eq!(state.failure_reason(), Some(FailureReason::Initialization));
    assert!(s.orchestrator.status().unwrap().request.is_none());
    assert!(s.orchestrator.present().is_err());

    s.prover.set_failing(false);
    assert_eq!(
        s.orchestrator.retry().await.unwrap(),
        LifecycleState::AwaitingProof
    );
    assert_eq!(s.orchestrator.status().unwrap().attempt, 2);
}

#[tokio::test]
async fn test_unreachable_backend_is_advisory() {
    let mut s = MockedSession::new(MockBackend::new().with_healthy(false), 18);
    s.orchestrator.start().await.unwrap();
    assert!(!s.orchestrator.connectivity_settled().await);

    // The session carries on and still persists through the backend.
    let outcome = s
        .orchestrator
        .handle_proof_event(ProofEvent::succeeded(sid("S1"), json!({})))
        .await
        .unwrap()
        .unwrap();
    assert!(outcome.is_durable());
    assert!(!s.orchestrator.status().unwrap().backend_reachable);
}
