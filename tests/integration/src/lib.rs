//! Fixtures shared by the cross-crate scenario tests.

use passgate_backend::MockBackend;
use passgate_core::{DisclosurePolicy, LifecycleState, SequentialSessionIds, SessionConfig};
use passgate_prover::MockProver;
use passgate_session::{Orchestrator, SessionUpdate};
use std::sync::Arc;
use tokio::sync::broadcast;

/// An orchestrator wired to scriptable mocks, with handles kept for assertions.
pub struct MockedSession {
    pub orchestrator: Orchestrator,
    pub prover: Arc<MockProver>,
    pub backend: Arc<MockBackend>,
}

impl MockedSession {
    /// Sessions are numbered `S1`, `S2`, ... and ask for `minimum_age`.
    pub fn new(backend: MockBackend, minimum_age: u8) -> Self {
        let config = SessionConfig {
            policy: DisclosurePolicy::minimum_age(minimum_age),
            ..Default::default()
        };
        let prover = Arc::new(MockProver::new());
        let backend = Arc::new(backend);
        let orchestrator = Orchestrator::new(
            config,
            prover.clone(),
            backend.clone(),
            Arc::new(SequentialSessionIds::new("S")),
        )
        .expect("default session config is valid");
        Self {
            orchestrator,
            prover,
            backend,
        }
    }
}

/// Every update currently buffered on `rx`.
pub fn drain(rx: &mut broadcast::Receiver<SessionUpdate>) -> Vec<SessionUpdate> {
    let mut updates = Vec::new();
    while let Ok(update) = rx.try_recv() {
        updates.push(update);
    }
    updates
}

/// The lifecycle states among `updates`, in order.
pub fn states(updates: &[SessionUpdate]) -> Vec<LifecycleState> {
    updates
        .iter()
        .filter_map(|u| match u {
            SessionUpdate::StateChanged { state, .. } => Some(state.clone()),
            _ => None,
        })
        .collect()
}
