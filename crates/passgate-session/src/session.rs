use passgate_core::{
    DisclosurePolicy, LifecycleState, PresentableRequest, SessionEvent, SessionId,
    SessionStateMachine, VerificationOutcome,
};
use serde::Serialize;

use crate::error::SessionError;

/// One verification attempt. Superseded, never reused, on retry.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    policy: DisclosurePolicy,
    state: LifecycleState,
    request: Option<PresentableRequest>,
    presented: bool,
    proof_consumed: bool,
    outcome: Option<VerificationOutcome>,
}

impl Session {
    pub fn new(id: SessionId, policy: DisclosurePolicy) -> Self {
        Self {
            id,
            policy,
            state: LifecycleState::Initializing,
            request: None,
            presented: false,
            proof_consumed: false,
            outcome: None,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn policy(&self) -> &DisclosurePolicy {
        &self.policy
    }

    pub fn state(&self) -> &LifecycleState {
        &self.state
    }

    /// The request, only while the session is awaiting proof.
    pub fn request(&self) -> Option<&PresentableRequest> {
        self.request.as_ref()
    }

    pub fn presented(&self) -> bool {
        self.presented
    }

    pub fn outcome(&self) -> Option<&VerificationOutcome> {
        self.outcome.as_ref()
    }

    /// Whether the prover callback for this session was already taken.
    pub fn proof_consumed(&self) -> bool {
        self.proof_consumed
    }

    pub(crate) fn apply(&mut self, event: SessionEvent) -> Result<&LifecycleState, SessionError> {
        self.state = SessionStateMachine::transition(&self.state, event)?;
        Ok(&self.state)
    }

    /// Publish the request and move to `AwaitingProof`.
    pub(crate) fn publish(&mut self, request: PresentableRequest) -> Result<(), SessionError> {
        self.apply(SessionEvent::RequestPublished)?;
        self.request = Some(request);
        Ok(())
    }

    pub(crate) fn mark_presented(&mut self) {
        self.presented = true;
    }

    pub(crate) fn consume_proof(&mut self) {
        self.proof_consumed = true;
    }

    /// Record the terminal outcome. The request is no longer honored.
    pub(crate) fn finish(
        &mut self,
        event: SessionEvent,
        outcome: VerificationOutcome,
    ) -> Result<(), SessionError> {
        self.apply(event)?;
        self.request = None;
        self.outcome = Some(outcome);
        Ok(())
    }
}

/// Read-only view of the orchestrator for display.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub session_id: SessionId,
    /// 1 for the first session, incremented by each retry.
    pub attempt: u32,
    #[serde(flatten)]
    pub state: LifecycleState,
    pub backend_reachable: bool,
    pub request: Option<PresentableRequest>,
    pub presented: bool,
    pub outcome: Option<VerificationOutcome>,
}
