//! Upward notifications for presentation layers.

use passgate_core::{LifecycleState, PresentableRequest, SessionId, VerificationOutcome};
use serde::Serialize;

/// Something observable changed. Broadcast to every subscriber.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionUpdate {
    /// A session entered a new lifecycle state.
    StateChanged {
        session_id: SessionId,
        state: LifecycleState,
    },
    /// A new request replaced any previous one.
    RequestPublished { request: PresentableRequest },
    /// The request was handed to the prover.
    Presented { session_id: SessionId },
    /// Advisory backend reachability changed.
    Connectivity { reachable: bool },
    /// Terminal result of a session. Emitted once per session.
    Outcome { outcome: VerificationOutcome },
}

/// Default broadcast buffer.
pub(crate) const UPDATE_CHANNEL_CAPACITY: usize = 64;
