//! Commands dispatched from the HTTP API to the node event loop.

use passgate_core::{PresentableRequest, ProofEvent, VerificationOutcome};
use passgate_session::{SessionError, SessionStatus};
use serde::Serialize;
use tokio::sync::oneshot;

/// A command sent from the HTTP API to the node's main event loop.
pub enum NodeCommand {
    /// Hand the active request to the prover.
    Present {
        reply: oneshot::Sender<Result<PresentableRequest, CommandError>>,
    },
    /// Start a fresh session after a failure.
    Retry {
        reply: oneshot::Sender<Result<SessionStatus, CommandError>>,
    },
    /// Deliver a prover callback.
    DeliverProof {
        event: ProofEvent,
        reply: oneshot::Sender<Result<CallbackResponse, CommandError>>,
    },
}

/// Response after a prover callback was delivered.
#[derive(Debug, Clone, Serialize)]
pub struct CallbackResponse {
    /// `false` when the callback was stale or a duplicate.
    pub accepted: bool,
    pub outcome: Option<VerificationOutcome>,
}

/// Why the event loop refused a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Not allowed in the current session state.
    Conflict(String),
    /// The command itself was malformed.
    Invalid(String),
    Internal(String),
}

impl CommandError {
    pub fn message(&self) -> &str {
        match self {
            Self::Conflict(m) | Self::Invalid(m) | Self::Internal(m) => m,
        }
    }
}

impl From<SessionError> for CommandError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::NotStarted
            | SessionError::AlreadyStarted
            | SessionError::RetryNotAllowed(_)
            | SessionError::NoActiveRequest(_) => Self::Conflict(e.to_string()),
            SessionError::Core(_) => Self::Invalid(e.to_string()),
            SessionError::SessionIdsExhausted(_) => Self::Internal(e.to_string()),
        }
    }
}
