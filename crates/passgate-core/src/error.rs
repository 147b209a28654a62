use crate::session_state::LifecycleState;

/// Core protocol errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid state transition from {from} on {event}")]
    InvalidStateTransition {
        from: LifecycleState,
        event: &'static str,
    },

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("invalid session id: {0}")]
    InvalidSessionId(String),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("missing required field: {0}")]
    MissingField(String),
}
