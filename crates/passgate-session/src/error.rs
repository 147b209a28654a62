use passgate_core::{CoreError, LifecycleState};

/// Misuse of the orchestrator. Session failures are not errors: they are
/// recorded as `LifecycleState::Failed`.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("no session has been started")]
    NotStarted,

    #[error("session already started")]
    AlreadyStarted,

    #[error("retry is only allowed from a failed session, current state is {0}")]
    RetryNotAllowed(LifecycleState),

    #[error("no presentable request in state {0}")]
    NoActiveRequest(LifecycleState),

    #[error("could not allocate an unused session id after {0} attempts")]
    SessionIdsExhausted(usize),
}
