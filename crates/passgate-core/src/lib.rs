//! Passgate Core: Fundamental types, errors, and the session lifecycle
//! state machine shared by every Passgate crate.

pub mod config;
pub mod error;
pub mod outcome;
pub mod policy;
pub mod session_state;
pub mod types;

pub use config::SessionConfig;
pub use error::CoreError;
pub use outcome::{ProofEvent, ProofResult, VerificationOutcome};
pub use policy::{AppIdentity, DisclosurePolicy, EndpointType, UserIdType};
pub use session_state::{FailureReason, LifecycleState, SessionEvent, SessionStateMachine};
pub use types::{
    HexSessionIds, PresentableRequest, SequentialSessionIds, SessionId, SessionIdGenerator,
    UuidSessionIds,
};
