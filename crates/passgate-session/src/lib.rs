//! Passgate Session: the verification session orchestrator.
//!
//! One `Orchestrator` drives one logical session at a time:
//! - `SessionInitializer` builds the presentable request through the prover SDK
//! - `ConnectivityProber` checks backend health without gating the session
//! - `ResultReconciler` turns the prover callback into a final state,
//!   persisting successful proofs exactly once
//! - `RetryController` allocates never-before-used session ids for retries
//!
//! Every change is broadcast as a `SessionUpdate`.

pub mod error;
pub mod initializer;
pub mod orchestrator;
pub mod prober;
pub mod reconciler;
pub mod retry;
pub mod session;
pub mod updates;

pub use error::SessionError;
pub use initializer::SessionInitializer;
pub use orchestrator::Orchestrator;
pub use prober::ConnectivityProber;
pub use reconciler::{Reconciliation, ResultReconciler};
pub use retry::RetryController;
pub use session::{Session, SessionStatus};
pub use updates::SessionUpdate;
