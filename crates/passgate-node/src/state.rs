//! Shared node state for cross-task communication.

use passgate_core::VerificationOutcome;
use passgate_session::SessionStatus;
use std::sync::RwLock;
use std::time::Instant;
use tokio::sync::mpsc;

use crate::commands::NodeCommand;

/// Shared state for the running node, accessible from HTTP handlers.
///
/// The event loop owns the orchestrator; handlers only read the snapshots
/// kept here and send `NodeCommand`s for anything that mutates.
pub struct NodeState {
    /// When the node started.
    pub start_time: Instant,
    /// Latest session snapshot (updated by the event loop).
    status: RwLock<Option<SessionStatus>>,
    /// Most recent outcome, kept across retries.
    last_outcome: RwLock<Option<VerificationOutcome>>,
    /// Channel to send commands to the event loop.
    pub command_tx: mpsc::Sender<NodeCommand>,
}

impl NodeState {
    pub fn new(command_tx: mpsc::Sender<NodeCommand>) -> Self {
        Self {
            start_time: Instant::now(),
            status: RwLock::new(None),
            last_outcome: RwLock::new(None),
            command_tx,
        }
    }

    pub fn set_status(&self, status: Option<SessionStatus>) {
        if let Ok(mut s) = self.status.write() {
            *s = status;
        }
    }

    pub fn status(&self) -> Option<SessionStatus> {
        self.status.read().ok().and_then(|s| s.clone())
    }

    pub fn backend_reachable(&self) -> bool {
        self.status()
            .map(|s| s.backend_reachable)
            .unwrap_or(false)
    }

    pub fn record_outcome(&self, outcome: VerificationOutcome) {
        if let Ok(mut o) = self.last_outcome.write() {
            *o = Some(outcome);
        }
    }

    pub fn last_outcome(&self) -> Option<VerificationOutcome> {
        self.last_outcome.read().ok().and_then(|o| o.clone())
    }
}
