use passgate_core::{SessionId, SessionIdGenerator};
use std::collections::HashSet;
use std::sync::Arc;

use crate::error::SessionError;

/// Draws before giving up on finding an unused id.
const MAX_ID_ATTEMPTS: usize = 16;

/// Allocates session ids, never handing out one that was already used by
/// this orchestrator.
pub struct RetryController {
    ids: Arc<dyn SessionIdGenerator>,
    used: HashSet<SessionId>,
    attempts: u32,
}

impl RetryController {
    pub fn new(ids: Arc<dyn SessionIdGenerator>) -> Self {
        Self {
            ids,
            used: HashSet::new(),
            attempts: 0,
        }
    }

    /// Allocate a fresh id and count a new attempt.
    pub fn allocate(&mut self) -> Result<SessionId, SessionError> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = self.ids.generate();
            if self.used.insert(id.clone()) {
                self.attempts += 1;
                return Ok(id);
            }
            tracing::warn!(session_id = %id, "generator returned a used session id");
        }
        Err(SessionError::SessionIdsExhausted(MAX_ID_ATTEMPTS))
    }

    /// Number of ids allocated so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn is_used(&self, id: &SessionId) -> bool {
        self.used.contains(id)
    }
}
