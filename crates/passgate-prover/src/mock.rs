//! Mock prover for testing.

use async_trait::async_trait;
use passgate_core::{PresentableRequest, SessionId};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use crate::descriptor::SessionDescriptor;
use crate::error::ProverError;
use crate::traits::ProverSdk;

/// Scriptable prover. Builds `mock://request/<session id>` links and
/// records every session it was asked to build for.
pub struct MockProver {
    source: String,
    failing: AtomicBool,
    call_count: AtomicU32,
    built_for: Mutex<Vec<SessionId>>,
}

impl MockProver {
    pub fn new() -> Self {
        Self {
            source: "mock-prover".to_string(),
            failing: AtomicBool::new(false),
            call_count: AtomicU32::new(0),
            built_for: Mutex::new(Vec::new()),
        }
    }

    /// Make subsequent builds fail (or succeed again).
    pub fn with_failing(self, failing: bool) -> Self {
        self.set_failing(failing);
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of `build_request` calls.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Session ids of every successful build, in order.
    pub fn built_for(&self) -> Vec<SessionId> {
        self.built_for
            .lock()
            .map(|ids| ids.clone())
            .unwrap_or_default()
    }
}

impl Default for MockProver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProverSdk for MockProver {
    fn source_id(&self) -> &str {
        &self.source
    }

    async fn build_request(
        &self,
        descriptor: &SessionDescriptor,
    ) -> Result<PresentableRequest, ProverError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        if self.failing.load(Ordering::SeqCst) {
            return Err(ProverError::Unavailable("mock prover disabled".to_string()));
        }

        let id = descriptor.session_id.clone();
        if let Ok(mut ids) = self.built_for.lock() {
            ids.push(id.clone());
        }

        Ok(PresentableRequest {
            universal_link: format!("mock://request/{}", id),
            qr_payload: format!("{{\"sessionId\":\"{}\"}}", id),
            session_id: id,
        })
    }
}
