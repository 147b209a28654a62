//! Mock verification backend for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicU32, Ordering};
use std::sync::Mutex;

use crate::error::BackendError;
use crate::traits::{HealthReport, PersistRequest, VerificationBackend};

/// Backend with configurable health and persistence responses.
///
/// `persist_status` is the HTTP status persistence answers with; `0`
/// simulates a network failure.
pub struct MockBackend {
    healthy: AtomicBool,
    persist_status: AtomicU16,
    health_calls: AtomicU32,
    persist_calls: AtomicU32,
    persisted: Mutex<Vec<PersistRequest>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            healthy: AtomicBool::new(true),
            persist_status: AtomicU16::new(200),
            health_calls: AtomicU32::new(0),
            persist_calls: AtomicU32::new(0),
            persisted: Mutex::new(Vec::new()),
        }
    }

    pub fn with_healthy(self, healthy: bool) -> Self {
        self.healthy.store(healthy, Ordering::SeqCst);
        self
    }

    pub fn with_persist_status(self, status: u16) -> Self {
        self.set_persist_status(status);
        self
    }

    pub fn set_persist_status(&self, status: u16) {
        self.persist_status.store(status, Ordering::SeqCst);
    }

    pub fn health_calls(&self) -> u32 {
        self.health_calls.load(Ordering::SeqCst)
    }

    pub fn persist_calls(&self) -> u32 {
        self.persist_calls.load(Ordering::SeqCst)
    }

    /// Requests the backend accepted.
    pub fn persisted(&self) -> Vec<PersistRequest> {
        self.persisted
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VerificationBackend for MockBackend {
    async fn check_health(&self) -> Result<HealthReport, BackendError> {
        self.health_calls.fetch_add(1, Ordering::SeqCst);
        if self.healthy.load(Ordering::SeqCst) {
            Ok(HealthReport {
                status: 200,
                body: Some(serde_json::json!({ "status": "ok" })),
            })
        } else {
            Err(BackendError::Network("mock backend unreachable".into()))
        }
    }

    async fn persist(&self, request: &PersistRequest) -> Result<(), BackendError> {
        self.persist_calls.fetch_add(1, Ordering::SeqCst);
        match self.persist_status.load(Ordering::SeqCst) {
            0 => Err(BackendError::Network("mock connection refused".into())),
            status @ 200..=299 => {
                if let Ok(mut p) = self.persisted.lock() {
                    p.push(request.clone());
                }
                tracing::debug!(status, "mock backend persisted request");
                Ok(())
            }
            status => Err(BackendError::Status {
                status,
                body: "mock backend rejected".into(),
            }),
        }
    }
}
