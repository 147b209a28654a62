use passgate_backend::VerificationBackend;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::updates::SessionUpdate;

/// Advisory backend reachability check.
///
/// Writes only the shared `reachable` flag; never touches lifecycle state.
#[derive(Clone)]
pub struct ConnectivityProber {
    backend: Arc<dyn VerificationBackend>,
    reachable: Arc<AtomicBool>,
    updates: broadcast::Sender<SessionUpdate>,
}

impl ConnectivityProber {
    pub fn new(
        backend: Arc<dyn VerificationBackend>,
        updates: broadcast::Sender<SessionUpdate>,
    ) -> Self {
        Self {
            backend,
            reachable: Arc::new(AtomicBool::new(false)),
            updates,
        }
    }

    /// Last known reachability. `false` until a probe succeeds.
    pub fn is_reachable(&self) -> bool {
        self.reachable.load(Ordering::SeqCst)
    }

    /// Probe once and record the result.
    pub async fn probe(&self) -> bool {
        let reachable = match self.backend.check_health().await {
            Ok(report) => {
                tracing::info!(
                    status = report.status,
                    body = ?report.body,
                    "backend reachable"
                );
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "backend not reachable");
                false
            }
        };

        self.reachable.store(reachable, Ordering::SeqCst);
        let _ = self.updates.send(SessionUpdate::Connectivity { reachable });
        reachable
    }

    /// Run `probe` on a background task.
    pub fn spawn(&self) -> JoinHandle<bool> {
        let prober = self.clone();
        tokio::spawn(async move { prober.probe().await })
    }
}
