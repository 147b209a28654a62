//! The verification session orchestrator.
//!
//! Owns the current `Session` and is driven by four entry points:
//! `start`, `present`, `handle_proof_event` and `retry`. All of them take
//! `&mut self`, so at most one initialization and at most one persistence
//! call are ever in flight. Only the connectivity probe runs on its own
//! task, and it writes nothing but the advisory reachability flag.

use passgate_backend::VerificationBackend;
use passgate_core::{
    LifecycleState, PresentableRequest, ProofEvent, SessionConfig, SessionEvent,
    SessionIdGenerator, SessionStateMachine, VerificationOutcome,
};
use passgate_prover::ProverSdk;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::error::SessionError;
use crate::initializer::SessionInitializer;
use crate::prober::ConnectivityProber;
use crate::reconciler::ResultReconciler;
use crate::retry::RetryController;
use crate::session::{Session, SessionStatus};
use crate::updates::{SessionUpdate, UPDATE_CHANNEL_CAPACITY};

pub struct Orchestrator {
    config: Arc<SessionConfig>,
    initializer: SessionInitializer,
    prober: ConnectivityProber,
    reconciler: ResultReconciler,
    retry: RetryController,
    /// The active session; replaced wholesale on retry.
    session: Option<Session>,
    probe_task: Option<JoinHandle<bool>>,
    updates: broadcast::Sender<SessionUpdate>,
}

impl Orchestrator {
    pub fn new(
        config: SessionConfig,
        prover: Arc<dyn ProverSdk>,
        backend: Arc<dyn VerificationBackend>,
        ids: Arc<dyn SessionIdGenerator>,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let config = Arc::new(config);
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);

        let reconciler = ResultReconciler::new(
            backend.clone(),
            prover.source_id(),
            config.app.scope.clone(),
        );

        tracing::info!(
            app = %config.app.app_name,
            scope = %config.app.scope,
            backend = %config.backend_url,
            "verification orchestrator created"
        );

        Ok(Self {
            initializer: SessionInitializer::new(config.clone(), prover),
            prober: ConnectivityProber::new(backend, updates.clone()),
            reconciler,
            retry: RetryController::new(ids),
            session: None,
            probe_task: None,
            updates,
            config,
        })
    }

    /// Subscribe to state, request, connectivity and outcome updates.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionUpdate> {
        self.updates.subscribe()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn state(&self) -> Option<&LifecycleState> {
        self.session.as_ref().map(Session::state)
    }

    pub fn backend_reachable(&self) -> bool {
        self.prober.is_reachable()
    }

    pub fn status(&self) -> Option<SessionStatus> {
        let session = self.session.as_ref()?;
        Some(SessionStatus {
            session_id: session.id().clone(),
            attempt: self.retry.attempts(),
            state: session.state().clone(),
            backend_reachable: self.backend_reachable(),
            request: session.request().cloned(),
            presented: session.presented(),
            outcome: session.outcome().cloned(),
        })
    }

    /// Start the first session and kick off the connectivity probe.
    ///
    /// Returns the state after initialization: `AwaitingProof`, or
    /// `Failed(initialization)`.
    pub async fn start(&mut self) -> Result<LifecycleState, SessionError> {
        if self.session.is_some() {
            return Err(SessionError::AlreadyStarted);
        }
        self.probe_task = Some(self.prober.spawn());
        self.begin_session().await
    }

    /// Wait for the startup probe, if it is still running, and return the
    /// reachability flag.
    pub async fn connectivity_settled(&mut self) -> bool {
        if let Some(task) = self.probe_task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "connectivity probe task failed");
            }
        }
        self.prober.is_reachable()
    }

    /// Hand the active request to the prover.
    pub fn present(&mut self) -> Result<PresentableRequest, SessionError> {
        let session = self.session.as_mut().ok_or(SessionError::NotStarted)?;
        let request = match (session.state(), session.request()) {
            (LifecycleState::AwaitingProof, Some(request)) => request.clone(),
            (state, _) => return Err(SessionError::NoActiveRequest(state.clone())),
        };
        session.mark_presented();

        tracing::info!(
            session_id = %request.session_id,
            link = %request.universal_link,
            "request presented to prover"
        );
        self.emit(SessionUpdate::Presented {
            session_id: request.session_id.clone(),
        });
        Ok(request)
    }

    /// Consume the prover callback for the active session.
    ///
    /// Returns the emitted outcome, or `None` when the event was ignored
    /// because it belongs to another session or the active session already
    /// consumed its callback.
    pub async fn handle_proof_event(
        &mut self,
        event: ProofEvent,
    ) -> Result<Option<VerificationOutcome>, SessionError> {
        let session = self.session.as_mut().ok_or(SessionError::NotStarted)?;

        if session.id() != &event.session_id {
            if self.retry.is_used(&event.session_id) {
                tracing::info!(
                    session_id = %event.session_id,
                    active = %session.id(),
                    "ignoring proof result for superseded session"
                );
            } else {
                tracing::warn!(
                    session_id = %event.session_id,
                    active = %session.id(),
                    "ignoring proof result for unknown session"
                );
            }
            return Ok(None);
        }

        if session.proof_consumed() || session.state() != &LifecycleState::AwaitingProof {
            tracing::warn!(
                session_id = %event.session_id,
                state = %session.state(),
                "ignoring duplicate proof result"
            );
            return Ok(None);
        }

        session.consume_proof();
        let reconciliation = self.reconciler.reconcile(session, event.result).await;
        session.finish(reconciliation.event, reconciliation.outcome.clone())?;

        let session_id = session.id().clone();
        let state = session.state().clone();
        tracing::info!(
            session_id = %session_id,
            state = %state,
            verified = reconciliation.outcome.verified,
            durable = reconciliation.outcome.is_durable(),
            "verification session finished"
        );

        self.emit(SessionUpdate::StateChanged { session_id, state });
        self.emit(SessionUpdate::Outcome {
            outcome: reconciliation.outcome.clone(),
        });
        Ok(Some(reconciliation.outcome))
    }

    /// Replace a failed session with a fresh one and initialize it.
    pub async fn retry(&mut self) -> Result<LifecycleState, SessionError> {
        let session = self.session.as_ref().ok_or(SessionError::NotStarted)?;
        if !session.state().is_retryable() {
            return Err(SessionError::RetryNotAllowed(session.state().clone()));
        }
        SessionStateMachine::transition(session.state(), SessionEvent::Retry)?;

        tracing::info!(
            previous = %session.id(),
            reason = ?session.state().failure_reason(),
            "retrying verification session"
        );
        self.begin_session().await
    }

    /// Allocate an unused id, replace the session, and run the initializer.
    async fn begin_session(&mut self) -> Result<LifecycleState, SessionError> {
        let session_id = self.retry.allocate()?;
        self.session = Some(Session::new(
            session_id.clone(),
            self.config.policy.clone(),
        ));
        self.emit(SessionUpdate::StateChanged {
            session_id: session_id.clone(),
            state: LifecycleState::Initializing,
        });

        let built = self.initializer.initialize(&session_id).await;

        let session = self.session.as_mut().ok_or(SessionError::NotStarted)?;
        let published = match built {
            Ok(request) => {
                session.publish(request.clone())?;
                Some(request)
            }
            Err(e) => {
                tracing::error!(session_id = %session_id, error = %e, "session initialization failed");
                session.apply(SessionEvent::InitializationFailed(e.to_string()))?;
                None
            }
        };
        let state = session.state().clone();

        if let Some(request) = published {
            self.emit(SessionUpdate::RequestPublished { request });
        }
        self.emit(SessionUpdate::StateChanged {
            session_id,
            state: state.clone(),
        });
        Ok(state)
    }

    fn emit(&self, update: SessionUpdate) {
        // No subscribers is fine.
        let _ = self.updates.send(update);
    }
}
