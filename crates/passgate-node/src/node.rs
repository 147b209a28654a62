//! The Passgate node.
//!
//! Owns the verification orchestrator and drives it from a single event
//! loop: API commands and session updates are handled one at a time, so
//! the orchestrator never sees concurrent mutation. The HTTP API runs in a
//! background task and only talks to the loop through `NodeCommand`s.

use anyhow::Result;
use passgate_backend::{HttpBackend, VerificationBackend};
use passgate_core::{HexSessionIds, SessionIdGenerator, UserIdType, UuidSessionIds};
use passgate_prover::{ProverSdk, UniversalLinkProver};
use passgate_session::{Orchestrator, SessionStatus, SessionUpdate};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};

use crate::commands::{CallbackResponse, CommandError, NodeCommand};
use crate::config::PassgateConfig;
use crate::state::NodeState;

const COMMAND_CHANNEL_CAPACITY: usize = 64;

pub struct PassgateNode {
    /// Node configuration.
    config: PassgateConfig,
    orchestrator: Orchestrator,
    /// Shared state accessible from HTTP handlers.
    node_state: Option<Arc<NodeState>>,
    /// Receives commands from the HTTP API.
    command_rx: Option<mpsc::Receiver<NodeCommand>>,
    /// Receives session updates from the orchestrator.
    updates_rx: Option<broadcast::Receiver<SessionUpdate>>,
    /// Bound API address, known after `start`.
    api_addr: Option<SocketAddr>,
}

impl PassgateNode {
    /// Create a node talking to the configured backend through the
    /// universal-link prover.
    pub fn new(config: PassgateConfig) -> Result<Self> {
        let prover =
            UniversalLinkProver::new(&config.backend.redirect_base, config.app.source.clone())?;
        let backend = HttpBackend::new(config.http_backend_config())?;
        let ids: Arc<dyn SessionIdGenerator> = match config.app.user_id_type {
            UserIdType::Uuid => Arc::new(UuidSessionIds),
            UserIdType::Hex => Arc::new(HexSessionIds),
        };
        Self::with_components(config, Arc::new(prover), Arc::new(backend), ids)
    }

    pub fn with_components(
        config: PassgateConfig,
        prover: Arc<dyn ProverSdk>,
        backend: Arc<dyn VerificationBackend>,
        ids: Arc<dyn SessionIdGenerator>,
    ) -> Result<Self> {
        let orchestrator = Orchestrator::new(config.session_config(), prover, backend, ids)?;
        Ok(Self {
            config,
            orchestrator,
            node_state: None,
            command_rx: None,
            updates_rx: None,
            api_addr: None,
        })
    }

    /// Start the first session and the HTTP API.
    pub async fn start(&mut self) -> Result<()> {
        tracing::info!("starting Passgate node");

        // Subscribe first so the loop sees the startup updates too.
        let updates_rx = self.orchestrator.subscribe();
        let (command_tx, command_rx) = mpsc::channel::<NodeCommand>(COMMAND_CHANNEL_CAPACITY);
        let node_state = Arc::new(NodeState::new(command_tx));

        let state = self.orchestrator.start().await?;
        node_state.set_status(self.orchestrator.status());
        tracing::info!(%state, "verification session started");

        let listener = TcpListener::bind(self.config.api_addr()).await?;
        self.api_addr = Some(listener.local_addr()?);

        let api_state = node_state.clone();
        tokio::spawn(async move {
            if let Err(e) = crate::api::serve_api(listener, api_state).await {
                tracing::error!(error = %e, "HTTP API server error");
            }
        });

        self.node_state = Some(node_state);
        self.command_rx = Some(command_rx);
        self.updates_rx = Some(updates_rx);
        Ok(())
    }

    /// Run the node's main event loop: processes session updates and API commands.
    pub async fn run(&mut self) -> Result<()> {
        let mut updates_rx = self
            .updates_rx
            .take()
            .ok_or_else(|| anyhow::anyhow!("node not started"))?;
        let mut command_rx = self
            .command_rx
            .take()
            .ok_or_else(|| anyhow::anyhow!("node not started"))?;
        let node_state = self
            .node_state
            .clone()
            .ok_or_else(|| anyhow::anyhow!("node not started"))?;

        tracing::info!("entering main event loop");

        loop {
            tokio::select! {
                update = updates_rx.recv() => {
                    match update {
                        Ok(u) => self.handle_update(&node_state, u),
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            tracing::warn!(missed = n, "session update receiver lagged");
                            node_state.set_status(self.orchestrator.status());
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            tracing::info!("session update channel closed");
                            break;
                        }
                    }
                }
                cmd = command_rx.recv() => {
                    match cmd {
                        Some(c) => self.handle_command(&node_state, c).await,
                        None => {
                            tracing::info!("API command channel closed");
                            break;
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Gracefully shut down the node.
    pub async fn shutdown(&mut self) -> Result<()> {
        tracing::info!("shutting down Passgate node");
        if let Some(status) = self.orchestrator.status() {
            tracing::info!(
                session_id = %status.session_id,
                state = %status.state,
                attempt = status.attempt,
                "final session state"
            );
        }
        self.node_state = None;
        self.command_rx = None;
        self.updates_rx = None;
        Ok(())
    }

    pub fn api_addr(&self) -> Option<SocketAddr> {
        self.api_addr
    }

    pub fn state(&self) -> Option<Arc<NodeState>> {
        self.node_state.clone()
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    fn handle_update(&self, state: &NodeState, update: SessionUpdate) {
        match &update {
            SessionUpdate::StateChanged {
                session_id,
                state: lifecycle,
            } => {
                tracing::debug!(%session_id, state = %lifecycle, "session state changed");
            }
            SessionUpdate::RequestPublished { request } => {
                tracing::info!(
                    session_id = %request.session_id,
                    link = %request.universal_link,
                    "request ready to present"
                );
            }
            SessionUpdate::Presented { session_id } => {
                tracing::debug!(%session_id, "request presented");
            }
            SessionUpdate::Connectivity { reachable } => {
                tracing::info!(reachable, "backend connectivity settled");
            }
            SessionUpdate::Outcome { outcome } => {
                state.record_outcome(outcome.clone());
            }
        }
        state.set_status(self.orchestrator.status());
    }

    /// Handle a command from the HTTP API. Shared state is refreshed before
    /// the reply goes out.
    async fn handle_command(&mut self, state: &NodeState, cmd: NodeCommand) {
        match cmd {
            NodeCommand::Present { reply } => {
                let result = self.orchestrator.present().map_err(CommandError::from);
                state.set_status(self.orchestrator.status());
                let _ = reply.send(result);
            }
            NodeCommand::Retry { reply } => {
                let result = match self.orchestrator.retry().await {
                    Ok(_) => self.snapshot(),
                    Err(e) => Err(CommandError::from(e)),
                };
                state.set_status(self.orchestrator.status());
                let _ = reply.send(result);
            }
            NodeCommand::DeliverProof { event, reply } => {
                let result = self
                    .orchestrator
                    .handle_proof_event(event)
                    .await
                    .map(|outcome| CallbackResponse {
                        accepted: outcome.is_some(),
                        outcome,
                    })
                    .map_err(CommandError::from);
                if let Ok(CallbackResponse {
                    outcome: Some(outcome),
                    ..
                }) = &result
                {
                    state.record_outcome(outcome.clone());
                }
                state.set_status(self.orchestrator.status());
                let _ = reply.send(result);
            }
        }
    }

    fn snapshot(&self) -> Result<SessionStatus, CommandError> {
        self.orchestrator
            .status()
            .ok_or_else(|| CommandError::Conflict("no session has been started".into()))
    }
}
