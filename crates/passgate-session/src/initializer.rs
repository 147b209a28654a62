use passgate_core::{PresentableRequest, SessionConfig, SessionId};
use passgate_prover::{ProverError, ProverSdk, SessionDescriptor};
use std::sync::Arc;

/// Builds the presentable request for a session through the prover SDK.
pub struct SessionInitializer {
    config: Arc<SessionConfig>,
    prover: Arc<dyn ProverSdk>,
}

impl SessionInitializer {
    pub fn new(config: Arc<SessionConfig>, prover: Arc<dyn ProverSdk>) -> Self {
        Self { config, prover }
    }

    /// Produce the request for `session_id`, or fail without exposing a
    /// partial request.
    pub async fn initialize(
        &self,
        session_id: &SessionId,
    ) -> Result<PresentableRequest, ProverError> {
        let descriptor = SessionDescriptor::from_config(&self.config, session_id.clone());
        let request = self.prover.build_request(&descriptor).await?;

        if &request.session_id != session_id {
            return Err(ProverError::Encoding(format!(
                "prover built a request for {} while initializing {}",
                request.session_id, session_id
            )));
        }

        tracing::info!(
            session_id = %session_id,
            scope = %self.config.app.scope,
            endpoint = %descriptor.callback_endpoint,
            "verification request built"
        );
        Ok(request)
    }
}
