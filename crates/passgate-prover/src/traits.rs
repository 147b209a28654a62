use async_trait::async_trait;
use passgate_core::PresentableRequest;

use crate::descriptor::SessionDescriptor;
use crate::error::ProverError;

/// Prover SDK interface.
///
/// Implementations must be deterministic per session id: building twice
/// from the same descriptor yields an equivalent request.
#[async_trait]
pub trait ProverSdk: Send + Sync {
    /// Identifier reported as the `source` of verification outcomes.
    fn source_id(&self) -> &str;

    /// Turn a session descriptor into a payload the wallet can consume.
    async fn build_request(
        &self,
        descriptor: &SessionDescriptor,
    ) -> Result<PresentableRequest, ProverError>;
}
