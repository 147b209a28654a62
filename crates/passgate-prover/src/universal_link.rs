//! Prover that encodes session descriptors as wallet universal links.

use async_trait::async_trait;
use passgate_core::PresentableRequest;
use url::Url;

use crate::descriptor::SessionDescriptor;
use crate::error::ProverError;
use crate::traits::ProverSdk;

/// Default redirect host that forwards to the installed wallet app.
pub const DEFAULT_REDIRECT_BASE: &str = "https://redirect.self.xyz";

/// Query parameter carrying the serialized descriptor.
const DESCRIPTOR_PARAM: &str = "selfApp";

/// Builds `<redirect>?selfApp=<descriptor JSON>` deep links.
pub struct UniversalLinkProver {
    redirect_base: Url,
    source: String,
}

impl UniversalLinkProver {
    pub fn new(redirect_base: &str, source: impl Into<String>) -> Result<Self, ProverError> {
        let redirect_base = Url::parse(redirect_base).map_err(|e| {
            ProverError::InvalidDescriptor(format!(
                "invalid redirect base {:?}: {}",
                redirect_base, e
            ))
        })?;
        Ok(Self {
            redirect_base,
            source: source.into(),
        })
    }

    pub fn redirect_base(&self) -> &Url {
        &self.redirect_base
    }
}

impl Default for UniversalLinkProver {
    fn default() -> Self {
        Self {
            redirect_base: Url::parse(DEFAULT_REDIRECT_BASE)
                .expect("default redirect base is a valid URL"),
            source: "self-protocol".into(),
        }
    }
}

#[async_trait]
impl ProverSdk for UniversalLinkProver {
    fn source_id(&self) -> &str {
        &self.source
    }

    async fn build_request(
        &self,
        descriptor: &SessionDescriptor,
    ) -> Result<PresentableRequest, ProverError> {
        descriptor.validate()?;
        let qr_payload = serde_json::to_string(&descriptor.to_wire()?)
            .map_err(|e| ProverError::Encoding(e.to_string()))?;

        let mut link = self.redirect_base.clone();
        link.query_pairs_mut()
            .clear()
            .append_pair(DESCRIPTOR_PARAM, &qr_payload);

        tracing::debug!(
            session_id = %descriptor.session_id,
            bytes = qr_payload.len(),
            "universal link built"
        );

        Ok(PresentableRequest {
            session_id: descriptor.session_id.clone(),
            universal_link: link.into(),
            qr_payload,
        })
    }
}
