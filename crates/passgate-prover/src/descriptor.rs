use passgate_core::{AppIdentity, DisclosurePolicy, SessionConfig, SessionId, UserIdType};
use serde::Serialize;

use crate::error::ProverError;

/// Everything the wallet needs to start a verification for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDescriptor {
    pub session_id: SessionId,
    pub app: AppIdentity,
    pub policy: DisclosurePolicy,
    /// Where the wallet submits the proof.
    pub callback_endpoint: String,
}

/// Serialized descriptor as understood by the wallet app.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireDescriptor<'a> {
    version: u8,
    app_name: &'a str,
    scope: &'a str,
    endpoint: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    logo_base64: Option<&'a str>,
    session_id: &'a str,
    user_id: &'a str,
    endpoint_type: String,
    user_id_type: String,
    user_defined_data: &'a str,
    disclosures: serde_json::Value,
}

impl SessionDescriptor {
    /// Build the descriptor for `session_id` from static session config.
    pub fn from_config(config: &SessionConfig, session_id: SessionId) -> Self {
        Self {
            session_id,
            app: config.app.clone(),
            policy: config.policy.clone(),
            callback_endpoint: config.callback_endpoint(),
        }
    }

    /// Check that the descriptor is complete and internally consistent.
    pub fn validate(&self) -> Result<(), ProverError> {
        self.app
            .validate()
            .map_err(|e| ProverError::InvalidDescriptor(e.to_string()))?;
        self.policy
            .validate()
            .map_err(|e| ProverError::InvalidDescriptor(e.to_string()))?;

        url::Url::parse(&self.callback_endpoint).map_err(|e| {
            ProverError::InvalidDescriptor(format!(
                "callback endpoint {:?} is not a URL: {}",
                self.callback_endpoint, e
            ))
        })?;

        let id = self.session_id.as_str();
        let well_formed = match self.app.user_id_type {
            UserIdType::Uuid => uuid::Uuid::parse_str(id).is_ok(),
            UserIdType::Hex => id
                .strip_prefix("0x")
                .map(|h| !h.is_empty() && hex::decode(h).is_ok())
                .unwrap_or(false),
        };
        if !well_formed {
            return Err(ProverError::InvalidDescriptor(format!(
                "session id {} is not a valid {} user id",
                id, self.app.user_id_type
            )));
        }
        Ok(())
    }

    /// The JSON document the wallet consumes.
    pub fn to_wire(&self) -> Result<serde_json::Value, ProverError> {
        let wire = WireDescriptor {
            version: self.app.version,
            app_name: &self.app.app_name,
            scope: &self.app.scope,
            endpoint: &self.callback_endpoint,
            logo_base64: self.app.logo_url.as_deref(),
            session_id: self.session_id.as_str(),
            user_id: self.session_id.as_str(),
            endpoint_type: self.app.endpoint_type.to_string(),
            user_id_type: self.app.user_id_type.to_string(),
            user_defined_data: &self.app.user_defined_data,
            disclosures: self.policy.to_disclosures(),
        };
        serde_json::to_value(&wire).map_err(|e| ProverError::Encoding(e.to_string()))
    }
}
