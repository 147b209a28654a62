//! Static session policy: who is asking (app identity) and what is asked
//! (disclosure policy). Both are fixed when the orchestrator is built.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// Which verification network the prover submits proofs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointType {
    Https,
    StagingHttps,
    Celo,
    StagingCelo,
}

impl fmt::Display for EndpointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Https => write!(f, "https"),
            Self::StagingHttps => write!(f, "staging_https"),
            Self::Celo => write!(f, "celo"),
            Self::StagingCelo => write!(f, "staging_celo"),
        }
    }
}

/// Format of the user id carried in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserIdType {
    Hex,
    Uuid,
}

impl fmt::Display for UserIdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hex => write!(f, "hex"),
            Self::Uuid => write!(f, "uuid"),
        }
    }
}

/// Identity of the requesting application as shown in the wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppIdentity {
    /// Display name shown to the user.
    #[serde(default = "default_app_name")]
    pub app_name: String,
    /// Scope the proof is bound to.
    #[serde(default = "default_scope")]
    pub scope: String,
    /// Logo shown in the wallet.
    #[serde(default)]
    pub logo_url: Option<String>,
    /// Free-form data echoed back with the proof.
    #[serde(default)]
    pub user_defined_data: String,
    #[serde(default = "default_endpoint_type")]
    pub endpoint_type: EndpointType,
    #[serde(default = "default_user_id_type")]
    pub user_id_type: UserIdType,
    /// Request descriptor version.
    #[serde(default = "default_version")]
    pub version: u8,
    /// Identifies the prover in emitted outcomes.
    #[serde(default = "default_source")]
    pub source: String,
}

fn default_app_name() -> String {
    "Passgate".into()
}
fn default_scope() -> String {
    "passgate-verification".into()
}
fn default_endpoint_type() -> EndpointType {
    EndpointType::StagingHttps
}
fn default_user_id_type() -> UserIdType {
    UserIdType::Uuid
}
fn default_version() -> u8 {
    2
}
fn default_source() -> String {
    "self-protocol".into()
}

impl Default for AppIdentity {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            scope: default_scope(),
            logo_url: None,
            user_defined_data: String::new(),
            endpoint_type: default_endpoint_type(),
            user_id_type: default_user_id_type(),
            version: default_version(),
            source: default_source(),
        }
    }
}

impl AppIdentity {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.app_name.trim().is_empty() {
            return Err(CoreError::MissingField("app_name".into()));
        }
        if self.scope.is_empty() {
            return Err(CoreError::MissingField("scope".into()));
        }
        if self.scope.chars().any(char::is_whitespace) {
            return Err(CoreError::ValidationError(format!(
                "scope must not contain whitespace: {:?}",
                self.scope
            )));
        }
        Ok(())
    }
}

/// Attributes and eligibility thresholds a session asks the prover for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisclosurePolicy {
    /// Minimum age the holder must prove.
    #[serde(default)]
    pub minimum_age: Option<u8>,
    /// Sanctions-list (OFAC) screening.
    #[serde(default)]
    pub ofac: bool,
    /// ISO 3166-1 alpha-3 codes whose documents are rejected.
    #[serde(default)]
    pub excluded_countries: Vec<String>,
    #[serde(default)]
    pub nationality: bool,
    #[serde(default)]
    pub gender: bool,
    #[serde(default)]
    pub name: bool,
    #[serde(default)]
    pub issuing_state: bool,
    #[serde(default)]
    pub date_of_birth: bool,
    #[serde(default)]
    pub passport_number: bool,
    #[serde(default)]
    pub expiry_date: bool,
}

impl Default for DisclosurePolicy {
    fn default() -> Self {
        Self {
            minimum_age: Some(18),
            ofac: false,
            excluded_countries: Vec::new(),
            nationality: true,
            gender: true,
            name: false,
            issuing_state: false,
            date_of_birth: false,
            passport_number: false,
            expiry_date: false,
        }
    }
}

impl DisclosurePolicy {
    /// A policy that only checks a minimum age and reveals nothing.
    pub fn minimum_age(age: u8) -> Self {
        Self {
            minimum_age: Some(age),
            nationality: false,
            gender: false,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(age) = self.minimum_age {
            if age == 0 || age > 125 {
                return Err(CoreError::ValidationError(format!(
                    "minimum_age must be within 1..=125, got {}",
                    age
                )));
            }
        }
        for code in &self.excluded_countries {
            if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
                return Err(CoreError::ValidationError(format!(
                    "excluded country must be an ISO alpha-3 code, got {:?}",
                    code
                )));
            }
        }
        Ok(())
    }

    /// Names of the attributes the holder is asked to reveal.
    pub fn revealed_attributes(&self) -> Vec<&'static str> {
        [
            ("name", self.name),
            ("issuing_state", self.issuing_state),
            ("nationality", self.nationality),
            ("date_of_birth", self.date_of_birth),
            ("passport_number", self.passport_number),
            ("gender", self.gender),
            ("expiry_date", self.expiry_date),
        ]
        .into_iter()
        .filter_map(|(name, on)| on.then_some(name))
        .collect()
    }

    /// Wire form of the `disclosures` object in a request descriptor.
    /// Only requested attributes are emitted.
    pub fn to_disclosures(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        if let Some(age) = self.minimum_age {
            map.insert("minimumAge".into(), age.into());
        }
        if self.ofac {
            map.insert("ofac".into(), true.into());
        }
        if !self.excluded_countries.is_empty() {
            map.insert(
                "excludedCountries".into(),
                self.excluded_countries.clone().into(),
            );
        }
        for attr in self.revealed_attributes() {
            map.insert(attr.into(), true.into());
        }
        serde_json::Value::Object(map)
    }
}
