use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::CoreError;

/// Opaque token identifying one verification attempt to both the prover
/// and the backend. Doubles as the session correlation identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    /// Create a session id from an externally supplied string.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        if id.is_empty() {
            return Err(CoreError::InvalidSessionId("session id is empty".into()));
        }
        if id.chars().any(char::is_whitespace) {
            return Err(CoreError::InvalidSessionId(format!(
                "session id must not contain whitespace, got: {:?}",
                id
            )));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SessionId {
    type Error = CoreError;

    fn try_from(id: String) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Source of fresh session ids.
pub trait SessionIdGenerator: Send + Sync {
    fn generate(&self) -> SessionId;
}

/// Random UUIDv4 session ids, for `userIdType = uuid` descriptors.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidSessionIds;

impl SessionIdGenerator for UuidSessionIds {
    fn generate(&self) -> SessionId {
        SessionId(uuid::Uuid::new_v4().to_string())
    }
}

/// Random 20-byte `0x`-prefixed hex ids, for `userIdType = hex` descriptors.
#[derive(Debug, Default, Clone, Copy)]
pub struct HexSessionIds;

impl SessionIdGenerator for HexSessionIds {
    fn generate(&self) -> SessionId {
        let mut bytes = [0u8; 20];
        rand::thread_rng().fill_bytes(&mut bytes);
        SessionId(format!("0x{}", hex::encode(bytes)))
    }
}

/// Deterministic `<prefix>1`, `<prefix>2`, ... ids.
#[derive(Debug)]
pub struct SequentialSessionIds {
    prefix: String,
    next: AtomicU64,
}

impl SequentialSessionIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl SessionIdGenerator for SequentialSessionIds {
    fn generate(&self) -> SessionId {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        SessionId(format!("{}{}", self.prefix, n))
    }
}

/// The payload handed to the prover: a universal link plus the raw
/// descriptor that QR renderers encode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentableRequest {
    /// Session this request was built for.
    pub session_id: SessionId,
    /// Deep link that opens the wallet app.
    pub universal_link: String,
    /// JSON descriptor suitable for QR encoding.
    pub qr_payload: String,
}
