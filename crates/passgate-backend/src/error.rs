/// Errors talking to the verification backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Request never produced a response (DNS, connect, timeout, TLS).
    #[error("network error: {0}")]
    Network(String),

    /// Backend answered with a non-2xx status.
    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid backend configuration: {0}")]
    InvalidConfig(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e.to_string())
    }
}
