/// Prover SDK errors. Any of these fails session initialization.
#[derive(Debug, thiserror::Error)]
pub enum ProverError {
    #[error("invalid session descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("request encoding failed: {0}")]
    Encoding(String),

    #[error("prover unavailable: {0}")]
    Unavailable(String),
}
