//! Error types for local assertion operations

/// Errors returned by the identity register and the assertion authorities
#[derive(Debug, thiserror::Error)]
pub enum AttestationError {
    #[error("Authority has not been initialized")]
    NotInitialized,

    #[error("Authority is already initialized")]
    AlreadyInitialized,

    #[error("Invalid authority config: {0}")]
    InvalidConfig(String),

    /// The identity slot is empty
    #[error("Not executing inside an enclave")]
    NotInEnclave,

    /// Enter was called while another identity is active
    #[error("Already executing inside an enclave")]
    AlreadyInEnclave,

    #[error("Assertion request is not compatible with this generator")]
    IncompatibleRequest,

    #[error("Assertion is not compatible with this verifier")]
    IncompatibleAssertion,

    /// Carries no detail so that callers cannot tell which check failed
    #[error("Assertion is invalid")]
    InvalidAssertion,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for local assertion operations
pub type AttestationResult<T> = Result<T, AttestationError>;
