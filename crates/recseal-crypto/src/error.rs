use recseal_envelope::{EnvelopeError, KeyRef};

/// Boxed error raised by pluggable collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Why the façade produced no output for a record.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// The key provider has no key for the reference.
    #[error("no key found for key reference {key_ref}")]
    KeyNotFound { key_ref: KeyRef },

    /// The cipher rejected the input or failed internally.
    #[error("cipher failed for key reference {key_ref}: {source}")]
    CipherFailure {
        key_ref: KeyRef,
        #[source]
        source: BoxError,
    },
}

impl CryptoError {
    /// The key reference the failed operation was attempted with.
    pub fn key_ref(&self) -> &KeyRef {
        match self {
            CryptoError::KeyNotFound { key_ref } | CryptoError::CipherFailure { key_ref, .. } => {
                key_ref
            }
        }
    }
}

/// Errors that can occur while sealing a payload into an envelope.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Framing-level error.
    #[error("envelope error: {0}")]
    Envelope(#[from] EnvelopeError),

    /// Key resolution or cipher failure.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

pub type Result<T> = std::result::Result<T, CodecError>;
