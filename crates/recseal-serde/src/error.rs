use recseal_crypto::BoxError;
use recseal_envelope::EnvelopeError;

/// Errors that can occur while serializing or deserializing a record.
///
/// Key resolution and cipher failures are not errors at this level: they make
/// the record absent. See [`CryptoSerializer`](crate::CryptoSerializer).
#[derive(Debug, thiserror::Error)]
pub enum SerdeError {
    /// The payload starts with the envelope marker but is not a valid frame,
    /// or a key reference cannot be framed.
    #[error("envelope error: {0}")]
    Envelope(#[from] EnvelopeError),

    /// The key reference extractor failed; the record must not be sent.
    #[error("key reference extraction failed: {0}")]
    KeyReference(#[source] BoxError),

    /// UTF-8 decoding error.
    #[error("invalid UTF-8 payload: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error raised by a user-supplied payload codec.
    #[error("codec error: {0}")]
    Codec(#[source] BoxError),
}

pub type Result<T> = std::result::Result<T, SerdeError>;
