/// Errors that can occur during envelope encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    /// The frame starts with the magic marker but its header or key reference is cut short.
    #[error("malformed envelope: need {needed} bytes, only {available} available")]
    Malformed { needed: usize, available: usize },

    /// The key reference does not fit the 4-byte length field.
    #[error("key reference too large ({size} bytes, max {max})")]
    KeyRefTooLarge { size: usize, max: usize },

    /// An empty key reference would read back as an unencrypted frame.
    #[error("key reference must not be empty")]
    EmptyKeyRef,
}

pub type Result<T> = std::result::Result<T, EnvelopeError>;
