/// Errors that can occur while building a key repository.
#[derive(Debug, thiserror::Error)]
pub enum KeyStoreError {
    /// A key file could not be loaded.
    #[error("failed to load key: {0}")]
    LoadFailed(String),

    /// The key file content is not valid hex.
    #[error("key {name} is not valid hex: {source}")]
    InvalidHex {
        name: String,
        #[source]
        source: hex::FromHexError,
    },

    /// The key does not have the configured length.
    #[error("key {name} has {actual} bytes, expected {expected}")]
    InvalidKeyLen {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// The key name is empty or contains characters outside `[A-Za-z0-9._-]`.
    #[error("invalid key name: {0:?}")]
    InvalidName(String),
}

pub type Result<T> = std::result::Result<T, KeyStoreError>;
