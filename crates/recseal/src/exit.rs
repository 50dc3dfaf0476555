use std::fmt;
use std::io;

use recseal_crypto::{CodecError, CryptoError};
use recseal_envelope::EnvelopeError;
use recseal_keys::KeyStoreError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
/// The key could not be resolved or the cipher rejected the payload.
pub const CRYPTO_FAILED: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const CONFIG_INVALID: i32 = 78;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::NotFound => USAGE,
        io::ErrorKind::AlreadyExists => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn envelope_error(context: &str, err: EnvelopeError) -> CliError {
    match err {
        EnvelopeError::Malformed { .. } => CliError::new(DATA_INVALID, format!("{context}: {err}")),
        EnvelopeError::KeyRefTooLarge { .. } | EnvelopeError::EmptyKeyRef => {
            CliError::new(USAGE, format!("{context}: {err}"))
        }
    }
}

pub fn crypto_error(context: &str, err: CryptoError) -> CliError {
    CliError::new(CRYPTO_FAILED, format!("{context}: {err}"))
}

pub fn codec_error(context: &str, err: CodecError) -> CliError {
    match err {
        CodecError::Envelope(err) => envelope_error(context, err),
        CodecError::Crypto(err) => crypto_error(context, err),
    }
}

pub fn key_store_error(context: &str, err: KeyStoreError) -> CliError {
    match err {
        KeyStoreError::InvalidName(_) => CliError::new(USAGE, format!("{context}: {err}")),
        other => CliError::new(CONFIG_INVALID, format!("{context}: {other}")),
    }
}
