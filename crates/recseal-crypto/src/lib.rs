//! Encryption façade and envelope codec.
//!
//! This crate composes two pluggable collaborators:
//! - a [`KeyProvider`] that resolves a key reference into key material
//! - a [`CryptoAlgorithm`] that performs the raw symmetric transform
//!
//! under one failure policy: an unresolved key or a cipher error never escapes
//! as a fault, it becomes a [`CryptoError`] describing why the record has no
//! output. The [`EnvelopeEncoder`] and [`EnvelopeDecoder`] put that façade
//! behind the wire format from `recseal-envelope`.

pub mod codec;
pub mod error;
pub mod facade;
pub mod provider;

#[cfg(feature = "aes-gcm")]
pub mod gcm;

pub use codec::{EnvelopeDecoder, EnvelopeEncoder, Opened};
pub use error::{BoxError, CodecError, CryptoError, Result};
pub use facade::{DefaultDecryptor, DefaultEncryptor, Decryptor, Encryptor};
pub use provider::{CryptoAlgorithm, KeyProvider, KeyReferenceExtractor};

#[cfg(feature = "aes-gcm")]
pub use gcm::{AesGcmAlgorithm, AesGcmError, KEY_LEN, NONCE_LEN};

pub use recseal_envelope::{EnvelopeError, KeyRef};
