use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use recseal_envelope::{decode_envelope, encode_sealed, Envelope, EnvelopeError, KeyRef, HEADER_SIZE};
use tracing::debug;

use crate::error::{CryptoError, Result};
use crate::facade::{Decryptor, Encryptor};

/// Seals serialized payloads into envelopes.
#[derive(Clone)]
pub struct EnvelopeEncoder {
    encryptor: Arc<dyn Encryptor>,
}

impl EnvelopeEncoder {
    pub fn new(encryptor: Arc<dyn Encryptor>) -> Self {
        Self { encryptor }
    }

    /// Encrypt and frame `payload` under `key_ref`.
    ///
    /// Without a key reference the payload is returned untouched and the
    /// encryptor is not called. A [`CodecError::Crypto`](crate::CodecError::Crypto)
    /// means the record has no valid output: callers must not fall back to
    /// sending the plaintext.
    pub fn encode(&self, payload: Bytes, key_ref: Option<&KeyRef>) -> Result<Bytes> {
        let Some(key_ref) = key_ref else {
            debug!("no key reference, data will be sent unencrypted");
            return Ok(payload);
        };
        if key_ref.is_empty() {
            return Err(EnvelopeError::EmptyKeyRef.into());
        }

        let ciphertext = self.encryptor.encrypt(&payload, key_ref)?;

        let mut dst = BytesMut::with_capacity(HEADER_SIZE + key_ref.len() + ciphertext.len());
        encode_sealed(key_ref, &ciphertext, &mut dst)?;
        Ok(dst.freeze())
    }
}

impl std::fmt::Debug for EnvelopeEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvelopeEncoder").finish_non_exhaustive()
    }
}

/// Result of opening an inbound payload.
///
/// The key reference is reported whenever the frame carried one, even if
/// decryption failed.
#[derive(Debug)]
pub struct Opened {
    pub key_ref: Option<KeyRef>,
    pub payload: std::result::Result<Bytes, CryptoError>,
}

impl Opened {
    /// The decrypted (or passthrough) payload, if any.
    pub fn plaintext(&self) -> Option<&Bytes> {
        self.payload.as_ref().ok()
    }

    /// Split into `(payload, key_ref)`, dropping the failure reason.
    pub fn into_parts(self) -> (Option<Bytes>, Option<KeyRef>) {
        (self.payload.ok(), self.key_ref)
    }
}

/// Opens envelopes produced by [`EnvelopeEncoder`].
#[derive(Clone)]
pub struct EnvelopeDecoder {
    decryptor: Arc<dyn Decryptor>,
}

impl EnvelopeDecoder {
    pub fn new(decryptor: Arc<dyn Decryptor>) -> Self {
        Self { decryptor }
    }

    /// Unframe and decrypt `data`.
    ///
    /// Unframed input and zero-length key reference frames pass through without
    /// touching the decryptor. Only a truncated frame is an error here; key and
    /// cipher failures are carried in [`Opened::payload`].
    pub fn decode(&self, data: Bytes) -> std::result::Result<Opened, EnvelopeError> {
        let opened = match decode_envelope(data)? {
            Envelope::Raw(payload) | Envelope::Plain(payload) => Opened {
                key_ref: None,
                payload: Ok(payload),
            },
            Envelope::Sealed {
                key_ref,
                ciphertext,
            } => {
                let payload = self
                    .decryptor
                    .decrypt(&ciphertext, &key_ref)
                    .map(Bytes::from);
                Opened {
                    key_ref: Some(key_ref),
                    payload,
                }
            }
        };
        Ok(opened)
    }
}

impl std::fmt::Debug for EnvelopeDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvelopeDecoder").finish_non_exhaustive()
    }
}
