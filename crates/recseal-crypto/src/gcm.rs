//! AES-256-GCM cipher provider.
//!
//! Output layout is `nonce (12 bytes) || ciphertext || tag (16 bytes)`. A fresh
//! random nonce is drawn for every call, so encrypting the same payload twice
//! yields different bytes.

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::BoxError;
use crate::provider::CryptoAlgorithm;

/// AES-256 key length in bytes.
pub const KEY_LEN: usize = 32;

/// GCM nonce length in bytes.
pub const NONCE_LEN: usize = 12;

const TAG_LEN: usize = 16;

/// Errors raised by [`AesGcmAlgorithm`].
#[derive(Debug, thiserror::Error)]
pub enum AesGcmError {
    #[error("invalid key length (expected {expected} bytes, got {actual})")]
    InvalidKeyLen { expected: usize, actual: usize },

    #[error("ciphertext too short ({len} bytes, need at least {min})")]
    TooShort { len: usize, min: usize },

    #[error("AES-GCM seal failed")]
    Seal,

    /// Wrong key, wrong associated data or tampered ciphertext.
    #[error("AES-GCM tag mismatch")]
    TagMismatch,
}

/// AES-256-GCM with a random per-call nonce and optional associated data.
#[derive(Debug, Clone, Default)]
pub struct AesGcmAlgorithm {
    aad: Vec<u8>,
}

impl AesGcmAlgorithm {
    /// Cipher without associated data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cipher binding every record to `aad`; both sides must use the same value.
    pub fn with_aad(aad: impl Into<Vec<u8>>) -> Self {
        Self { aad: aad.into() }
    }

    fn cipher(key: &[u8]) -> Result<Aes256Gcm, AesGcmError> {
        Aes256Gcm::new_from_slice(key).map_err(|_| AesGcmError::InvalidKeyLen {
            expected: KEY_LEN,
            actual: key.len(),
        })
    }
}

impl CryptoAlgorithm for AesGcmAlgorithm {
    fn encrypt(&self, data: &[u8], key: &[u8]) -> Result<Vec<u8>, BoxError> {
        let cipher = Self::cipher(key)?;

        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);

        let sealed = cipher
            .encrypt(
                Nonce::from_slice(&nonce),
                Payload {
                    msg: data,
                    aad: &self.aad,
                },
            )
            .map_err(|_| AesGcmError::Seal)?;

        let mut out = Vec::with_capacity(NONCE_LEN + sealed.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&sealed);
        Ok(out)
    }

    fn decrypt(&self, data: &[u8], key: &[u8]) -> Result<Vec<u8>, BoxError> {
        let cipher = Self::cipher(key)?;

        if data.len() < NONCE_LEN + TAG_LEN {
            return Err(AesGcmError::TooShort {
                len: data.len(),
                min: NONCE_LEN + TAG_LEN,
            }
            .into());
        }

        let (nonce, sealed) = data.split_at(NONCE_LEN);
        let plaintext = cipher
            .decrypt(
                Nonce::from_slice(nonce),
                Payload {
                    msg: sealed,
                    aad: &self.aad,
                },
            )
            .map_err(|_| AesGcmError::TagMismatch)?;
        Ok(plaintext)
    }
}
