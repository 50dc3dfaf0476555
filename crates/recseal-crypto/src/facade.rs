use recseal_envelope::KeyRef;
use tracing::{error, warn};

use crate::error::CryptoError;
use crate::provider::{CryptoAlgorithm, KeyProvider};

/// Encrypts a payload under the key a reference resolves to.
pub trait Encryptor: Send + Sync {
    fn encrypt(&self, plaintext: &[u8], key_ref: &KeyRef) -> Result<Vec<u8>, CryptoError>;
}

/// Decrypts a payload under the key a reference resolves to.
pub trait Decryptor: Send + Sync {
    fn decrypt(&self, ciphertext: &[u8], key_ref: &KeyRef) -> Result<Vec<u8>, CryptoError>;
}

/// Resolves the key through a [`KeyProvider`] and encrypts with a [`CryptoAlgorithm`].
#[derive(Debug, Clone)]
pub struct DefaultEncryptor<P, A> {
    key_provider: P,
    algorithm: A,
}

impl<P: KeyProvider, A: CryptoAlgorithm> DefaultEncryptor<P, A> {
    pub fn new(key_provider: P, algorithm: A) -> Self {
        Self {
            key_provider,
            algorithm,
        }
    }
}

impl<P: KeyProvider, A: CryptoAlgorithm> Encryptor for DefaultEncryptor<P, A> {
    fn encrypt(&self, plaintext: &[u8], key_ref: &KeyRef) -> Result<Vec<u8>, CryptoError> {
        let Some(key) = self.key_provider.get_key(key_ref) else {
            warn!(%key_ref, "no key found for key reference");
            return Err(CryptoError::KeyNotFound {
                key_ref: key_ref.clone(),
            });
        };

        self.algorithm.encrypt(plaintext, &key).map_err(|source| {
            error!(%key_ref, error = %source, "error while encrypting data");
            CryptoError::CipherFailure {
                key_ref: key_ref.clone(),
                source,
            }
        })
    }
}

/// Resolves the key through a [`KeyProvider`] and decrypts with a [`CryptoAlgorithm`].
#[derive(Debug, Clone)]
pub struct DefaultDecryptor<P, A> {
    key_provider: P,
    algorithm: A,
}

impl<P: KeyProvider, A: CryptoAlgorithm> DefaultDecryptor<P, A> {
    pub fn new(key_provider: P, algorithm: A) -> Self {
        Self {
            key_provider,
            algorithm,
        }
    }
}

impl<P: KeyProvider, A: CryptoAlgorithm> Decryptor for DefaultDecryptor<P, A> {
    fn decrypt(&self, ciphertext: &[u8], key_ref: &KeyRef) -> Result<Vec<u8>, CryptoError> {
        let Some(key) = self.key_provider.get_key(key_ref) else {
            warn!(%key_ref, "no key found, record cannot be decrypted");
            return Err(CryptoError::KeyNotFound {
                key_ref: key_ref.clone(),
            });
        };

        self.algorithm.decrypt(ciphertext, &key).map_err(|source| {
            error!(%key_ref, error = %source, "error while decrypting data");
            CryptoError::CipherFailure {
                key_ref: key_ref.clone(),
                source,
            }
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::error::BoxError;

    const TAG: &[u8] = b"xor:";

    /// XOR with the key behind a fixed tag; decrypt rejects untagged input.
    #[derive(Default)]
    pub(crate) struct XorAlgorithm {
        pub(crate) calls: AtomicUsize,
    }

    impl CryptoAlgorithm for XorAlgorithm {
        fn encrypt(&self, data: &[u8], key: &[u8]) -> Result<Vec<u8>, BoxError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut out = TAG.to_vec();
            out.extend(data.iter().zip(key.iter().cycle()).map(|(d, k)| d ^ k));
            Ok(out)
        }

        fn decrypt(&self, data: &[u8], key: &[u8]) -> Result<Vec<u8>, BoxError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let body = data.strip_prefix(TAG).ok_or("missing xor tag")?;
            Ok(body
                .iter()
                .zip(key.iter().cycle())
                .map(|(d, k)| d ^ k)
                .collect())
        }
    }

    pub(crate) fn keys() -> HashMap<KeyRef, Vec<u8>> {
        HashMap::from([
            (KeyRef::from("K1"), vec![0x11, 0x22, 0x33]),
            (KeyRef::from("acct-7"), vec![0x07]),
        ])
    }

    #[test]
    fn encrypt_then_decrypt() {
        let algorithm = Arc::new(XorAlgorithm::default());
        let encryptor = DefaultEncryptor::new(keys(), Arc::clone(&algorithm));
        let decryptor = DefaultDecryptor::new(keys(), Arc::clone(&algorithm));
        let key_ref = KeyRef::from("K1");

        let ciphertext = encryptor.encrypt(b"hello", &key_ref).unwrap();
        assert_ne!(ciphertext.as_slice(), b"hello");

        let plaintext = decryptor.decrypt(&ciphertext, &key_ref).unwrap();
        assert_eq!(plaintext, b"hello");
        assert_eq!(algorithm.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn encrypt_with_unknown_key_is_key_not_found() {
        let algorithm = Arc::new(XorAlgorithm::default());
        let encryptor = DefaultEncryptor::new(keys(), Arc::clone(&algorithm));

        let err = encryptor
            .encrypt(b"hello", &KeyRef::from("missing"))
            .unwrap_err();

        assert!(matches!(err, CryptoError::KeyNotFound { .. }));
        assert_eq!(err.key_ref(), &KeyRef::from("missing"));
        assert_eq!(algorithm.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn decrypt_with_unknown_key_is_key_not_found() {
        let decryptor = DefaultDecryptor::new(keys(), XorAlgorithm::default());
        let err = decryptor
            .decrypt(b"xor:abc", &KeyRef::from("missing"))
            .unwrap_err();
        assert!(matches!(err, CryptoError::KeyNotFound { .. }));
    }

    #[test]
    fn cipher_error_becomes_cipher_failure() {
        let decryptor = DefaultDecryptor::new(keys(), XorAlgorithm::default());
        let err = decryptor
            .decrypt(b"garbage", &KeyRef::from("K1"))
            .unwrap_err();

        match err {
            CryptoError::CipherFailure { key_ref, source } => {
                assert_eq!(key_ref, KeyRef::from("K1"));
                assert_eq!(source.to_string(), "missing xor tag");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn facade_is_usable_as_trait_object() {
        let encryptor: Arc<dyn Encryptor> =
            Arc::new(DefaultEncryptor::new(keys(), XorAlgorithm::default()));
        assert!(encryptor.encrypt(b"x", &KeyRef::from("acct-7")).is_ok());
    }
}
