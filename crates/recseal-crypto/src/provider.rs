use std::collections::HashMap;
use std::sync::Arc;

use recseal_envelope::KeyRef;

use crate::error::BoxError;

/// Resolves a key reference into key material.
///
/// Returning `None` means "not found": the façade turns it into
/// [`CryptoError::KeyNotFound`](crate::CryptoError::KeyNotFound) and never
/// falls back to plaintext.
pub trait KeyProvider: Send + Sync {
    fn get_key(&self, key_ref: &KeyRef) -> Option<Vec<u8>>;
}

/// Raw symmetric transform over key material.
///
/// Implementations may use per-call randomness (nonces); errors are reported
/// back to the façade, which logs them and drops the record.
pub trait CryptoAlgorithm: Send + Sync {
    /// Encrypt `data` with `key`.
    fn encrypt(&self, data: &[u8], key: &[u8]) -> Result<Vec<u8>, BoxError>;

    /// Decrypt `data` with `key`.
    fn decrypt(&self, data: &[u8], key: &[u8]) -> Result<Vec<u8>, BoxError>;
}

/// Computes the key reference of a record from its topic and record key.
///
/// `Ok(None)` means the record is sent unencrypted. An error means no key
/// reference could be produced and the record must not be sent. Closures of
/// the shape `Fn(&str, &K) -> Option<KeyRef>` implement this trait.
pub trait KeyReferenceExtractor<K: ?Sized>: Send + Sync {
    fn extract_key_reference(&self, topic: &str, key: &K) -> Result<Option<KeyRef>, BoxError>;
}

impl<K, F> KeyReferenceExtractor<K> for F
where
    K: ?Sized,
    F: Fn(&str, &K) -> Option<KeyRef> + Send + Sync,
{
    fn extract_key_reference(&self, topic: &str, key: &K) -> Result<Option<KeyRef>, BoxError> {
        Ok(self(topic, key))
    }
}

impl<P: KeyProvider + ?Sized> KeyProvider for Arc<P> {
    fn get_key(&self, key_ref: &KeyRef) -> Option<Vec<u8>> {
        (**self).get_key(key_ref)
    }
}

impl KeyProvider for HashMap<KeyRef, Vec<u8>> {
    fn get_key(&self, key_ref: &KeyRef) -> Option<Vec<u8>> {
        self.get(key_ref).cloned()
    }
}

impl<A: CryptoAlgorithm + ?Sized> CryptoAlgorithm for Arc<A> {
    fn encrypt(&self, data: &[u8], key: &[u8]) -> Result<Vec<u8>, BoxError> {
        (**self).encrypt(data, key)
    }

    fn decrypt(&self, data: &[u8], key: &[u8]) -> Result<Vec<u8>, BoxError> {
        (**self).decrypt(data, key)
    }
}
