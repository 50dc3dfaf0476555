//! Per-record generated keys.
//!
//! Every record is sealed with a fresh random data key. The data key is
//! wrapped under a long-lived master key and the wrapped bytes become the
//! record's key reference, so the consumer needs only the master key.

use rand::rngs::OsRng;
use rand::RngCore;
use recseal_crypto::{BoxError, CryptoAlgorithm, KeyProvider, KeyRef, KeyReferenceExtractor};
use tracing::warn;

/// Length of keys produced by [`RandomKeyGenerator::default`].
pub const DEFAULT_KEY_LEN: usize = 32;

/// Source of fresh data keys.
pub trait KeyGenerator: Send + Sync {
    fn generate_key(&self) -> Vec<u8>;
}

/// Draws keys from the operating system RNG.
#[derive(Debug, Clone, Copy)]
pub struct RandomKeyGenerator {
    key_len: usize,
}

impl RandomKeyGenerator {
    pub fn new(key_len: usize) -> Self {
        Self { key_len }
    }

    pub fn key_len(&self) -> usize {
        self.key_len
    }
}

impl Default for RandomKeyGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_LEN)
    }
}

impl KeyGenerator for RandomKeyGenerator {
    fn generate_key(&self) -> Vec<u8> {
        let mut key = vec![0u8; self.key_len];
        OsRng.fill_bytes(&mut key);
        key
    }
}

/// Wraps and unwraps data keys under a master key.
pub trait MasterKeyEncryption: Send + Sync {
    fn encrypt_key(&self, key: &[u8]) -> Result<Vec<u8>, BoxError>;

    /// `None` when the wrapped key cannot be unwrapped.
    fn decrypt_key(&self, wrapped: &[u8]) -> Option<Vec<u8>>;
}

impl<M: MasterKeyEncryption + ?Sized> MasterKeyEncryption for std::sync::Arc<M> {
    fn encrypt_key(&self, key: &[u8]) -> Result<Vec<u8>, BoxError> {
        (**self).encrypt_key(key)
    }

    fn decrypt_key(&self, wrapped: &[u8]) -> Option<Vec<u8>> {
        (**self).decrypt_key(wrapped)
    }
}

/// Master key encryption backed by any [`CryptoAlgorithm`].
pub struct AlgorithmMasterKey<A> {
    algorithm: A,
    master_key: Vec<u8>,
}

impl<A: CryptoAlgorithm> AlgorithmMasterKey<A> {
    pub fn new(algorithm: A, master_key: impl Into<Vec<u8>>) -> Self {
        Self {
            algorithm,
            master_key: master_key.into(),
        }
    }
}

impl<A> std::fmt::Debug for AlgorithmMasterKey<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlgorithmMasterKey")
            .field("master_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl<A: CryptoAlgorithm> MasterKeyEncryption for AlgorithmMasterKey<A> {
    fn encrypt_key(&self, key: &[u8]) -> Result<Vec<u8>, BoxError> {
        self.algorithm.encrypt(key, &self.master_key)
    }

    fn decrypt_key(&self, wrapped: &[u8]) -> Option<Vec<u8>> {
        match self.algorithm.decrypt(wrapped, &self.master_key) {
            Ok(key) => Some(key),
            Err(err) => {
                warn!(error = %err, "failed to unwrap data key");
                None
            }
        }
    }
}

/// Generates a data key per record and returns it wrapped as the key
/// reference. The record key is ignored.
#[derive(Debug, Clone)]
pub struct PerRecordKeyReferenceExtractor<G, M> {
    generator: G,
    master_key: M,
}

impl<G: KeyGenerator, M: MasterKeyEncryption> PerRecordKeyReferenceExtractor<G, M> {
    pub fn new(generator: G, master_key: M) -> Self {
        Self {
            generator,
            master_key,
        }
    }
}

impl<K, G, M> KeyReferenceExtractor<K> for PerRecordKeyReferenceExtractor<G, M>
where
    K: ?Sized,
    G: KeyGenerator,
    M: MasterKeyEncryption,
{
    fn extract_key_reference(&self, _topic: &str, _key: &K) -> Result<Option<KeyRef>, BoxError> {
        let wrapped = self.master_key.encrypt_key(&self.generator.generate_key())?;
        Ok(Some(KeyRef::from(wrapped)))
    }
}

/// Resolves key references produced by [`PerRecordKeyReferenceExtractor`].
#[derive(Debug, Clone)]
pub struct PerRecordKeyProvider<M> {
    master_key: M,
}

impl<M: MasterKeyEncryption> PerRecordKeyProvider<M> {
    pub fn new(master_key: M) -> Self {
        Self { master_key }
    }
}

impl<M: MasterKeyEncryption> KeyProvider for PerRecordKeyProvider<M> {
    fn get_key(&self, key_ref: &KeyRef) -> Option<Vec<u8>> {
        self.master_key.decrypt_key(key_ref.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    /// XORs with the key and appends its first byte as a check byte.
    struct CheckedXor;

    impl CryptoAlgorithm for CheckedXor {
        fn encrypt(&self, data: &[u8], key: &[u8]) -> Result<Vec<u8>, BoxError> {
            if key.is_empty() {
                return Err("empty master key".into());
            }
            let mut out: Vec<u8> = data
                .iter()
                .zip(key.iter().cycle())
                .map(|(d, k)| d ^ k)
                .collect();
            out.push(key[0]);
            Ok(out)
        }

        fn decrypt(&self, data: &[u8], key: &[u8]) -> Result<Vec<u8>, BoxError> {
            match data.split_last() {
                Some((check, body)) if !key.is_empty() && *check == key[0] => Ok(body
                    .iter()
                    .zip(key.iter().cycle())
                    .map(|(d, k)| d ^ k)
                    .collect()),
                _ => Err("check byte mismatch".into()),
            }
        }
    }

    #[test]
    fn random_keys_have_requested_length_and_differ() {
        let generator = RandomKeyGenerator::default();
        let first = generator.generate_key();
        let second = generator.generate_key();

        assert_eq!(first.len(), DEFAULT_KEY_LEN);
        assert_eq!(RandomKeyGenerator::new(16).generate_key().len(), 16);
        assert_ne!(first, second);
    }

    #[test]
    fn wrapped_key_reference_unwraps_to_data_key() {
        let master = Arc::new(AlgorithmMasterKey::new(CheckedXor, vec![0x5a, 0xa5]));
        let extractor =
            PerRecordKeyReferenceExtractor::new(RandomKeyGenerator::default(), Arc::clone(&master));
        let provider = PerRecordKeyProvider::new(Arc::clone(&master));

        let key_ref = extractor
            .extract_key_reference("orders", "ignored")
            .unwrap()
            .unwrap();
        let data_key = provider.get_key(&key_ref).unwrap();

        assert_eq!(data_key.len(), DEFAULT_KEY_LEN);
        assert_eq!(master.encrypt_key(&data_key).unwrap(), key_ref.as_bytes());
    }

    #[test]
    fn every_record_gets_a_fresh_reference() {
        let extractor = PerRecordKeyReferenceExtractor::new(
            RandomKeyGenerator::default(),
            AlgorithmMasterKey::new(CheckedXor, vec![1]),
        );

        let first = extractor.extract_key_reference("t", "k").unwrap();
        let second = extractor.extract_key_reference("t", "k").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn wrong_master_key_resolves_nothing() {
        let extractor = PerRecordKeyReferenceExtractor::new(
            RandomKeyGenerator::default(),
            AlgorithmMasterKey::new(CheckedXor, vec![1]),
        );
        let provider = PerRecordKeyProvider::new(AlgorithmMasterKey::new(CheckedXor, vec![2]));

        let key_ref = extractor.extract_key_reference("t", "k").unwrap().unwrap();
        assert!(provider.get_key(&key_ref).is_none());
    }

    #[test]
    fn wrap_failure_is_an_error_not_plaintext() {
        let extractor = PerRecordKeyReferenceExtractor::new(
            RandomKeyGenerator::default(),
            AlgorithmMasterKey::new(CheckedXor, Vec::new()),
        );
        assert!(extractor.extract_key_reference("t", "k").is_err());
    }

    #[test]
    fn debug_redacts_master_key() {
        let master = AlgorithmMasterKey::new(CheckedXor, vec![0x42]);
        assert!(!format!("{master:?}").contains("66"));
    }
}
