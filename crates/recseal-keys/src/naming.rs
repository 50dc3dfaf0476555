use recseal_crypto::{BoxError, KeyRef, KeyReferenceExtractor};

/// Converts key names to key references and back.
///
/// Key references travel in clear next to the ciphertext, so deployments that
/// do not want to reveal key names plug in a reversible obfuscation here.
pub trait KeyNameObfuscator: Send + Sync {
    fn obfuscate(&self, key_name: &str) -> KeyRef;

    /// `None` when the reference does not decode to a key name.
    fn unobfuscate(&self, key_ref: &KeyRef) -> Option<String>;
}

/// Uses the UTF-8 key name itself as the key reference.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainKeyNames;

impl KeyNameObfuscator for PlainKeyNames {
    fn obfuscate(&self, key_name: &str) -> KeyRef {
        KeyRef::from(key_name)
    }

    fn unobfuscate(&self, key_ref: &KeyRef) -> Option<String> {
        std::str::from_utf8(key_ref.as_bytes())
            .ok()
            .map(str::to_string)
    }
}

/// Derives the key name of a record from its topic and record key.
///
/// `None` means the record is not encrypted.
pub trait KeyNameExtractor<K: ?Sized>: Send + Sync {
    fn extract_key_name(&self, topic: &str, key: &K) -> Option<String>;
}

impl<K, F> KeyNameExtractor<K> for F
where
    K: ?Sized,
    F: Fn(&str, &K) -> Option<String> + Send + Sync,
{
    fn extract_key_name(&self, topic: &str, key: &K) -> Option<String> {
        self(topic, key)
    }
}

/// Key reference extractor for repository-backed keys: extracts a key name and
/// obfuscates it.
#[derive(Debug, Clone)]
pub struct RepositoryKeyReferenceExtractor<N, O> {
    name_extractor: N,
    obfuscator: O,
}

impl<N, O: KeyNameObfuscator> RepositoryKeyReferenceExtractor<N, O> {
    pub fn new(name_extractor: N, obfuscator: O) -> Self {
        Self {
            name_extractor,
            obfuscator,
        }
    }
}

impl<K, N, O> KeyReferenceExtractor<K> for RepositoryKeyReferenceExtractor<N, O>
where
    K: ?Sized,
    N: KeyNameExtractor<K>,
    O: KeyNameObfuscator,
{
    fn extract_key_reference(&self, topic: &str, key: &K) -> Result<Option<KeyRef>, BoxError> {
        Ok(self
            .name_extractor
            .extract_key_name(topic, key)
            .map(|name| self.obfuscator.obfuscate(&name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Swaps the first and last byte of the name.
    struct SwapEnds;

    impl KeyNameObfuscator for SwapEnds {
        fn obfuscate(&self, key_name: &str) -> KeyRef {
            let mut bytes = key_name.as_bytes().to_vec();
            if let Some(last) = bytes.len().checked_sub(1) {
                bytes.swap(0, last);
            }
            KeyRef::from(bytes)
        }

        fn unobfuscate(&self, key_ref: &KeyRef) -> Option<String> {
            let mut bytes = key_ref.as_bytes().to_vec();
            if let Some(last) = bytes.len().checked_sub(1) {
                bytes.swap(0, last);
            }
            String::from_utf8(bytes).ok()
        }
    }

    #[test]
    fn plain_names_round_trip() {
        let key_ref = PlainKeyNames.obfuscate("acct-7");
        assert_eq!(key_ref.as_bytes(), b"acct-7");
        assert_eq!(PlainKeyNames.unobfuscate(&key_ref).as_deref(), Some("acct-7"));
    }

    #[test]
    fn plain_names_reject_non_utf8() {
        assert!(PlainKeyNames
            .unobfuscate(&KeyRef::from(vec![0xff, 0xfe]))
            .is_none());
    }

    #[test]
    fn extractor_obfuscates_extracted_name() {
        let extractor = RepositoryKeyReferenceExtractor::new(
            |topic: &str, key: &String| Some(format!("{topic}.{key}")),
            SwapEnds,
        );

        let key_ref = extractor
            .extract_key_reference("orders", &"acct".to_string())
            .unwrap()
            .unwrap();

        assert_eq!(key_ref.as_bytes(), b"trders.acco");
        assert_eq!(SwapEnds.unobfuscate(&key_ref).as_deref(), Some("orders.acct"));
    }

    #[test]
    fn extractor_without_name_yields_no_reference() {
        let extractor =
            RepositoryKeyReferenceExtractor::new(|_: &str, _: &str| None::<String>, PlainKeyNames);
        assert!(extractor
            .extract_key_reference("orders", "anon")
            .unwrap()
            .is_none());
    }
}
