//! Factories wiring key-side and value-side codecs together.

use std::sync::Arc;

use recseal_crypto::{Decryptor, Encryptor, EnvelopeDecoder, EnvelopeEncoder, KeyReferenceExtractor};
use tracing::debug;

use crate::channel::KeyRefChannel;
use crate::codec::{Serde, Serializer};
use crate::crypto::{CryptoDeserializer, CryptoSerializer};
use crate::wrapper::KeyRefSerializer;

/// Key and value serdes built together by [`CryptoSerdeFactory::build_serde_pair`].
pub struct SerdePair<K, V> {
    key: Serde<K>,
    value: Serde<V>,
}

impl<K, V> SerdePair<K, V> {
    pub fn key_serde(&self) -> &Serde<K> {
        &self.key
    }

    pub fn value_serde(&self) -> &Serde<V> {
        &self.value
    }

    pub fn into_parts(self) -> (Serde<K>, Serde<V>) {
        (self.key, self.value)
    }
}

impl<K, V> Clone for SerdePair<K, V> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            value: self.value.clone(),
        }
    }
}

impl<K, V> std::fmt::Debug for SerdePair<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerdePair")
            .field("key", &self.key)
            .field("value", &self.value)
            .finish()
    }
}

/// Builds encrypting serdes sharing one encryptor, decryptor and key
/// reference extractor.
///
/// Every [`build_serde_pair`](Self::build_serde_pair) and
/// [`build_self_aware_serde`](Self::build_self_aware_serde) call creates a
/// fresh [`KeyRefChannel`], so pairs never observe each other's references.
pub struct CryptoSerdeFactory<E> {
    encryptor: Arc<dyn Encryptor>,
    decryptor: Arc<dyn Decryptor>,
    extractor: Arc<E>,
}

impl<E: Send + Sync + 'static> CryptoSerdeFactory<E> {
    pub fn new(encryptor: Arc<dyn Encryptor>, decryptor: Arc<dyn Decryptor>, extractor: E) -> Self {
        Self {
            encryptor,
            decryptor,
            extractor: Arc::new(extractor),
        }
    }

    /// Encrypting serde over `raw` with no key-side participant: the key
    /// reference is read from record metadata only.
    pub fn build_from<T: 'static>(&self, raw: Serde<T>) -> Serde<T> {
        self.wrap(raw, None)
    }

    /// Key serde publishing the key reference and value serde sealing with it.
    ///
    /// The key deserializer is left as is; only values are encrypted.
    pub fn build_serde_pair<K, V>(&self, key_serde: Serde<K>, value_serde: Serde<V>) -> SerdePair<K, V>
    where
        K: 'static,
        V: 'static,
        E: KeyReferenceExtractor<K>,
    {
        let channel = Arc::new(KeyRefChannel::new());
        debug!(channel = channel.id(), "building key/value serde pair");

        let (key_serializer, key_deserializer) = key_serde.into_parts();
        let key_serializer: Arc<dyn Serializer<K>> = Arc::new(KeyRefSerializer::with_channel(
            key_serializer,
            self.extractor(),
            Arc::clone(&channel),
        ));
        let key = Serde::from_parts(key_serializer, key_deserializer);
        let value = self.wrap(value_serde, Some(channel));

        SerdePair { key, value }
    }

    /// Encrypting serde deriving the key reference from the value it serializes.
    pub fn build_self_aware_serde<V>(&self, value_serde: Serde<V>) -> Serde<V>
    where
        V: 'static,
        E: KeyReferenceExtractor<V>,
    {
        let channel = Arc::new(KeyRefChannel::new());
        debug!(channel = channel.id(), "building self-aware serde");

        let (serializer, deserializer) = self
            .wrap(value_serde, Some(Arc::clone(&channel)))
            .into_parts();
        let serializer: Arc<dyn Serializer<V>> = Arc::new(KeyRefSerializer::with_channel(
            serializer,
            self.extractor(),
            channel,
        ));
        Serde::from_parts(serializer, deserializer)
    }

    fn wrap<T: 'static>(&self, raw: Serde<T>, channel: Option<Arc<KeyRefChannel>>) -> Serde<T> {
        let (serializer, deserializer) = raw.into_parts();
        let encoder = EnvelopeEncoder::new(Arc::clone(&self.encryptor));
        let serializer = match channel {
            Some(channel) => CryptoSerializer::with_channel(serializer, encoder, channel),
            None => CryptoSerializer::new(serializer, encoder),
        };
        let deserializer =
            CryptoDeserializer::new(deserializer, EnvelopeDecoder::new(Arc::clone(&self.decryptor)));
        Serde::new(serializer, deserializer)
    }

    fn extractor<K>(&self) -> Arc<dyn KeyReferenceExtractor<K>>
    where
        E: KeyReferenceExtractor<K>,
    {
        Arc::clone(&self.extractor) as Arc<dyn KeyReferenceExtractor<K>>
    }
}

impl<E> std::fmt::Debug for CryptoSerdeFactory<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptoSerdeFactory").finish_non_exhaustive()
    }
}

/// Key and value serializers built by [`CryptoSerializerPairFactory::build`].
pub struct SerializerPair<K, V> {
    key: Arc<dyn Serializer<K>>,
    value: Arc<dyn Serializer<V>>,
}

impl<K, V> SerializerPair<K, V> {
    pub fn key_serializer(&self) -> &Arc<dyn Serializer<K>> {
        &self.key
    }

    pub fn value_serializer(&self) -> &Arc<dyn Serializer<V>> {
        &self.value
    }

    pub fn into_parts(self) -> (Arc<dyn Serializer<K>>, Arc<dyn Serializer<V>>) {
        (self.key, self.value)
    }
}

impl<K, V> Clone for SerializerPair<K, V> {
    fn clone(&self) -> Self {
        Self {
            key: Arc::clone(&self.key),
            value: Arc::clone(&self.value),
        }
    }
}

impl<K, V> std::fmt::Debug for SerializerPair<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerializerPair").finish_non_exhaustive()
    }
}

/// Producer-side pairing: the key serializer hands the key reference to the
/// value serializer through record metadata only, with no channel.
///
/// Suitable for producers that pass the same [`Headers`](crate::Headers) to
/// the key and value calls of a record.
pub struct CryptoSerializerPairFactory<E> {
    encryptor: Arc<dyn Encryptor>,
    extractor: Arc<E>,
}

impl<E: Send + Sync + 'static> CryptoSerializerPairFactory<E> {
    pub fn new(encryptor: Arc<dyn Encryptor>, extractor: E) -> Self {
        Self {
            encryptor,
            extractor: Arc::new(extractor),
        }
    }

    pub fn build<K, V>(
        &self,
        key_serializer: Arc<dyn Serializer<K>>,
        value_serializer: Arc<dyn Serializer<V>>,
    ) -> SerializerPair<K, V>
    where
        K: 'static,
        V: 'static,
        E: KeyReferenceExtractor<K>,
    {
        let extractor = Arc::clone(&self.extractor) as Arc<dyn KeyReferenceExtractor<K>>;
        SerializerPair {
            key: Arc::new(KeyRefSerializer::new(key_serializer, extractor)),
            value: Arc::new(CryptoSerializer::new(
                value_serializer,
                EnvelopeEncoder::new(Arc::clone(&self.encryptor)),
            )),
        }
    }
}

impl<E> std::fmt::Debug for CryptoSerializerPairFactory<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptoSerializerPairFactory")
            .finish_non_exhaustive()
    }
}
