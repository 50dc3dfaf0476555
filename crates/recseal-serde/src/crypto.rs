use std::sync::Arc;

use bytes::Bytes;
use recseal_crypto::{CodecError, EnvelopeDecoder, EnvelopeEncoder};
use tracing::debug;

use crate::channel::KeyRefChannel;
use crate::codec::{Deserializer, Serializer};
use crate::error::Result;
use crate::headers::Headers;

/// Serializes with an inner codec, then seals the bytes into an envelope.
///
/// With a paired [`KeyRefChannel`], the key reference is whatever the key side
/// left in the calling thread's slot; the slot is taken on every call and an
/// empty slot means no key reference, whatever the metadata says. Without a
/// channel the key reference is read from the record metadata
/// ([`KEY_REF_HEADER`]).
///
/// When the key cannot be resolved or the cipher fails, the record is
/// absent (`Ok(None)`): plaintext is never emitted in place of a sealed
/// payload.
///
/// [`KEY_REF_HEADER`]: crate::KEY_REF_HEADER
pub struct CryptoSerializer<T> {
    raw: Arc<dyn Serializer<T>>,
    encoder: EnvelopeEncoder,
    channel: Option<Arc<KeyRefChannel>>,
}

impl<T> CryptoSerializer<T> {
    /// Serializer reading the key reference from metadata only.
    pub fn new(raw: Arc<dyn Serializer<T>>, encoder: EnvelopeEncoder) -> Self {
        Self {
            raw,
            encoder,
            channel: None,
        }
    }

    /// Serializer taking the key reference from `channel` only.
    pub fn with_channel(
        raw: Arc<dyn Serializer<T>>,
        encoder: EnvelopeEncoder,
        channel: Arc<KeyRefChannel>,
    ) -> Self {
        Self {
            raw,
            encoder,
            channel: Some(channel),
        }
    }
}

impl<T> Serializer<T> for CryptoSerializer<T> {
    fn serialize(
        &self,
        topic: &str,
        headers: &mut Headers,
        data: Option<&T>,
    ) -> Result<Option<Bytes>> {
        let pending = self.channel.as_ref().map(|channel| channel.take());

        let Some(serialized) = self.raw.serialize(topic, headers, data)? else {
            return Ok(None);
        };

        // Inbound metadata may still carry the reference of a consumed record.
        let key_ref = match pending {
            Some(slot) => slot,
            None => headers.key_ref(),
        };
        match self.encoder.encode(serialized, key_ref.as_ref()) {
            Ok(sealed) => Ok(Some(sealed)),
            Err(CodecError::Crypto(err)) => {
                debug!(topic, error = %err, "record dropped, no encrypted output");
                Ok(None)
            }
            Err(CodecError::Envelope(err)) => Err(err.into()),
        }
    }
}

impl<T> std::fmt::Debug for CryptoSerializer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptoSerializer")
            .field("encoder", &self.encoder)
            .field("channel", &self.channel)
            .finish_non_exhaustive()
    }
}

/// Opens envelopes, then deserializes the plaintext with an inner codec.
///
/// After a successful inner call the frame's key reference is appended to the
/// metadata, including when decryption failed (the inner codec then receives
/// `None`). Unframed and plain-framed payloads append an absent key reference.
pub struct CryptoDeserializer<T> {
    raw: Arc<dyn Deserializer<T>>,
    decoder: EnvelopeDecoder,
}

impl<T> CryptoDeserializer<T> {
    pub fn new(raw: Arc<dyn Deserializer<T>>, decoder: EnvelopeDecoder) -> Self {
        Self { raw, decoder }
    }
}

impl<T> Deserializer<T> for CryptoDeserializer<T> {
    fn deserialize(
        &self,
        topic: &str,
        headers: &mut Headers,
        data: Option<Bytes>,
    ) -> Result<Option<T>> {
        let Some(data) = data else {
            return Ok(None);
        };

        let (payload, key_ref) = self.decoder.decode(data)?.into_parts();
        let value = self.raw.deserialize(topic, headers, payload)?;
        headers.add_key_ref(key_ref.as_ref());
        Ok(value)
    }
}

impl<T> std::fmt::Debug for CryptoDeserializer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptoDeserializer")
            .field("decoder", &self.decoder)
            .finish_non_exhaustive()
    }
}
