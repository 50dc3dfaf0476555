use std::sync::Arc;

use bytes::Bytes;
use recseal_crypto::KeyReferenceExtractor;
use tracing::trace;

use crate::channel::KeyRefChannel;
use crate::codec::Serializer;
use crate::error::{Result, SerdeError};
use crate::headers::Headers;

/// Key-side serializer: derives the record's key reference, publishes it, and
/// delegates serialization to the inner codec unchanged.
///
/// The reference is appended to the metadata under
/// [`KEY_REF_HEADER`](crate::KEY_REF_HEADER) (an absent value when the
/// extractor yields none) and, when a channel is attached, written to the
/// calling thread's slot. A null record has no key reference.
pub struct KeyRefSerializer<K> {
    raw: Arc<dyn Serializer<K>>,
    extractor: Arc<dyn KeyReferenceExtractor<K>>,
    channel: Option<Arc<KeyRefChannel>>,
}

impl<K> KeyRefSerializer<K> {
    pub fn new(raw: Arc<dyn Serializer<K>>, extractor: Arc<dyn KeyReferenceExtractor<K>>) -> Self {
        Self {
            raw,
            extractor,
            channel: None,
        }
    }

    pub fn with_channel(
        raw: Arc<dyn Serializer<K>>,
        extractor: Arc<dyn KeyReferenceExtractor<K>>,
        channel: Arc<KeyRefChannel>,
    ) -> Self {
        Self {
            raw,
            extractor,
            channel: Some(channel),
        }
    }
}

impl<K> Serializer<K> for KeyRefSerializer<K> {
    fn serialize(
        &self,
        topic: &str,
        headers: &mut Headers,
        data: Option<&K>,
    ) -> Result<Option<Bytes>> {
        let key_ref = match data {
            Some(key) => self
                .extractor
                .extract_key_reference(topic, key)
                .map_err(SerdeError::KeyReference)?,
            None => None,
        };
        trace!(topic, present = key_ref.is_some(), "extracted key reference");

        headers.add_key_ref(key_ref.as_ref());
        if let Some(channel) = &self.channel {
            channel.publish(key_ref);
        }
        self.raw.serialize(topic, headers, data)
    }
}

impl<K> std::fmt::Debug for KeyRefSerializer<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyRefSerializer")
            .field("channel", &self.channel)
            .finish_non_exhaustive()
    }
}
