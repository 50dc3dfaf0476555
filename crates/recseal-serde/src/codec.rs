//! Payload codec contract and built-in codecs.

use std::marker::PhantomData;
use std::sync::Arc;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;
use crate::headers::Headers;

/// Turns a value into record bytes.
///
/// `None` in means a null record; `None` out means the record has no payload.
pub trait Serializer<T>: Send + Sync {
    fn serialize(&self, topic: &str, headers: &mut Headers, data: Option<&T>)
        -> Result<Option<Bytes>>;
}

/// Turns record bytes back into a value.
pub trait Deserializer<T>: Send + Sync {
    fn deserialize(&self, topic: &str, headers: &mut Headers, data: Option<Bytes>)
        -> Result<Option<T>>;
}

impl<T, S: Serializer<T> + ?Sized> Serializer<T> for Arc<S> {
    fn serialize(
        &self,
        topic: &str,
        headers: &mut Headers,
        data: Option<&T>,
    ) -> Result<Option<Bytes>> {
        (**self).serialize(topic, headers, data)
    }
}

impl<T, D: Deserializer<T> + ?Sized> Deserializer<T> for Arc<D> {
    fn deserialize(
        &self,
        topic: &str,
        headers: &mut Headers,
        data: Option<Bytes>,
    ) -> Result<Option<T>> {
        (**self).deserialize(topic, headers, data)
    }
}

/// A serializer and deserializer for the same type, shareable across threads.
pub struct Serde<T> {
    serializer: Arc<dyn Serializer<T>>,
    deserializer: Arc<dyn Deserializer<T>>,
}

impl<T: 'static> Serde<T> {
    pub fn new(
        serializer: impl Serializer<T> + 'static,
        deserializer: impl Deserializer<T> + 'static,
    ) -> Self {
        Self {
            serializer: Arc::new(serializer),
            deserializer: Arc::new(deserializer),
        }
    }

    /// Serde backed by one codec implementing both directions.
    pub fn from_codec<C>(codec: C) -> Self
    where
        C: Serializer<T> + Deserializer<T> + 'static,
    {
        let codec = Arc::new(codec);
        Self {
            serializer: codec.clone(),
            deserializer: codec,
        }
    }

    pub fn from_parts(
        serializer: Arc<dyn Serializer<T>>,
        deserializer: Arc<dyn Deserializer<T>>,
    ) -> Self {
        Self {
            serializer,
            deserializer,
        }
    }
}

impl<T> Serde<T> {
    pub fn serializer(&self) -> &Arc<dyn Serializer<T>> {
        &self.serializer
    }

    pub fn deserializer(&self) -> &Arc<dyn Deserializer<T>> {
        &self.deserializer
    }

    pub fn into_parts(self) -> (Arc<dyn Serializer<T>>, Arc<dyn Deserializer<T>>) {
        (self.serializer, self.deserializer)
    }
}

impl<T> Clone for Serde<T> {
    fn clone(&self) -> Self {
        Self {
            serializer: Arc::clone(&self.serializer),
            deserializer: Arc::clone(&self.deserializer),
        }
    }
}

impl<T> std::fmt::Debug for Serde<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Serde").finish_non_exhaustive()
    }
}

impl<T> Serializer<T> for Serde<T> {
    fn serialize(
        &self,
        topic: &str,
        headers: &mut Headers,
        data: Option<&T>,
    ) -> Result<Option<Bytes>> {
        self.serializer.serialize(topic, headers, data)
    }
}

impl<T> Deserializer<T> for Serde<T> {
    fn deserialize(
        &self,
        topic: &str,
        headers: &mut Headers,
        data: Option<Bytes>,
    ) -> Result<Option<T>> {
        self.deserializer.deserialize(topic, headers, data)
    }
}

/// Identity codec over raw bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesSerde;

impl Serializer<Bytes> for BytesSerde {
    fn serialize(&self, _: &str, _: &mut Headers, data: Option<&Bytes>) -> Result<Option<Bytes>> {
        Ok(data.cloned())
    }
}

impl Deserializer<Bytes> for BytesSerde {
    fn deserialize(&self, _: &str, _: &mut Headers, data: Option<Bytes>) -> Result<Option<Bytes>> {
        Ok(data)
    }
}

/// UTF-8 string codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringSerde;

impl Serializer<String> for StringSerde {
    fn serialize(&self, _: &str, _: &mut Headers, data: Option<&String>) -> Result<Option<Bytes>> {
        Ok(data.map(|s| Bytes::copy_from_slice(s.as_bytes())))
    }
}

impl Deserializer<String> for StringSerde {
    fn deserialize(
        &self,
        _: &str,
        _: &mut Headers,
        data: Option<Bytes>,
    ) -> Result<Option<String>> {
        data.map(|bytes| String::from_utf8(bytes.to_vec()))
            .transpose()
            .map_err(Into::into)
    }
}

/// JSON codec for any serde type.
pub struct JsonSerde<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonSerde<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonSerde<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonSerde<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for JsonSerde<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("JsonSerde")
    }
}

impl<T: Serialize> Serializer<T> for JsonSerde<T> {
    fn serialize(&self, _: &str, _: &mut Headers, data: Option<&T>) -> Result<Option<Bytes>> {
        data.map(|value| serde_json::to_vec(value).map(Bytes::from))
            .transpose()
            .map_err(Into::into)
    }
}

impl<T: DeserializeOwned> Deserializer<T> for JsonSerde<T> {
    fn deserialize(&self, _: &str, _: &mut Headers, data: Option<Bytes>) -> Result<Option<T>> {
        data.map(|bytes| serde_json::from_slice::<T>(&bytes))
            .transpose()
            .map_err(Into::into)
    }
}
