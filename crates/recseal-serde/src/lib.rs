//! Encrypting serializers for record-oriented pipelines.
//!
//! [`CryptoSerializer`] and [`CryptoDeserializer`] wrap any payload codec with
//! the envelope format from `recseal-envelope`. The key reference of a record
//! reaches the value serializer in one of two ways:
//!
//! - through a [`KeyRefChannel`], a per-pair, per-thread slot filled by the
//!   key-side [`KeyRefSerializer`]; a paired value serializer reads only the
//!   slot, so metadata carried over from a consumed record cannot override it
//! - through record metadata ([`Headers`], entry [`KEY_REF_HEADER`]) when the
//!   value serializer has no channel
//!
//! [`CryptoSerdeFactory`] and [`CryptoSerializerPairFactory`] do the wiring.

pub mod channel;
pub mod codec;
pub mod crypto;
pub mod error;
pub mod headers;
pub mod pairing;
pub mod wrapper;

pub use channel::KeyRefChannel;
pub use codec::{BytesSerde, Deserializer, JsonSerde, Serde, Serializer, StringSerde};
pub use crypto::{CryptoDeserializer, CryptoSerializer};
pub use error::{Result, SerdeError};
pub use headers::{Header, Headers, KEY_REF_HEADER};
pub use pairing::{CryptoSerdeFactory, CryptoSerializerPairFactory, SerdePair, SerializerPair};
pub use wrapper::KeyRefSerializer;
