//! Envelope wire format for encrypted record payloads.
//!
//! Every encrypted payload is framed with:
//! - A 6-byte magic marker (`2B 45 2B 1B 2B 46`)
//! - A 4-byte big-endian key reference length
//! - The key reference itself
//! - The ciphertext (or plaintext when the key reference length is zero)
//!
//! Bytes that do not start with the magic marker are raw plaintext, so readers
//! stay compatible with producers that never encrypted anything.

pub mod codec;
pub mod error;
pub mod key_ref;

pub use codec::{
    decode_envelope, encode_plain, encode_sealed, has_magic, Envelope, HEADER_SIZE, MAGIC,
};
pub use error::{EnvelopeError, Result};
pub use key_ref::KeyRef;
