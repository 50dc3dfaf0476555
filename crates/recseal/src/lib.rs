//! Transparent record payload encryption.
//!
//! recseal seals serialized record payloads into a self-describing envelope
//! (`magic | key reference length | key reference | ciphertext`) and opens
//! them again, leaving the payload encoding itself untouched.
//!
//! # Crate Structure
//!
//! - [`envelope`]: Wire format and key references
//! - [`crypto`]: Key resolution and cipher traits, encryptor/decryptor façade, AES-256-GCM
//! - [`keys`]: Key repositories, key-name obfuscation, per-record generated keys
//! - [`serde`]: Encrypting serializers, key reference channel, key/value pairing

/// Re-export envelope types.
pub mod envelope {
    pub use recseal_envelope::*;
}

/// Re-export crypto types.
pub mod crypto {
    pub use recseal_crypto::*;
}

/// Re-export key management types.
pub mod keys {
    pub use recseal_keys::*;
}

/// Re-export serializer types.
pub mod serde {
    pub use recseal_serde::*;
}
