//! Key resolution collaborators for the recseal façade.
//!
//! Two ways of turning key references into key material:
//!
//! - **Named keys** ([`repository`], [`naming`]): a record's key reference is
//!   an obfuscated key name, resolved against a [`KeyRepository`].
//! - **Generated keys** ([`generated`]): every record gets a fresh data key,
//!   wrapped under a master key; the wrapped key *is* the key reference.

pub mod config;
pub mod error;
pub mod generated;
pub mod naming;
pub mod repository;

pub use config::KeyStoreConfig;
pub use error::{KeyStoreError, Result};
pub use generated::{
    AlgorithmMasterKey, KeyGenerator, DEFAULT_KEY_LEN, MasterKeyEncryption, PerRecordKeyProvider,
    PerRecordKeyReferenceExtractor, RandomKeyGenerator,
};
pub use naming::{KeyNameExtractor, KeyNameObfuscator, PlainKeyNames, RepositoryKeyReferenceExtractor};
pub use repository::{KeyRepository, MemoryKeyRepository, RepositoryKeyProvider};
