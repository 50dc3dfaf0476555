use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use recseal_crypto::{KeyProvider, KeyRef};
use tracing::{debug, warn};

use crate::config::KeyStoreConfig;
use crate::error::{KeyStoreError, Result};
use crate::naming::KeyNameObfuscator;

const KEY_FILE_SUFFIX: &str = ".key";

/// Name-keyed store of key material.
pub trait KeyRepository: Send + Sync {
    fn get_key(&self, name: &str) -> Option<Vec<u8>>;
}

impl<R: KeyRepository + ?Sized> KeyRepository for Arc<R> {
    fn get_key(&self, name: &str) -> Option<Vec<u8>> {
        (**self).get_key(name)
    }
}

/// In-memory key repository.
///
/// Keys can be inserted directly, embedded as hex strings, or loaded from a
/// directory of `<name>.key` files holding hex-encoded key material.
pub struct MemoryKeyRepository {
    keys: HashMap<String, Vec<u8>>,
    config: KeyStoreConfig,
}

impl MemoryKeyRepository {
    /// Create an empty repository with default config.
    pub fn new() -> Self {
        Self::with_config(KeyStoreConfig::default())
    }

    /// Create an empty repository with explicit config.
    pub fn with_config(config: KeyStoreConfig) -> Self {
        Self {
            keys: HashMap::new(),
            config,
        }
    }

    /// Register raw key material under `name`, replacing any previous key.
    pub fn insert(&mut self, name: &str, key: Vec<u8>) -> Result<()> {
        validate_name(name)?;
        self.validate_key(name, &key)?;
        self.keys.insert(name.to_string(), key);
        Ok(())
    }

    /// Register a hex-encoded key under `name`.
    pub fn insert_hex(&mut self, name: &str, key_hex: &str) -> Result<()> {
        let key = hex::decode(key_hex.trim()).map_err(|source| KeyStoreError::InvalidHex {
            name: name.to_string(),
            source,
        })?;
        self.insert(name, key)
    }

    /// Load from embedded `(name, hex)` pairs.
    pub fn from_embedded(keys: &[(&str, &str)]) -> Result<Self> {
        let mut repository = Self::new();
        for (name, key_hex) in keys {
            repository.insert_hex(name, key_hex)?;
        }
        Ok(repository)
    }

    /// Load keys from a directory.
    pub fn from_directory(path: &Path) -> Result<Self> {
        Self::from_directory_with_config(path, KeyStoreConfig::default())
    }

    /// Load keys from a directory with explicit config.
    pub fn from_directory_with_config(path: &Path, config: KeyStoreConfig) -> Result<Self> {
        let mut repository = Self::with_config(config);
        let mut loaded_key_count = 0usize;

        let entries = std::fs::read_dir(path)
            .map_err(|err| KeyStoreError::LoadFailed(format!("{}: {err}", path.display())))?;

        for entry in entries {
            let entry = entry.map_err(|err| KeyStoreError::LoadFailed(err.to_string()))?;
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();
            let Some(name) = file_name
                .strip_suffix(KEY_FILE_SUFFIX)
                .filter(|name| !name.is_empty())
            else {
                continue;
            };
            let entry_path = entry.path();
            let path_metadata = std::fs::symlink_metadata(&entry_path)
                .map_err(|err| KeyStoreError::LoadFailed(err.to_string()))?;
            let file_type = path_metadata.file_type();

            if file_type.is_symlink() {
                return Err(KeyStoreError::LoadFailed(format!(
                    "refusing to load key symlink: {file_name}"
                )));
            }
            if !file_type.is_file() {
                continue;
            }

            loaded_key_count = loaded_key_count.saturating_add(1);
            if loaded_key_count > repository.config.max_keys_from_directory {
                return Err(KeyStoreError::LoadFailed(format!(
                    "key count exceeds configured max ({}): {}",
                    repository.config.max_keys_from_directory, loaded_key_count
                )));
            }

            let file = std::fs::File::open(&entry_path).map_err(|err| {
                KeyStoreError::LoadFailed(format!(
                    "failed opening key {}: {err}",
                    entry_path.display()
                ))
            })?;
            let opened_metadata = file
                .metadata()
                .map_err(|err| KeyStoreError::LoadFailed(err.to_string()))?;

            #[cfg(unix)]
            {
                if !same_file_identity(&path_metadata, &opened_metadata) {
                    return Err(KeyStoreError::LoadFailed(format!(
                        "key file changed during load: {file_name}"
                    )));
                }
            }

            let max_bytes = repository.config.max_key_file_size;
            if opened_metadata.len() > max_bytes as u64 {
                return Err(KeyStoreError::LoadFailed(format!(
                    "key file too large ({} bytes): {file_name}",
                    opened_metadata.len()
                )));
            }

            let read_limit = u64::try_from(max_bytes.saturating_add(1)).unwrap_or(u64::MAX);
            let mut content = String::new();
            file.take(read_limit)
                .read_to_string(&mut content)
                .map_err(|err| {
                    KeyStoreError::LoadFailed(format!(
                        "failed reading key {}: {err}",
                        entry_path.display()
                    ))
                })?;
            if content.len() > max_bytes {
                return Err(KeyStoreError::LoadFailed(format!(
                    "key file too large while reading: {file_name}"
                )));
            }

            repository.insert_hex(name, &content)?;
            debug!(name, "loaded key");
        }

        Ok(repository)
    }

    /// Check if a key is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.keys.contains_key(name)
    }

    /// Registered key names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.keys.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Get repository configuration.
    pub fn config(&self) -> &KeyStoreConfig {
        &self.config
    }

    fn validate_key(&self, name: &str, key: &[u8]) -> Result<()> {
        let expected = self.config.key_len.unwrap_or(key.len().max(1));
        if key.len() != expected {
            return Err(KeyStoreError::InvalidKeyLen {
                name: name.to_string(),
                expected,
                actual: key.len(),
            });
        }
        Ok(())
    }
}

impl Default for MemoryKeyRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryKeyRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryKeyRepository")
            .field("names", &self.names())
            .field("config", &self.config)
            .finish()
    }
}

impl KeyRepository for MemoryKeyRepository {
    fn get_key(&self, name: &str) -> Option<Vec<u8>> {
        self.keys.get(name).cloned()
    }
}

/// Resolves key references by unobfuscating them into key names and looking
/// the names up in a [`KeyRepository`].
#[derive(Debug, Clone)]
pub struct RepositoryKeyProvider<R, O> {
    repository: R,
    obfuscator: O,
}

impl<R: KeyRepository, O: KeyNameObfuscator> RepositoryKeyProvider<R, O> {
    pub fn new(repository: R, obfuscator: O) -> Self {
        Self {
            repository,
            obfuscator,
        }
    }
}

impl<R: KeyRepository, O: KeyNameObfuscator> KeyProvider for RepositoryKeyProvider<R, O> {
    fn get_key(&self, key_ref: &KeyRef) -> Option<Vec<u8>> {
        let Some(name) = self.obfuscator.unobfuscate(key_ref) else {
            warn!(%key_ref, "key reference does not map to a key name");
            return None;
        };
        self.repository.get_key(&name)
    }
}

fn validate_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if valid {
        Ok(())
    } else {
        Err(KeyStoreError::InvalidName(name.to_string()))
    }
}

#[cfg(unix)]
fn same_file_identity(
    path_metadata: &std::fs::Metadata,
    opened_metadata: &std::fs::Metadata,
) -> bool {
    use std::os::unix::fs::MetadataExt;
    path_metadata.dev() == opened_metadata.dev() && path_metadata.ino() == opened_metadata.ino()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::naming::PlainKeyNames;

    const KEY_A: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";
    const KEY_B: &str = "1f1e1d1c1b1a191817161514131211100f0e0d0c0b0a09080706050403020100";

    #[test]
    fn insert_and_lookup() {
        let mut repository = MemoryKeyRepository::new();
        repository.insert("acct-7", vec![7u8; 32]).unwrap();

        assert_eq!(repository.get_key("acct-7"), Some(vec![7u8; 32]));
        assert_eq!(repository.get_key("acct-8"), None);
        assert!(repository.contains("acct-7"));
        assert_eq!(repository.len(), 1);
    }

    #[test]
    fn rejects_wrong_key_length() {
        let mut repository = MemoryKeyRepository::new();
        assert!(matches!(
            repository.insert("short", vec![1, 2, 3]),
            Err(KeyStoreError::InvalidKeyLen {
                expected: 32,
                actual: 3,
                ..
            })
        ));
    }

    #[test]
    fn any_length_when_unconstrained() {
        let mut repository = MemoryKeyRepository::with_config(KeyStoreConfig {
            key_len: None,
            ..KeyStoreConfig::default()
        });
        repository.insert("short", vec![1, 2, 3]).unwrap();
        assert!(matches!(
            repository.insert("empty", Vec::new()),
            Err(KeyStoreError::InvalidKeyLen { .. })
        ));
    }

    #[test]
    fn rejects_invalid_names() {
        let mut repository = MemoryKeyRepository::new();
        assert!(matches!(
            repository.insert("../escape", vec![0u8; 32]),
            Err(KeyStoreError::InvalidName(_))
        ));
        assert!(matches!(
            repository.insert("", vec![0u8; 32]),
            Err(KeyStoreError::InvalidName(_))
        ));
    }

    #[test]
    fn from_embedded_loads_hex() {
        let repository = MemoryKeyRepository::from_embedded(&[("a", KEY_A), ("b", KEY_B)]).unwrap();

        assert_eq!(repository.names(), vec!["a", "b"]);
        assert_eq!(repository.get_key("a").unwrap()[1], 0x01);
    }

    #[test]
    fn from_embedded_rejects_bad_hex() {
        assert!(matches!(
            MemoryKeyRepository::from_embedded(&[("a", "zz")]),
            Err(KeyStoreError::InvalidHex { .. })
        ));
    }

    #[test]
    fn from_directory_loads_key_files() {
        let dir = make_temp_key_dir("from-directory");
        write_key(&dir, "acct-7.key", &format!("{KEY_A}\n"));
        write_key(&dir, "acct-8.key", KEY_B);
        write_key(&dir, "README.txt", "not a key");

        let repository = MemoryKeyRepository::from_directory(&dir).unwrap();
        assert_eq!(repository.names(), vec!["acct-7", "acct-8"]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn from_directory_skips_nameless_key_file() {
        let dir = make_temp_key_dir("nameless");
        write_key(&dir, ".key", KEY_B);
        write_key(&dir, "acct-7.key", KEY_A);

        let repository = MemoryKeyRepository::from_directory(&dir).unwrap();
        assert_eq!(repository.names(), vec!["acct-7"]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn from_directory_enforces_limits() {
        let dir = make_temp_key_dir("limits");
        write_key(&dir, "a.key", KEY_A);
        write_key(&dir, "b.key", KEY_B);

        let too_many = MemoryKeyRepository::from_directory_with_config(
            &dir,
            KeyStoreConfig {
                max_keys_from_directory: 1,
                ..KeyStoreConfig::default()
            },
        );
        assert!(matches!(too_many, Err(KeyStoreError::LoadFailed(_))));

        let too_large = MemoryKeyRepository::from_directory_with_config(
            &dir,
            KeyStoreConfig {
                max_key_file_size: 16,
                ..KeyStoreConfig::default()
            },
        );
        assert!(matches!(too_large, Err(KeyStoreError::LoadFailed(_))));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    #[cfg(unix)]
    fn from_directory_refuses_symlinks() {
        let dir = make_temp_key_dir("symlink");
        let target = dir.join("real.txt");
        std::fs::write(&target, KEY_A).unwrap();
        std::os::unix::fs::symlink(&target, dir.join("linked.key")).unwrap();

        assert!(matches!(
            MemoryKeyRepository::from_directory(&dir),
            Err(KeyStoreError::LoadFailed(_))
        ));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_directory_fails() {
        let dir = std::env::temp_dir().join("recseal-keys-does-not-exist");
        assert!(matches!(
            MemoryKeyRepository::from_directory(&dir),
            Err(KeyStoreError::LoadFailed(_))
        ));
    }

    #[test]
    fn provider_resolves_through_obfuscator() {
        let repository = Arc::new(MemoryKeyRepository::from_embedded(&[("acct-7", KEY_A)]).unwrap());
        let provider = RepositoryKeyProvider::new(Arc::clone(&repository), PlainKeyNames);

        assert!(provider.get_key(&KeyRef::from("acct-7")).is_some());
        assert!(provider.get_key(&KeyRef::from("acct-8")).is_none());
        assert!(provider.get_key(&KeyRef::from(vec![0xff, 0xfe])).is_none());
    }

    fn make_temp_key_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "recseal-keys-{tag}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_key(dir: &Path, file_name: &str, contents: &str) {
        std::fs::write(dir.join(file_name), contents.as_bytes()).unwrap();
    }
}
