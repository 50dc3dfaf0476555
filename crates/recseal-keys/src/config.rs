/// Controls key repository loading behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyStoreConfig {
    /// Required key length in bytes; `None` accepts any non-empty key.
    pub key_len: Option<usize>,
    /// Maximum number of keys loaded from a directory.
    pub max_keys_from_directory: usize,
    /// Maximum bytes allowed per key file loaded from a directory.
    pub max_key_file_size: usize,
}

impl Default for KeyStoreConfig {
    fn default() -> Self {
        Self {
            key_len: Some(32),
            max_keys_from_directory: 1024,
            max_key_file_size: 4 * 1024,
        }
    }
}
