use std::fmt;

use bytes::Bytes;

/// Opaque identifier of the key material used for one record.
///
/// A key reference is not secret: it travels in clear inside the envelope and
/// in record metadata. Cloning is cheap (reference-counted bytes).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyRef(Bytes);

impl KeyRef {
    /// Create a key reference from any byte container.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    /// Raw bytes of the reference.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Number of bytes in the reference.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Underlying shared buffer.
    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl AsRef<[u8]> for KeyRef {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl From<Bytes> for KeyRef {
    fn from(bytes: Bytes) -> Self {
        Self(bytes)
    }
}

impl From<Vec<u8>> for KeyRef {
    fn from(bytes: Vec<u8>) -> Self {
        Self(Bytes::from(bytes))
    }
}

impl From<&[u8]> for KeyRef {
    fn from(bytes: &[u8]) -> Self {
        Self(Bytes::copy_from_slice(bytes))
    }
}

impl From<&str> for KeyRef {
    fn from(name: &str) -> Self {
        Self(Bytes::copy_from_slice(name.as_bytes()))
    }
}

impl From<String> for KeyRef {
    fn from(name: String) -> Self {
        Self(Bytes::from(name.into_bytes()))
    }
}

impl From<KeyRef> for Bytes {
    fn from(key_ref: KeyRef) -> Self {
        key_ref.0
    }
}

// Printable references show as text, anything else as hex.
impl fmt::Display for KeyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(self.as_bytes()) {
            Ok(text) if text.chars().all(|c| !c.is_control()) => f.write_str(text),
            _ => {
                f.write_str("0x")?;
                for byte in self.as_bytes() {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Debug for KeyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyRef({self})")
    }
}
