use bytes::Bytes;
use recseal_envelope::KeyRef;

/// Name of the metadata entry carrying a record's key reference.
pub const KEY_REF_HEADER: &str = "keKeyReference";

/// One metadata entry. A `None` value is a present entry with no content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    name: String,
    value: Option<Bytes>,
}

impl Header {
    pub fn new(name: impl Into<String>, value: Option<Bytes>) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> Option<&Bytes> {
        self.value.as_ref()
    }
}

/// Mutable, order-preserving record metadata.
///
/// Names may repeat; lookups return the last entry added under a name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<Header>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn add(&mut self, name: impl Into<String>, value: Option<Bytes>) -> &mut Self {
        self.entries.push(Header::new(name, value));
        self
    }

    /// Remove every entry named `name`.
    pub fn remove(&mut self, name: &str) -> &mut Self {
        self.entries.retain(|header| header.name != name);
        self
    }

    pub fn last_header(&self, name: &str) -> Option<&Header> {
        self.entries.iter().rev().find(|header| header.name == name)
    }

    /// All entries named `name`, oldest first.
    pub fn headers<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Header> + 'a {
        self.entries.iter().filter(move |header| header.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Header> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Key reference carried by the last [`KEY_REF_HEADER`] entry.
    ///
    /// `None` when there is no such entry or its value is absent.
    pub fn key_ref(&self) -> Option<KeyRef> {
        self.last_header(KEY_REF_HEADER)
            .and_then(|header| header.value.clone())
            .map(KeyRef::from)
    }

    /// Append a [`KEY_REF_HEADER`] entry; `None` records "no key reference".
    pub fn add_key_ref(&mut self, key_ref: Option<&KeyRef>) -> &mut Self {
        self.add(KEY_REF_HEADER, key_ref.cloned().map(KeyRef::into_bytes))
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = &'a Header;
    type IntoIter = std::slice::Iter<'a, Header>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_header_wins() {
        let mut headers = Headers::new();
        headers
            .add("a", Some(Bytes::from_static(b"1")))
            .add("b", None)
            .add("a", Some(Bytes::from_static(b"2")));

        assert_eq!(headers.len(), 3);
        assert_eq!(
            headers.last_header("a").and_then(Header::value),
            Some(&Bytes::from_static(b"2"))
        );
        assert_eq!(headers.headers("a").count(), 2);
        assert!(headers.last_header("missing").is_none());
    }

    #[test]
    fn absent_value_means_no_key_ref() {
        let mut headers = Headers::new();
        headers.add_key_ref(Some(&KeyRef::from("K1")));
        assert_eq!(headers.key_ref(), Some(KeyRef::from("K1")));

        headers.add_key_ref(None);
        assert!(headers.key_ref().is_none());
        assert_eq!(headers.headers(KEY_REF_HEADER).count(), 2);
    }

    #[test]
    fn remove_drops_all_entries_with_name() {
        let mut headers = Headers::new();
        headers.add("a", None).add("b", None).add("a", None);
        headers.remove("a");

        let names: Vec<_> = headers.iter().map(Header::name).collect();
        assert_eq!(names, ["b"]);
    }
}
