use std::fmt;

/// Readable prefix cap, in bytes.
const MAX_PREFIX_LEN: usize = 64;
/// Hex characters of the identity hash appended to every namespace.
const HASH_SUFFIX_LEN: usize = 16;

/// Vector-index partition owned by exactly one document.
///
/// Always derived from the document identity (its storage key), never from
/// session state, so ingestion and retrieval for the same document meet in the
/// same partition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace(String);

impl Namespace {
    /// Derive the namespace for a document identity.
    ///
    /// Non-ASCII characters are dropped and ASCII whitespace or control characters
    /// become `_`. The readable prefix is capped at 64 bytes and followed by `-`
    /// and 16 hex characters of the BLAKE3 hash of the unmodified identity, so
    /// identities that only differ in stripped characters stay distinct.
    #[must_use]
    pub fn from_identity(identity: &str) -> Self {
        let mut prefix: String = identity
            .chars()
            .filter(char::is_ascii)
            .map(|c| {
                if c.is_ascii_whitespace() || c.is_ascii_control() {
                    '_'
                } else {
                    c
                }
            })
            .collect();
        prefix.truncate(MAX_PREFIX_LEN);

        let hash = blake3::hash(identity.as_bytes()).to_hex();
        Self(format!("{prefix}-{}", &hash[..HASH_SUFFIX_LEN]))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Namespace {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
