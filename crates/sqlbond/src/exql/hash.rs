//! Content hashing for fragments and statements.
//!
//! Every value is written with a one-byte tag and strings are length-prefixed,
//! so two different structures can never feed the same byte stream to blake3.

use std::fmt;

/// A 32-byte blake3 digest identifying a fragment or statement by content.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        blake3::Hash::from(self.0).to_hex().to_string()
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = self.to_hex();
        write!(f, "ContentHash({})", &hex[..16])
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Incremental hasher used by [`Fragment::hash_into`](super::Fragment::hash_into).
pub struct ContentHasher {
    inner: blake3::Hasher,
}

impl ContentHasher {
    pub fn new() -> Self {
        Self {
            inner: blake3::Hasher::new(),
        }
    }

    /// Start a node of the given kind (e.g. `"column"`, `"where"`).
    pub fn tag(&mut self, kind: &str) -> &mut Self {
        self.inner.update(&[0x01]);
        self.write_len(kind.len());
        self.inner.update(kind.as_bytes());
        self
    }

    pub fn str(&mut self, value: &str) -> &mut Self {
        self.inner.update(&[0x02]);
        self.write_len(value.len());
        self.inner.update(value.as_bytes());
        self
    }

    pub fn bool(&mut self, value: bool) -> &mut Self {
        self.inner.update(&[0x03, value as u8]);
        self
    }

    pub fn u64(&mut self, value: u64) -> &mut Self {
        self.inner.update(&[0x04]);
        self.inner.update(&value.to_le_bytes());
        self
    }

    pub fn opt_u64(&mut self, value: Option<u64>) -> &mut Self {
        match value {
            Some(v) => self.u64(v),
            None => self.absent(),
        }
    }

    /// Mark the number of children that follow.
    pub fn count(&mut self, n: usize) -> &mut Self {
        self.inner.update(&[0x05]);
        self.write_len(n);
        self
    }

    /// Mark an absent slot.
    pub fn absent(&mut self) -> &mut Self {
        self.inner.update(&[0x00]);
        self
    }

    /// Fold in an already computed child hash.
    pub fn child(&mut self, hash: &ContentHash) -> &mut Self {
        self.inner.update(&[0x06]);
        self.inner.update(hash.as_bytes());
        self
    }

    pub fn finish(&self) -> ContentHash {
        ContentHash(*self.inner.finalize().as_bytes())
    }

    fn write_len(&mut self, n: usize) {
        self.inner.update(&(n as u64).to_le_bytes());
    }
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self::new()
    }
}
