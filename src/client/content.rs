//! Off-ledger content store.
//!
//! Maps content hashes back to confession text for display. Outside the
//! trust boundary: losing an entry only hides the text, and the ledger never
//! sees plaintext.

use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::core::encoding::ContentHash;
use crate::core::hash::hash_content;

/// Hash-addressed plaintext cache.
pub trait ContentStore: Send + Sync {
    /// Store `text` and return its content hash.
    fn put(&self, text: &str) -> ContentHash;

    /// Text for a content hash, if cached.
    fn get(&self, hash: &ContentHash) -> Option<String>;
}

/// Process-local [`ContentStore`].
#[derive(Debug, Default)]
pub struct InMemoryContentStore {
    entries: RwLock<BTreeMap<ContentHash, String>>,
}

impl InMemoryContentStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached texts.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Nothing cached?
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ContentStore for InMemoryContentStore {
    fn put(&self, text: &str) -> ContentHash {
        let hash = hash_content(text);
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(hash, text.to_string());
        hash
    }

    fn get(&self, hash: &ContentHash) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(hash)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get() {
        let store = InMemoryContentStore::new();
        assert!(store.is_empty());

        let h = store.put("I talk to my plants");
        assert_eq!(h, hash_content("I talk to my plants"));
        assert_eq!(store.get(&h).as_deref(), Some("I talk to my plants"));
        assert_eq!(store.get(&hash_content("unknown")), None);

        // same text, same slot
        store.put("I talk to my plants");
        assert_eq!(store.len(), 1);
    }
}
