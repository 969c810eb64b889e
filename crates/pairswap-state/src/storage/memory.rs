use super::overlay::Overlay;
use super::Storage;
use crate::error::StateError;

/// In-memory storage implementation
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Overlay,
}

impl MemoryStorage {
    pub fn new() -> Self {
        MemoryStorage::default()
    }

    /// Get the number of committed keys
    pub fn len(&self) -> usize {
        self.inner.committed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.committed.is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.inner.get(key)
    }

    fn put(&mut self, key: &[u8], value: &[u8]) {
        self.inner.stage(key, Some(value));
    }

    fn delete(&mut self, key: &[u8]) {
        self.inner.stage(key, None);
    }

    fn commit(&mut self) -> Result<(), StateError> {
        self.inner.apply_pending();
        Ok(())
    }

    fn rollback(&mut self) {
        self.inner.discard_pending();
    }

    fn keys_with_prefix(&self, prefix: &[u8]) -> Vec<Vec<u8>> {
        self.inner.keys_with_prefix(prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_writes_visible_until_rollback() {
        let mut storage = MemoryStorage::new();

        storage.put(b"key1", b"value1");
        assert_eq!(storage.get(b"key1"), Some(b"value1".to_vec()));
        assert!(storage.is_empty());

        storage.rollback();
        assert_eq!(storage.get(b"key1"), None);
    }

    #[test]
    fn test_delete_then_rollback() {
        let mut storage = MemoryStorage::new();
        storage.put(b"key1", b"value1");
        storage.commit().unwrap();

        storage.delete(b"key1");
        assert!(!storage.exists(b"key1"));
        storage.rollback();
        assert!(storage.exists(b"key1"));

        storage.delete(b"key1");
        storage.commit().unwrap();
        assert_eq!(storage.len(), 0);
    }

    #[test]
    fn test_prefix_query_merges_pending() {
        let mut storage = MemoryStorage::new();
        storage.put(b"pool:1", b"a");
        storage.put(b"pool:2", b"b");
        storage.put(b"tok:1", b"c");
        storage.commit().unwrap();

        storage.put(b"pool:3", b"d");
        storage.delete(b"pool:1");

        let keys = storage.keys_with_prefix(b"pool:");
        assert_eq!(keys, vec![b"pool:2".to_vec(), b"pool:3".to_vec()]);
    }
}
