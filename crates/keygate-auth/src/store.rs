//! Thread-safe keyed store guarding shared mutable state.

use std::collections::HashMap;
use std::sync::RwLock;

/// A thread-safe associative store mapping string keys to one concrete
/// value type per instance.
///
/// Every instance owns a single reader/writer lock: [`get`](Self::get)
/// takes shared access so readers run concurrently, while
/// [`set`](Self::set) and [`remove`](Self::remove) take exclusive access.
/// Absence is signaled through `Option`/`bool`, never an error, and the
/// last writer under the exclusive lock wins.
#[derive(Debug, Default)]
pub struct KeyedStore<V> {
    /// The guarded map.
    inner: RwLock<HashMap<String, V>>,
}

impl<V: Clone> KeyedStore<V> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Inserts or replaces the value under `key`.
    pub fn set(&self, key: impl Into<String>, value: V) {
        let mut map = self.inner.write().unwrap_or_else(|e| e.into_inner());
        map.insert(key.into(), value);
    }

    /// Returns a clone of the value under `key`, if present.
    pub fn get(&self, key: &str) -> Option<V> {
        let map = self.inner.read().unwrap_or_else(|e| e.into_inner());
        map.get(key).cloned()
    }

    /// Removes the value under `key`. Returns whether an entry was present.
    pub fn remove(&self, key: &str) -> bool {
        let mut map = self.inner.write().unwrap_or_else(|e| e.into_inner());
        map.remove(key).is_some()
    }

    /// Whether an entry exists under `key`.
    pub fn contains(&self, key: &str) -> bool {
        let map = self.inner.read().unwrap_or_else(|e| e.into_inner());
        map.contains_key(key)
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        let map = self.inner.read().unwrap_or_else(|e| e.into_inner());
        map.len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn test_set_get_remove() {
        let store = KeyedStore::new();
        assert!(store.get("a").is_none());

        store.set("a", 1u32);
        assert_eq!(store.get("a"), Some(1));
        assert!(store.contains("a"));
        assert_eq!(store.len(), 1);

        store.set("a", 2);
        assert_eq!(store.get("a"), Some(2));

        assert!(store.remove("a"));
        assert!(!store.remove("a"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_concurrent_writers_and_readers() {
        let store = Arc::new(KeyedStore::new());
        let mut handles = Vec::new();

        for i in 0..100u32 {
            let writer = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                writer.set(format!("key-{i}"), i);
            }));

            let reader = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                // May observe absence before the writer lands; any value
                // observed must be the one written for that key.
                if let Some(v) = reader.get(&format!("key-{i}")) {
                    assert_eq!(v, i);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len(), 100);
        for i in 0..100u32 {
            assert_eq!(store.get(&format!("key-{i}")), Some(i));
        }
    }
}
