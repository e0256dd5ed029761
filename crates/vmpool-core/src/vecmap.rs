//! Insertion-ordered flat map
//!
//! A map backed by a `Vec<(K, V)>` with linear-scan lookup. Iteration
//! yields entries in insertion order, which a hash map does not guarantee.
//! Intended for small tables (tens of entries) where scan cost is noise
//! and stable ordering matters, such as the worker registry.

/// Flat map preserving insertion order
#[derive(Debug, Clone)]
pub struct VecMap<K, V> {
    entries: Vec<(K, V)>,
}

impl<K: PartialEq, V> VecMap<K, V> {
    /// Create an empty map
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Create an empty map with pre-allocated capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: Vec::with_capacity(capacity) }
    }

    /// Number of entries
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the map is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if a key is present
    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Look up a value by key
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Look up a value by key, mutably
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Insert a key/value pair
    ///
    /// If the key already exists its value is replaced (keeping the entry's
    /// original position) and the old value is returned. New keys append.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.get_mut(&key) {
            Some(slot) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Remove an entry by key, preserving the order of the rest
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    /// Iterate over entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Iterate over keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Iterate over values in insertion order
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Iterate over values in insertion order, mutably
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.entries.iter_mut().map(|(_, v)| v)
    }

    /// Remove all entries, yielding them in insertion order
    pub fn drain(&mut self) -> impl Iterator<Item = (K, V)> + '_ {
        self.entries.drain(..)
    }

    /// Remove all entries
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<K: PartialEq, V> Default for VecMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut map = VecMap::new();
        assert!(map.is_empty());

        assert_eq!(map.insert("a", 1), None);
        assert_eq!(map.insert("b", 2), None);
        assert_eq!(map.len(), 2);

        assert_eq!(map.get(&"a"), Some(&1));
        assert_eq!(map.get(&"b"), Some(&2));
        assert_eq!(map.get(&"c"), None);
        assert!(map.contains_key(&"a"));
        assert!(!map.contains_key(&"c"));
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut map = VecMap::new();
        map.insert("a", 1);
        map.insert("b", 2);
        map.insert("c", 3);

        assert_eq!(map.insert("b", 20), Some(2));
        assert_eq!(map.len(), 3);

        // Replacement keeps the original position
        let keys: Vec<_> = map.keys().copied().collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(map.get(&"b"), Some(&20));
    }

    #[test]
    fn test_iteration_order() {
        let mut map = VecMap::new();
        map.insert(30, "z");
        map.insert(10, "x");
        map.insert(20, "y");

        let keys: Vec<_> = map.keys().copied().collect();
        assert_eq!(keys, vec![30, 10, 20]);

        let values: Vec<_> = map.values().copied().collect();
        assert_eq!(values, vec!["z", "x", "y"]);
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut map = VecMap::new();
        map.insert(1, "a");
        map.insert(2, "b");
        map.insert(3, "c");

        assert_eq!(map.remove(&2), Some("b"));
        assert_eq!(map.remove(&2), None);

        let keys: Vec<_> = map.keys().copied().collect();
        assert_eq!(keys, vec![1, 3]);
    }

    #[test]
    fn test_drain_yields_in_order() {
        let mut map = VecMap::new();
        map.insert(1, "a");
        map.insert(2, "b");

        let drained: Vec<_> = map.drain().collect();
        assert_eq!(drained, vec![(1, "a"), (2, "b")]);
        assert!(map.is_empty());
    }

    #[test]
    fn test_in_place_mutation_and_clear() {
        let mut map = VecMap::with_capacity(4);
        map.insert("a", 1);
        map.insert("b", 2);

        for v in map.values_mut() {
            *v *= 10;
        }
        let entries: Vec<_> = map.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(entries, vec![("a", 10), ("b", 20)]);

        *map.get_mut(&"a").unwrap() = 7;
        assert_eq!(map.get(&"a"), Some(&7));

        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.get(&"a"), None);
    }
}
