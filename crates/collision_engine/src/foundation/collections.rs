//! Specialized collection types

pub use slotmap::{Key, SlotMap};

slotmap::new_key_type! {
    /// Stable identity of a body registered in a collision world
    pub struct ObstacleHandle;

    /// Stable identity of a simulated actor
    pub struct ActorId;
}

/// Slot map that also remembers insertion order
///
/// Slot reuse after removal would otherwise let iteration order drift between
/// runs with different histories; every scan in the collision core walks
/// `order` so results stay reproducible.
#[derive(Debug, Clone)]
pub struct OrderedSlotMap<K: Key, T> {
    items: SlotMap<K, T>,
    order: Vec<K>,
}

impl<K: Key, T> OrderedSlotMap<K, T> {
    /// Create an empty map
    pub fn new() -> Self {
        Self {
            items: SlotMap::with_key(),
            order: Vec::new(),
        }
    }

    /// Insert an item and return its key
    pub fn insert(&mut self, item: T) -> K {
        let key = self.items.insert(item);
        self.order.push(key);
        key
    }

    /// Remove an item by key
    pub fn remove(&mut self, key: K) -> Option<T> {
        let item = self.items.remove(key)?;
        self.order.retain(|k| *k != key);
        Some(item)
    }

    /// Get an item by key
    pub fn get(&self, key: K) -> Option<&T> {
        self.items.get(key)
    }

    /// Get a mutable reference to an item by key
    pub fn get_mut(&mut self, key: K) -> Option<&mut T> {
        self.items.get_mut(key)
    }

    /// Check whether the key is live
    pub fn contains_key(&self, key: K) -> bool {
        self.items.contains_key(key)
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (K, &T)> + '_ {
        self.order.iter().map(move |&key| (key, &self.items[key]))
    }

    /// Keys in insertion order
    pub fn keys(&self) -> &[K] {
        &self.order
    }

    /// Number of live items
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when nothing is stored
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Drop everything
    pub fn clear(&mut self) {
        self.items.clear();
        self.order.clear();
    }
}

impl<K: Key, T> Default for OrderedSlotMap<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iteration_follows_insertion_after_reuse() {
        let mut map: OrderedSlotMap<ObstacleHandle, &str> = OrderedSlotMap::new();
        let a = map.insert("a");
        let _b = map.insert("b");
        map.remove(a);
        let c = map.insert("c");

        let values: Vec<_> = map.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec!["b", "c"]);
        assert!(!map.contains_key(a));
        assert!(map.contains_key(c));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_stale_key_after_remove() {
        let mut map: OrderedSlotMap<ActorId, u32> = OrderedSlotMap::new();
        let key = map.insert(7);
        assert_eq!(map.remove(key), Some(7));
        assert_eq!(map.remove(key), None);
        assert!(map.get(key).is_none());
        assert!(map.is_empty());
    }
}
