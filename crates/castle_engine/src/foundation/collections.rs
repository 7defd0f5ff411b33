//! Specialized collection types

pub use slotmap::{new_key_type, SecondaryMap, SlotMap};

/// Set of slotmap keys with O(1) membership checks.
///
/// Used for "view" subsets such as the sleeping bodies of a simulation,
/// where the set holds keys into storage owned elsewhere.
#[derive(Debug, Clone)]
pub struct KeySet<K: slotmap::Key> {
    members: SecondaryMap<K, ()>,
}

impl<K: slotmap::Key> KeySet<K> {
    /// Create an empty set
    pub fn new() -> Self {
        Self {
            members: SecondaryMap::new(),
        }
    }

    /// Insert a key, returning true if it was not present
    pub fn insert(&mut self, key: K) -> bool {
        self.members.insert(key, ()).is_none()
    }

    /// Remove a key, returning true if it was present
    pub fn remove(&mut self, key: K) -> bool {
        self.members.remove(key).is_some()
    }

    /// Check membership
    pub fn contains(&self, key: K) -> bool {
        self.members.contains_key(key)
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// True when the set has no members
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Iterate over the members
    pub fn iter(&self) -> impl Iterator<Item = K> + '_ {
        self.members.keys()
    }

    /// Remove every member
    pub fn clear(&mut self) {
        self.members.clear();
    }
}

impl<K: slotmap::Key> Default for KeySet<K> {
    fn default() -> Self {
        Self::new()
    }
}
