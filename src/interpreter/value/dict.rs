use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use im_rc::{HashMap, HashSet, Vector};

use crate::interpreter::value::core::Value;

fn entry_hash(key: &Value, value: Option<&Value>) -> u64 {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    if let Some(value) = value {
        value.hash(&mut hasher);
    }
    hasher.finish()
}

/// A persistent dictionary with insertion-order iteration.
///
/// The HAMT supplies structural sharing, lookup and equality; the order index
/// records first-insertion order, which is the canonical iteration order.
/// Equality and hashing consult only the entries, never the order.
#[derive(Debug, Clone, Default)]
pub struct DictValue {
    entries: HashMap<Value, Value>,
    order:   Vector<Value>,
}

impl DictValue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &Value) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns a dictionary with `key` set to `value`.
    ///
    /// A key seen for the first time is appended to the iteration order;
    /// overwriting keeps the key's original position.
    #[must_use]
    pub fn insert(&self, key: Value, value: Value) -> Self {
        let order = if self.entries.contains_key(&key) {
            self.order.clone()
        } else {
            let mut order = self.order.clone();
            order.push_back(key.clone());
            order
        };

        Self { entries: self.entries.update(key, value),
               order }
    }

    /// In-place insert, used by the transient path.
    pub fn insert_mut(&mut self, key: Value, value: Value) {
        if !self.entries.contains_key(&key) {
            self.order.push_back(key.clone());
        }
        self.entries.insert(key, value);
    }

    /// Returns a dictionary without `key`.
    #[must_use]
    pub fn remove(&self, key: &Value) -> Self {
        if !self.entries.contains_key(key) {
            return self.clone();
        }

        let mut order = self.order.clone();
        if let Some(position) = order.index_of(key) {
            order.remove(position);
        }

        Self { entries: self.entries.without(key),
               order }
    }

    /// Right-biased merge: `other`'s values win, its fresh keys append after
    /// this dictionary's keys.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        let mut merged = self.clone();
        for (key, value) in other.iter() {
            merged.insert_mut(key.clone(), value.clone());
        }
        merged
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.order
            .iter()
            .filter_map(move |key| self.entries.get(key).map(|value| (key, value)))
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.order.iter()
    }
}

impl PartialEq for DictValue {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for DictValue {}

impl Hash for DictValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Commutative combination so the hash is independent of both
        // insertion order and HAMT layout.
        let mut combined: u64 = 0;
        for (key, value) in &self.entries {
            combined = combined.wrapping_add(entry_hash(key, Some(value)));
        }
        state.write_u64(combined);
        state.write_usize(self.entries.len());
    }
}

/// A persistent set with insertion-order iteration.
///
/// The same layout as [`DictValue`]: HAMT membership plus an order index.
#[derive(Debug, Clone, Default)]
pub struct SetValue {
    items: HashSet<Value>,
    order: Vector<Value>,
}

impl SetValue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn contains(&self, value: &Value) -> bool {
        self.items.contains(value)
    }

    /// Returns a set also containing `value`.
    #[must_use]
    pub fn insert(&self, value: Value) -> Self {
        if self.items.contains(&value) {
            return self.clone();
        }

        let mut order = self.order.clone();
        order.push_back(value.clone());

        Self { items: self.items.update(value),
               order }
    }

    /// In-place insert, used by the transient path.
    pub fn insert_mut(&mut self, value: Value) {
        if !self.items.contains(&value) {
            self.order.push_back(value.clone());
            self.items.insert(value);
        }
    }

    /// Returns a set without `value`.
    #[must_use]
    pub fn remove(&self, value: &Value) -> Self {
        if !self.items.contains(value) {
            return self.clone();
        }

        let mut order = self.order.clone();
        if let Some(position) = order.index_of(value) {
            order.remove(position);
        }

        Self { items: self.items.without(value),
               order }
    }

    /// Union, keeping this set's order first.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let mut merged = self.clone();
        for value in other.iter() {
            merged.insert_mut(value.clone());
        }
        merged
    }

    /// The members of this set that are not in `other`, in order.
    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        self.iter()
            .filter(|value| !other.contains(value))
            .cloned()
            .collect()
    }

    /// Members in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.order.iter()
    }
}

impl PartialEq for SetValue {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl Eq for SetValue {}

impl Hash for SetValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut combined: u64 = 0;
        for value in &self.items {
            combined = combined.wrapping_add(entry_hash(value, None));
        }
        state.write_u64(combined);
        state.write_usize(self.items.len());
    }
}

impl FromIterator<Value> for SetValue {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let mut set = Self::new();
        for value in iter {
            set.insert_mut(value);
        }
        set
    }
}

impl FromIterator<(Value, Value)> for DictValue {
    fn from_iter<I: IntoIterator<Item = (Value, Value)>>(iter: I) -> Self {
        let mut dict = Self::new();
        for (key, value) in iter {
            dict.insert_mut(key, value);
        }
        dict
    }
}
