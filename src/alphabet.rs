//! Interning of state names and tape symbols into dense integer identifiers.

use std::collections::HashMap;
use std::hash::Hash;

/// A bidirectional map between values and their insertion index.
///
/// Identifiers are assigned in first-insertion order and never change, so an id can be used
/// to index the `values()` slice directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interner<T: Eq + Hash + Clone> {
    values: Vec<T>,
    ids: HashMap<T, usize>,
}

impl<T: Eq + Hash + Clone> Default for Interner<T> {
    fn default() -> Self {
        Self {
            values: Vec::new(),
            ids: HashMap::new(),
        }
    }
}

impl<T: Eq + Hash + Clone> Interner<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id of `value`, assigning the next free one if it was not seen before.
    pub fn intern(&mut self, value: T) -> usize {
        if let Some(&id) = self.ids.get(&value) {
            return id;
        }

        let id = self.values.len();
        self.values.push(value.clone());
        self.ids.insert(value, id);
        id
    }

    pub fn get<Q>(&self, value: &Q) -> Option<usize>
    where
        T: std::borrow::Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.ids.get(value).copied()
    }

    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: std::borrow::Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.ids.contains_key(value)
    }

    pub fn resolve(&self, id: usize) -> Option<&T> {
        self.values.get(id)
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<T: Eq + Hash + Clone> FromIterator<T> for Interner<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut interner = Self::new();
        for value in iter {
            interner.intern(value);
        }
        interner
    }
}
