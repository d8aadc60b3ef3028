//! Write-once, read-many storage for per-item results.
//!
//! A [`StoreWriter`] accepts each key exactly once and is consumed by
//! [`StoreWriter::freeze`]. Readers only ever see the resulting
//! [`FrozenStore`], so no partially written store can be observed.

use std::collections::{BTreeMap, btree_map};

use thiserror::Error;

/// Returned when a key is written twice.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("key {key:?} was already written")]
pub struct DuplicateKey<K: core::fmt::Debug> {
    /// The key that was already present.
    pub key: K,
}

/// Accumulates values before they are frozen.
///
/// # Examples
/// ```
/// use neighbourly_core::StoreWriter;
///
/// let mut writer = StoreWriter::new();
/// writer.insert('a', 1)?;
/// assert!(writer.insert('a', 2).is_err());
///
/// let store = writer.freeze();
/// assert_eq!(store.get(&'a'), Some(&1));
/// # Ok::<(), neighbourly_core::DuplicateKey<char>>(())
/// ```
#[derive(Debug)]
pub struct StoreWriter<K, V> {
    entries: BTreeMap<K, V>,
}

impl<K: Ord + core::fmt::Debug, V> StoreWriter<K, V> {
    /// Creates an empty writer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Stores `value` under `key`.
    ///
    /// # Errors
    /// Returns [`DuplicateKey`] when `key` already holds a value; the stored
    /// value is left untouched.
    pub fn insert(&mut self, key: K, value: V) -> Result<(), DuplicateKey<K>> {
        if self.entries.contains_key(&key) {
            return Err(DuplicateKey { key });
        }
        self.entries.insert(key, value);
        Ok(())
    }

    /// Returns the number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether nothing has been stored yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finishes writing.
    #[must_use]
    pub fn freeze(self) -> FrozenStore<K, V> {
        FrozenStore {
            entries: self.entries,
        }
    }
}

impl<K: Ord + core::fmt::Debug, V> Default for StoreWriter<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable map produced by [`StoreWriter::freeze`]. Iteration follows key
/// order.
#[derive(Clone, Debug, PartialEq)]
pub struct FrozenStore<K, V> {
    entries: BTreeMap<K, V>,
}

impl<K: Ord, V> FrozenStore<K, V> {
    /// Borrows the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    /// Reports whether `key` holds a value.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, K, V> {
        self.entries.iter()
    }
}

impl<K, V> Default for FrozenStore<K, V> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}
