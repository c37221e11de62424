//! Ordered entry map for one block.
//!
//! This module provides [`BlockMap`], a wrapper around [`IndexMap`] holding a
//! block's keys in the order they were first written. Comments live in the same
//! map under synthetic keys so their position relative to real entries survives
//! a round trip:
//!
//! - `comment_<i>`: the i-th standalone comment line of the block
//! - `<key>_inline_comment_<n>`: the comment trailing the n-th occurrence of `key`
//!
//! ## Examples
//!
//! ```rust
//! use epoch_deck::{BlockMap, Entry, Value};
//!
//! let mut block = BlockMap::new();
//! block.insert("nx".to_string(), Entry::Single(Value::from(400)));
//! block.insert_comment(0, "grid size");
//!
//! let keys: Vec<_> = block.keys().cloned().collect();
//! assert_eq!(keys, vec!["nx", "comment_0"]);
//! assert_eq!(block.get_value("nx"), Some(&Value::from(400)));
//! ```

use crate::{Entry, Value};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};

const COMMENT_PREFIX: &str = "comment_";
const INLINE_COMMENT_MARKER: &str = "_inline_comment_";

/// Key under which the i-th standalone comment of a block is stored.
#[must_use]
pub fn comment_key(index: usize) -> String {
    format!("{}{}", COMMENT_PREFIX, index)
}

/// Key under which the comment on the n-th occurrence of `key` is stored.
#[must_use]
pub fn inline_comment_key(key: &str, occurrence: usize) -> String {
    format!("{}{}{}", key, INLINE_COMMENT_MARKER, occurrence)
}

fn is_index(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Returns `true` for `comment_<digits>`.
#[must_use]
pub fn is_comment_key(key: &str) -> bool {
    key.strip_prefix(COMMENT_PREFIX).is_some_and(is_index)
}

/// Returns `true` for `<key>_inline_comment_<digits>`.
#[must_use]
pub fn is_inline_comment_key(key: &str) -> bool {
    key.rsplit_once(INLINE_COMMENT_MARKER)
        .is_some_and(|(owner, index)| !owner.is_empty() && is_index(index))
}

/// An ordered map of keys to entries for a single block.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockMap(IndexMap<String, Entry>);

impl BlockMap {
    /// Creates an empty `BlockMap`.
    #[must_use]
    pub fn new() -> Self {
        BlockMap(IndexMap::new())
    }

    /// Inserts an entry. An existing key keeps its position and the old entry is returned.
    pub fn insert(&mut self, key: String, entry: Entry) -> Option<Entry> {
        self.0.insert(key, entry)
    }

    /// Inserts a single value under `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use epoch_deck::{BlockMap, Value};
    ///
    /// let mut block = BlockMap::new();
    /// block.insert_value("dt_multiplier", 0.8);
    /// assert_eq!(block.get_value("dt_multiplier"), Some(&Value::Float(0.8)));
    /// ```
    pub fn insert_value(&mut self, key: &str, value: impl Into<Value>) -> Option<Entry> {
        self.0.insert(key.to_string(), Entry::Single(value.into()))
    }

    /// Stores standalone comment `index`.
    pub fn insert_comment(&mut self, index: usize, text: &str) {
        self.insert_value(&comment_key(index), text);
    }

    /// Stores the inline comment for occurrence `occurrence` of `key`.
    pub fn insert_inline_comment(&mut self, key: &str, occurrence: usize, text: &str) {
        self.insert_value(&inline_comment_key(key, occurrence), text);
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Entry> {
        self.0.get_mut(key)
    }

    /// Returns the value of a key written exactly once.
    #[must_use]
    pub fn get_value(&self, key: &str) -> Option<&Value> {
        self.0.get(key).and_then(Entry::as_single)
    }

    /// Returns the inline comment for occurrence `occurrence` of `key`.
    #[must_use]
    pub fn inline_comment(&self, key: &str, occurrence: usize) -> Option<&Value> {
        self.get_value(&inline_comment_key(key, occurrence))
    }

    /// Removes a key, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Entry> {
        self.0.shift_remove(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the keys, in insertion order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Entry> {
        self.0.keys()
    }

    /// Returns an iterator over the key-entry pairs, in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Entry> {
        self.0.iter()
    }
}

impl Serialize for BlockMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, entry) in &self.0 {
            map.serialize_entry(key, entry)?;
        }
        map.end()
    }
}

impl IntoIterator for BlockMap {
    type Item = (String, Entry);
    type IntoIter = indexmap::map::IntoIter<String, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a BlockMap {
    type Item = (&'a String, &'a Entry);
    type IntoIter = indexmap::map::Iter<'a, String, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, Entry)> for BlockMap {
    fn from_iter<T: IntoIterator<Item = (String, Entry)>>(iter: T) -> Self {
        BlockMap(IndexMap::from_iter(iter))
    }
}
