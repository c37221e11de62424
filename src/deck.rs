//! The whole-deck structure and block-order identifiers.
//!
//! A [`Deck`] maps each block name to a [`BlockGroup`]:
//!
//! - [`BlockGroup::Flat`]: the block occurs once
//! - [`BlockGroup::Named`]: every occurrence has a `name` key and is stored under it
//! - [`BlockGroup::Indexed`]: the block occurs several times without `name`
//!
//! The deck alone does not know how blocks of different names were interleaved.
//! That arrangement is the block order, a list of [`BlockId`]s produced by
//! [`loads`](crate::loads) alongside the deck.
//!
//! ```rust
//! use epoch_deck::{loads, BlockId};
//!
//! let text = "\
//! begin:species
//!   name = electron
//! end:species
//!
//! begin:control
//!   nx = 100
//! end:control
//!
//! begin:species
//!   name = proton
//! end:species
//! ";
//! let (deck, order) = loads(text).unwrap();
//! assert_eq!(deck.len(), 2);
//! assert_eq!(
//!     order,
//!     vec![
//!         BlockId::named("species", "electron"),
//!         BlockId::flat("control"),
//!         BlockId::named("species", "proton"),
//!     ]
//! );
//! ```

use crate::{BlockMap, Entry, Error, Result};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// The key whose value names a member of a named group.
pub const NAME_KEY: &str = "name";

/// Identifies one block occurrence in the block order.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum BlockId {
    /// The only block of this name.
    Flat(String),
    /// The member of a named group carrying this `name` value.
    Named(String, String),
    /// The 0-based occurrence of a repeated anonymous block.
    Indexed(String, usize),
}

impl BlockId {
    pub fn flat(name: &str) -> Self {
        BlockId::Flat(name.to_string())
    }

    pub fn named(name: &str, sub_name: &str) -> Self {
        BlockId::Named(name.to_string(), sub_name.to_string())
    }

    pub fn indexed(name: &str, index: usize) -> Self {
        BlockId::Indexed(name.to_string(), index)
    }

    /// The block name written after `begin:`.
    #[must_use]
    pub fn block_name(&self) -> &str {
        match self {
            BlockId::Flat(name) | BlockId::Named(name, _) | BlockId::Indexed(name, _) => name,
        }
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockId::Flat(name) => write!(f, "{}", name),
            BlockId::Named(name, sub_name) => write!(f, "{}:{}", name, sub_name),
            BlockId::Indexed(name, index) => write!(f, "{}_{}", name, index),
        }
    }
}

/// Reads the string form: a trailing `_<digits>` is an index, otherwise a `:`
/// separates a sub-name, otherwise the whole string is a flat block name.
///
/// Block names that themselves end in `_<digits>` or contain `:` are read
/// ambiguously; keep the typed ids returned by the parser where possible.
///
/// ```rust
/// use epoch_deck::BlockId;
///
/// assert_eq!("laser_2".parse(), Ok(BlockId::indexed("laser", 2)));
/// assert_eq!("species:ion".parse(), Ok(BlockId::named("species", "ion")));
/// assert_eq!("control".parse(), Ok(BlockId::flat("control")));
/// ```
impl FromStr for BlockId {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if let Some((name, index)) = s.rsplit_once('_') {
            if !name.is_empty() && !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit())
            {
                if let Ok(index) = index.parse() {
                    return Ok(BlockId::Indexed(name.to_string(), index));
                }
            }
        }
        Ok(match s.split_once(':') {
            Some((name, sub_name)) => BlockId::named(name, sub_name),
            None => BlockId::flat(s),
        })
    }
}

/// All blocks sharing one block name.
#[derive(Clone, Debug, PartialEq)]
pub enum BlockGroup {
    Flat(BlockMap),
    Named(IndexMap<String, BlockMap>),
    Indexed(Vec<BlockMap>),
}

impl BlockGroup {
    /// Returns the block if this group holds a single flat block.
    #[must_use]
    pub fn as_flat(&self) -> Option<&BlockMap> {
        match self {
            BlockGroup::Flat(block) => Some(block),
            _ => None,
        }
    }

    /// Looks up a member of a named group.
    #[must_use]
    pub fn get_named(&self, sub_name: &str) -> Option<&BlockMap> {
        match self {
            BlockGroup::Named(members) => members.get(sub_name),
            _ => None,
        }
    }

    /// Looks up an occurrence of an indexed group. A flat group answers index 0.
    #[must_use]
    pub fn get_indexed(&self, index: usize) -> Option<&BlockMap> {
        match self {
            BlockGroup::Indexed(members) => members.get(index),
            BlockGroup::Flat(block) if index == 0 => Some(block),
            _ => None,
        }
    }

    /// Every block of the group, in group order.
    #[must_use]
    pub fn blocks(&self) -> Vec<&BlockMap> {
        match self {
            BlockGroup::Flat(block) => vec![block],
            BlockGroup::Named(members) => members.values().collect(),
            BlockGroup::Indexed(members) => members.iter().collect(),
        }
    }

    /// Number of block occurrences in the group.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            BlockGroup::Flat(_) => 1,
            BlockGroup::Named(members) => members.len(),
            BlockGroup::Indexed(members) => members.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Serialize for BlockGroup {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            BlockGroup::Flat(block) => block.serialize(serializer),
            BlockGroup::Named(members) => {
                use serde::ser::SerializeMap;
                let mut map = serializer.serialize_map(Some(members.len()))?;
                for (sub_name, block) in members {
                    map.serialize_entry(sub_name, block)?;
                }
                map.end()
            }
            BlockGroup::Indexed(members) => {
                use serde::ser::SerializeSeq;
                let mut seq = serializer.serialize_seq(Some(members.len()))?;
                for block in members {
                    seq.serialize_element(block)?;
                }
                seq.end()
            }
        }
    }
}

/// A parsed input deck: block name to block group, in first-seen order.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Deck(IndexMap<String, BlockGroup>);

impl Deck {
    #[must_use]
    pub fn new() -> Self {
        Deck(IndexMap::new())
    }

    /// Inserts or replaces the group for `name`. An existing name keeps its position.
    pub fn insert(&mut self, name: String, group: BlockGroup) -> Option<BlockGroup> {
        self.0.insert(name, group)
    }

    /// Inserts or replaces `name` with a single flat block.
    pub fn insert_flat(&mut self, name: &str, block: BlockMap) -> Option<BlockGroup> {
        self.insert(name.to_string(), BlockGroup::Flat(block))
    }

    /// Adds a member to the named group `name`, creating the group if needed.
    ///
    /// A non-named group under the same name is replaced.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use epoch_deck::{block, Deck};
    ///
    /// let mut deck = Deck::new();
    /// deck.insert_named("species", "electron", block! { "name" => "electron" });
    /// deck.insert_named("species", "proton", block! { "name" => "proton" });
    /// assert_eq!(deck.get("species").map(|g| g.len()), Some(2));
    /// ```
    pub fn insert_named(&mut self, name: &str, sub_name: &str, block: BlockMap) {
        match self.0.get_mut(name) {
            Some(BlockGroup::Named(members)) => {
                members.insert(sub_name.to_string(), block);
            }
            _ => {
                let mut members = IndexMap::new();
                members.insert(sub_name.to_string(), block);
                self.0.insert(name.to_string(), BlockGroup::Named(members));
            }
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BlockGroup> {
        self.0.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut BlockGroup> {
        self.0.get_mut(name)
    }

    /// Resolves a block-order identifier to the block it names.
    ///
    /// A [`BlockId::Flat`] id only resolves when the group is flat.
    #[must_use]
    pub fn resolve(&self, id: &BlockId) -> Option<&BlockMap> {
        let group = self.0.get(id.block_name())?;
        match id {
            BlockId::Flat(_) => group.as_flat(),
            BlockId::Named(_, sub_name) => group.get_named(sub_name),
            BlockId::Indexed(_, index) => group.get_indexed(*index),
        }
    }

    /// The ids of every block in the deck, grouped by block name.
    ///
    /// Equivalent to the parsed block order only when blocks of different names
    /// were not interleaved in the source.
    #[must_use]
    pub fn block_ids(&self) -> Vec<BlockId> {
        let mut ids = Vec::new();
        for (name, group) in &self.0 {
            match group {
                BlockGroup::Flat(_) => ids.push(BlockId::flat(name)),
                BlockGroup::Named(members) => {
                    ids.extend(members.keys().map(|sub_name| BlockId::named(name, sub_name)));
                }
                BlockGroup::Indexed(members) => {
                    ids.extend((0..members.len()).map(|index| BlockId::indexed(name, index)));
                }
            }
        }
        ids
    }

    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the block names, in first-seen order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, BlockGroup> {
        self.0.keys()
    }

    /// Returns an iterator over the name-group pairs, in first-seen order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, BlockGroup> {
        self.0.iter()
    }

    /// Folds one parsed block into the deck and returns its block-order id.
    ///
    /// `line` is the physical line that closed the block, for error reporting.
    pub(crate) fn push_block(
        &mut self,
        name: String,
        block: BlockMap,
        line: usize,
    ) -> Result<BlockId> {
        let sub_name = match block.get(NAME_KEY) {
            Some(Entry::Single(value)) => Some(
                value
                    .as_str()
                    .map_or_else(|| value.to_string(), str::to_string),
            ),
            Some(Entry::Repeated(_)) => {
                return Err(Error::structural(
                    line,
                    "the 'name' key may only be given once per block",
                    &format!("begin:{}", name),
                ))
            }
            None => None,
        };

        let Some(group) = self.0.get_mut(&name) else {
            let (id, group) = match sub_name {
                Some(sub_name) => {
                    let id = BlockId::named(&name, &sub_name);
                    let mut members = IndexMap::new();
                    members.insert(sub_name, block);
                    (id, BlockGroup::Named(members))
                }
                None => (BlockId::indexed(&name, 0), BlockGroup::Indexed(vec![block])),
            };
            self.0.insert(name, group);
            return Ok(id);
        };

        match (sub_name, group) {
            (Some(sub_name), BlockGroup::Named(members)) => {
                if members.contains_key(&sub_name) {
                    return Err(Error::structural(
                        line,
                        &format!("duplicate block '{}' named '{}'", name, sub_name),
                        &format!("name = {}", sub_name),
                    ));
                }
                let id = BlockId::named(&name, &sub_name);
                members.insert(sub_name, block);
                Ok(id)
            }
            (None, BlockGroup::Indexed(members)) => {
                members.push(block);
                Ok(BlockId::indexed(&name, members.len() - 1))
            }
            _ => Err(Error::structural(
                line,
                &format!("blocks named '{}' mix named and anonymous occurrences", name),
                &format!("begin:{}", name),
            )),
        }
    }

    /// Turns every single-occurrence indexed group into a flat block and rewrites
    /// its id in `order`.
    pub(crate) fn collapse_singletons(&mut self, order: &mut [BlockId]) {
        for (name, group) in self.0.iter_mut() {
            let single = match group {
                BlockGroup::Indexed(members) if members.len() == 1 => members.pop(),
                _ => None,
            };
            let Some(block) = single else { continue };
            *group = BlockGroup::Flat(block);

            let indexed = BlockId::indexed(name, 0);
            if let Some(id) = order.iter_mut().find(|id| **id == indexed) {
                *id = BlockId::flat(name);
            }
        }
    }
}

impl Serialize for Deck {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, group) in &self.0 {
            map.serialize_entry(name, group)?;
        }
        map.end()
    }
}

impl FromIterator<(String, BlockGroup)> for Deck {
    fn from_iter<T: IntoIterator<Item = (String, BlockGroup)>>(iter: T) -> Self {
        Deck(IndexMap::from_iter(iter))
    }
}

impl IntoIterator for Deck {
    type Item = (String, BlockGroup);
    type IntoIter = indexmap::map::IntoIter<String, BlockGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;

    fn block_with(key: &str, value: i64) -> BlockMap {
        let mut block = BlockMap::new();
        block.insert_value(key, value);
        block
    }

    fn named_block(sub_name: &str) -> BlockMap {
        let mut block = BlockMap::new();
        block.insert_value(NAME_KEY, sub_name);
        block
    }

    #[test]
    fn test_block_id_display() {
        assert_eq!(BlockId::flat("control").to_string(), "control");
        assert_eq!(BlockId::named("species", "ion").to_string(), "species:ion");
        assert_eq!(BlockId::indexed("laser", 12).to_string(), "laser_12");
    }

    #[test]
    fn test_block_id_from_str() {
        assert_eq!("laser_12".parse(), Ok(BlockId::indexed("laser", 12)));
        assert_eq!("dist_fn".parse(), Ok(BlockId::flat("dist_fn")));
        assert_eq!("_3".parse(), Ok(BlockId::flat("_3")));
        assert_eq!("a:b_x".parse(), Ok(BlockId::named("a", "b_x")));
    }

    #[test]
    fn test_push_indexed_then_collapse() {
        let mut deck = Deck::new();
        let mut order = vec![
            deck.push_block("laser".into(), block_with("a", 1), 3).unwrap(),
            deck.push_block("control".into(), block_with("nx", 2), 6).unwrap(),
            deck.push_block("laser".into(), block_with("a", 3), 9).unwrap(),
        ];
        deck.collapse_singletons(&mut order);

        assert_eq!(
            order,
            vec![
                BlockId::indexed("laser", 0),
                BlockId::flat("control"),
                BlockId::indexed("laser", 1),
            ]
        );
        assert!(matches!(deck.get("laser"), Some(BlockGroup::Indexed(m)) if m.len() == 2));
        assert_eq!(deck.get("control"), Some(&BlockGroup::Flat(block_with("nx", 2))));
    }

    #[test]
    fn test_push_named() {
        let mut deck = Deck::new();
        let first = deck.push_block("species".into(), named_block("e"), 4).unwrap();
        let second = deck.push_block("species".into(), named_block("p"), 8).unwrap();
        assert_eq!(first, BlockId::named("species", "e"));
        assert_eq!(second, BlockId::named("species", "p"));
        assert_eq!(
            deck.resolve(&second).and_then(|b| b.get_value(NAME_KEY)),
            Some(&Value::from("p"))
        );
    }

    #[test]
    fn test_push_rejects_duplicates_and_mixing() {
        let mut deck = Deck::new();
        deck.push_block("species".into(), named_block("e"), 4).unwrap();
        let err = deck.push_block("species".into(), named_block("e"), 8).unwrap_err();
        assert!(matches!(err, Error::Structural { line: 8, .. }));

        let err = deck.push_block("species".into(), block_with("a", 1), 12).unwrap_err();
        assert!(matches!(err, Error::Structural { line: 12, .. }));
    }

    #[test]
    fn test_numeric_name_value() {
        let mut deck = Deck::new();
        let id = deck.push_block("laser".into(), block_with(NAME_KEY, 2), 3).unwrap();
        assert_eq!(id, BlockId::named("laser", "2"));
    }

    #[test]
    fn test_quoted_name_value() {
        let mut deck = Deck::new();
        let mut block = BlockMap::new();
        block.insert_value(NAME_KEY, "42");
        let id = deck.push_block("species".into(), block, 3).unwrap();
        assert_eq!(id, BlockId::named("species", "42"));
    }

    #[test]
    fn test_block_ids() {
        let mut deck = Deck::new();
        deck.insert_named("species", "e", named_block("e"));
        deck.insert(
            "laser".into(),
            BlockGroup::Indexed(vec![BlockMap::new(), BlockMap::new()]),
        );
        deck.insert_flat("control", BlockMap::new());
        assert_eq!(
            deck.block_ids(),
            vec![
                BlockId::named("species", "e"),
                BlockId::indexed("laser", 0),
                BlockId::indexed("laser", 1),
                BlockId::flat("control"),
            ]
        );
    }
}
