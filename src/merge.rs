//! Deep merging of deck patches.
//!
//! [`deep_update`] applies patches to a deck the way a recursive dictionary update
//! would, without clobbering blocks or named members the patch does not mention.

use crate::{BlockGroup, BlockMap, Deck};

/// Returns `deck` with every patch applied in turn.
///
/// - A flat block patched by a flat block has its entries overwritten key by key.
/// - A named group patched by a named group merges member by member; new members
///   are added.
/// - Any other combination, including indexed groups, is replaced by the patch.
///
/// Neither `deck` nor the patches are modified.
///
/// ```rust
/// use epoch_deck::{block, deep_update, Deck};
///
/// let mut deck = Deck::new();
/// deck.insert_flat("block", block! { "a" => 1, "b" => 2 });
/// let mut patch = Deck::new();
/// patch.insert_flat("block", block! { "b" => 7 });
///
/// let merged = deep_update(&deck, [&patch]);
/// let block = merged.get("block").and_then(|g| g.as_flat()).unwrap();
/// assert_eq!(block, &block! { "a" => 1, "b" => 7 });
/// ```
#[must_use]
pub fn deep_update<'a, I>(deck: &Deck, patches: I) -> Deck
where
    I: IntoIterator<Item = &'a Deck>,
{
    let mut updated = deck.clone();
    for patch in patches {
        for (name, patch_group) in patch.iter() {
            let merged = match updated.get(name) {
                Some(current) => merge_group(current, patch_group),
                None => patch_group.clone(),
            };
            updated.insert(name.clone(), merged);
        }
    }
    updated
}

fn merge_group(current: &BlockGroup, patch: &BlockGroup) -> BlockGroup {
    match (current, patch) {
        (BlockGroup::Flat(current), BlockGroup::Flat(patch)) => {
            BlockGroup::Flat(merge_block(current, patch))
        }
        (BlockGroup::Named(current), BlockGroup::Named(patch)) => {
            let mut members = current.clone();
            for (sub_name, patch_block) in patch {
                let merged = match members.get(sub_name) {
                    Some(existing) => merge_block(existing, patch_block),
                    None => patch_block.clone(),
                };
                members.insert(sub_name.clone(), merged);
            }
            BlockGroup::Named(members)
        }
        (_, patch) => patch.clone(),
    }
}

fn merge_block(current: &BlockMap, patch: &BlockMap) -> BlockMap {
    let mut merged = current.clone();
    for (key, entry) in patch {
        merged.insert(key.clone(), entry.clone());
    }
    merged
}
