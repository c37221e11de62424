//! Deck serialization.
//!
//! This module provides [`DeckWriter`], which writes a [`Deck`] back to deck text
//! following a block order.
//!
//! ## Overview
//!
//! - Each block is written as `begin:<name>`, its entries, `end:<name>` and a blank line
//! - A repeated key is written once per value, in order
//! - `comment_<i>` entries become `# <text>` lines in place
//! - `<key>_inline_comment_<n>` entries are appended to the n-th line of `key`
//! - Booleans are written `T` / `F`; special keywords use `key:value`
//! - Strings are written bare unless the bare text would read back as another
//!   value (`'42'`, `' padded'`); comment text is always bare
//!
//! ## Usage
//!
//! ```rust
//! use epoch_deck::{block, dumps, Deck};
//!
//! let mut deck = Deck::new();
//! deck.insert_flat("block", block! { "a" => 1, "e" => false, "c" => [3, 4] });
//!
//! let text = dumps(&deck, None).unwrap();
//! assert_eq!(text, "begin:block\n  a = 1\n  e = F\n  c = 3\n  c = 4\nend:block\n\n");
//! ```

use crate::map::{is_comment_key, is_inline_comment_key};
use crate::{BlockGroup, BlockId, BlockMap, Deck, DeckOptions, Error, Result, Value};
use tracing::debug;

/// The deck writer.
///
/// Accumulates deck text in memory. Created via [`DeckWriter::new`].
pub struct DeckWriter<'o> {
    output: String,
    options: &'o DeckOptions,
}

impl<'o> DeckWriter<'o> {
    pub fn new(options: &'o DeckOptions) -> Self {
        DeckWriter {
            output: String::with_capacity(256),
            options,
        }
    }

    pub fn into_inner(self) -> String {
        self.output
    }

    /// Writes every block named by `order`.
    ///
    /// A [`BlockId::Flat`] id on a named or indexed group writes every member of
    /// the group. Without an order, the deck's own block names are used.
    pub fn write_deck(&mut self, deck: &Deck, order: Option<&[BlockId]>) -> Result<()> {
        let default_order;
        let order = match order {
            Some(order) => order,
            None => {
                default_order = deck.keys().map(|name| BlockId::flat(name)).collect::<Vec<_>>();
                &default_order
            }
        };

        for id in order {
            let name = id.block_name();
            let group = deck
                .get(name)
                .ok_or_else(|| Error::unresolved_block(&id.to_string()))?;

            match (id, group) {
                (BlockId::Flat(_), BlockGroup::Named(_) | BlockGroup::Indexed(_)) => {
                    for block in group.blocks() {
                        self.write_block(name, block);
                    }
                }
                _ => {
                    let block = deck
                        .resolve(id)
                        .ok_or_else(|| Error::unresolved_block(&id.to_string()))?;
                    self.write_block(name, block);
                }
            }
        }
        Ok(())
    }

    /// Writes one `begin:`/`end:` block.
    pub fn write_block(&mut self, name: &str, block: &BlockMap) {
        debug!(block = name, entries = block.len(), "Writing block");
        self.output.push_str("begin:");
        self.output.push_str(name);
        self.output.push('\n');

        for (key, entry) in block {
            if is_comment_key(key) {
                for text in entry.values() {
                    self.write_indent();
                    self.output.push_str("# ");
                    self.write_text(text);
                    self.output.push('\n');
                }
                continue;
            }

            if is_inline_comment_key(key) {
                continue;
            }

            for (occurrence, value) in entry.values().iter().enumerate() {
                self.write_entry(key, value, block.inline_comment(key, occurrence));
            }
        }

        self.output.push_str("end:");
        self.output.push_str(name);
        self.output.push_str("\n\n");
    }

    fn write_indent(&mut self) {
        for _ in 0..self.options.indent {
            self.output.push(' ');
        }
    }

    /// Comment text is written as stored, never quoted.
    fn write_text(&mut self, text: &Value) {
        match text.as_str() {
            Some(text) => self.output.push_str(text),
            None => self.output.push_str(&text.to_string()),
        }
    }

    fn write_entry(&mut self, key: &str, value: &Value, inline_comment: Option<&Value>) {
        let separator = if self.options.is_special_keyword(key) {
            ":"
        } else {
            " = "
        };
        self.write_indent();
        self.output.push_str(key);
        self.output.push_str(separator);
        self.output.push_str(&value.to_string());
        if let Some(comment) = inline_comment {
            self.output.push_str(" # ");
            self.write_text(comment);
        }
        self.output.push('\n');
    }
}
