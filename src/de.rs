//! Deck parsing.
//!
//! This module provides [`DeckReader`], which turns deck text into a
//! [`Deck`] and its block order.
//!
//! ## Overview
//!
//! - **Top level**: comments are stripped, continuations joined, blank lines skipped.
//!   `begin:<name>` opens a block; `import:` directives are recognized and skipped.
//! - **Inside a block**: continuations are joined first, then standalone (`# ...`) and
//!   inline (`key = value # ...`) comments are recorded, and every other line is split
//!   into key and value at the first separator.
//! - **Folding**: blocks with a `name` key form named groups, repeated anonymous blocks
//!   form indexed groups, and a block occurring once stays flat.
//!
//! Block names are the exact text after the colon, so `begin: ctl` names the
//! block ` ctl` and must be closed by `end: ctl`.
//!
//! ## Comment keys
//!
//! A standalone comment is stored as `comment_<i>`, counting comment lines in the
//! block from 0. An inline comment is stored as `<key>_inline_comment_<n>` where
//! `n` is the 0-based occurrence of `key` the comment trails, not a count of the
//! comments seen for that key. For
//!
//! ```text
//! c = 3
//! c = 4 # second
//! ```
//!
//! the comment key is `c_inline_comment_1`, so the writer can put it back on the
//! second `c` line. A counter of comments per key would have produced
//! `c_inline_comment_0`.
//!
//! Most users should use the high-level functions in the crate root:
//!
//! ```rust
//! use epoch_deck::{loads, Entry, Value};
//!
//! let (deck, _) = loads("begin:block\n  c = 3\n  c = 4\nend:block\n").unwrap();
//! let block = deck.get("block").and_then(|g| g.as_flat()).unwrap();
//! assert_eq!(
//!     block.get("c"),
//!     Some(&Entry::Repeated(vec![Value::from(3), Value::from(4)]))
//! );
//! ```

use crate::lines::{strip_comment, LineReader};
use crate::{coerce, BlockId, BlockMap, Deck, DeckOptions, Entry, Error, Result, Value};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::io::BufRead;
use tracing::{debug, trace, warn};

const BEGIN_MARKER: &str = "begin:";
const END_MARKER: &str = "end:";
const IMPORT_MARKER: &str = "import:";

/// Returns the text after `marker` if `line` starts with it, ignoring ASCII case.
fn strip_marker<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    let head = line.get(..marker.len())?;
    if head.eq_ignore_ascii_case(marker) {
        Some(&line[marker.len()..])
    } else {
        None
    }
}

/// The deck parser.
///
/// Reads physical lines from any [`BufRead`] source. Created via [`DeckReader::new`].
pub struct DeckReader<'o, R> {
    lines: LineReader<R>,
    options: &'o DeckOptions,
}

impl<'o, R: BufRead> DeckReader<'o, R> {
    pub fn new(reader: R, options: &'o DeckOptions) -> Self {
        DeckReader {
            lines: LineReader::new(reader),
            options,
        }
    }

    /// Reads the whole input into a deck and its block order.
    ///
    /// Any error aborts the read; blocks parsed before the error are discarded.
    pub fn read_deck(mut self) -> Result<(Deck, Vec<BlockId>)> {
        let mut deck = Deck::new();
        let mut order = Vec::new();

        while let Some(raw) = self.lines.next_line()? {
            let line = strip_comment(&raw).trim().to_string();
            let line = self.lines.join_continuations(line)?;

            if line.is_empty() {
                continue;
            }

            if let Some(name) = strip_marker(&line, BEGIN_MARKER) {
                let (name, block) = self.parse_block(name)?;
                let id = deck.push_block(name, block, self.lines.line_number())?;
                order.push(id);
            } else if let Some(target) = strip_marker(&line, IMPORT_MARKER) {
                debug!(
                    line = self.lines.line_number(),
                    target = target.trim(),
                    "Skipping import directive"
                );
            } else {
                warn!(
                    line = self.lines.line_number(),
                    content = line.as_str(),
                    "Ignoring text outside of any block"
                );
            }
        }

        deck.collapse_singletons(&mut order);
        debug!(blocks = order.len(), "Read deck");
        Ok((deck, order))
    }

    /// Parses the body of one block. `header` is the text after `begin:`, taken
    /// as the block name exactly; the `end:` line must repeat it exactly.
    ///
    /// Returns the block name and its entries, with repeated keys collapsed.
    pub fn parse_block(&mut self, header: &str) -> Result<(String, BlockMap)> {
        let start_line = self.lines.line_number();
        let name = header.to_string();
        if name.is_empty() {
            return Err(Error::structural(
                start_line,
                "block has no name",
                &format!("{}{}", BEGIN_MARKER, header),
            ));
        }
        debug!(block = name.as_str(), line = start_line, "Opening block");

        let mut values: IndexMap<String, Vec<Value>> = IndexMap::new();
        let mut comment_index = 0;
        let mut occurrences: HashMap<String, usize> = HashMap::new();

        loop {
            let Some(raw) = self.lines.next_line()? else {
                return Err(Error::unexpected_eof(
                    self.lines.line_number(),
                    &format!("{}{}", END_MARKER, name),
                ));
            };
            let joined = self.lines.join_continuations(raw)?;
            let line = joined.trim();

            if line.is_empty() {
                continue;
            }

            if let Some(end_name) = strip_marker(line, END_MARKER) {
                if end_name != name {
                    return Err(Error::format(self.lines.line_number(), &name, end_name));
                }
                break;
            }

            if let Some(text) = line.strip_prefix('#') {
                let key = crate::map::comment_key(comment_index);
                values.insert(key, vec![Value::String(text.trim().to_string())]);
                comment_index += 1;
                continue;
            }

            let (line, comment) = match line.split_once('#') {
                Some((content, comment)) => (content.trim(), Some(comment.trim())),
                None => (line, None),
            };

            let separator = if self.options.special_keyword_prefix(line).is_some() {
                ':'
            } else {
                '='
            };
            let Some((key, raw_value)) = line.split_once(separator) else {
                return Err(Error::structural(
                    self.lines.line_number(),
                    &format!("missing '{}' separator in block '{}'", separator, name),
                    line,
                ));
            };
            let key = key.trim().to_string();
            let value = coerce(raw_value);
            trace!(block = name.as_str(), key = key.as_str(), value = %value, "Entry");

            let occurrence = occurrences.entry(key.clone()).or_insert(0);
            let comment_key = crate::map::inline_comment_key(&key, *occurrence);
            *occurrence += 1;

            values.entry(key).or_default().push(value);
            if let Some(comment) = comment.filter(|c| !c.is_empty()) {
                values.insert(comment_key, vec![Value::String(comment.to_string())]);
            }
        }

        let block: BlockMap = values
            .into_iter()
            .map(|(key, values)| (key, Entry::from_values(values)))
            .collect();
        debug!(block = name.as_str(), entries = block.len(), "Closed block");
        Ok((name, block))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<(Deck, Vec<BlockId>)> {
        let options = DeckOptions::default();
        DeckReader::new(text.as_bytes(), &options).read_deck()
    }

    fn single_block(text: &str) -> BlockMap {
        let options = DeckOptions::default();
        let mut reader = DeckReader::new(text.as_bytes(), &options);
        reader.parse_block("block").unwrap().1
    }

    #[test]
    fn test_parse_block_values() {
        let block = single_block("  a = 1\n  b = 2.5\n  c = electron\n  d = T\nend:block\n");
        assert_eq!(block.get_value("a"), Some(&Value::Integer(1)));
        assert_eq!(block.get_value("b"), Some(&Value::Float(2.5)));
        assert_eq!(block.get_value("c"), Some(&Value::from("electron")));
        assert_eq!(block.get_value("d"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_inline_comment_follows_occurrence() {
        let block = single_block("c = 3\nc = 4 # second\nend:block\n");
        assert_eq!(block.inline_comment("c", 1), Some(&Value::from("second")));
        assert!(!block.contains_key("c_inline_comment_0"));
    }

    #[test]
    fn test_comment_counter_is_per_block() {
        let block = single_block("# one\na = 1 # inline\n# two\nend:block\n");
        let keys: Vec<_> = block.keys().cloned().collect();
        assert_eq!(
            keys,
            vec!["comment_0", "a", "a_inline_comment_0", "comment_1"]
        );
        assert_eq!(block.get_value("comment_1"), Some(&Value::from("two")));
    }

    #[test]
    fn test_first_separator_split() {
        let block = single_block("expr = a = b\nend:block\n");
        assert_eq!(block.get_value("expr"), Some(&Value::from("a = b")));
    }

    #[test]
    fn test_end_marker_case_insensitive() {
        let block = single_block("a = 1\nEND:block\n");
        assert_eq!(block.len(), 1);
    }

    #[test]
    fn test_end_name_is_case_sensitive() {
        let options = DeckOptions::default();
        let mut reader = DeckReader::new("a = 1\nend:Block\n".as_bytes(), &options);
        let err = reader.parse_block("block").unwrap_err();
        assert!(matches!(err, Error::Format { line: 2, .. }));
    }

    #[test]
    fn test_block_name_is_exact_remainder() {
        let err = parse("begin: ctl\n n = 1\nend:ctl\n").unwrap_err();
        assert!(matches!(err, Error::Format { line: 3, ref expected, .. } if expected == " ctl"));

        let (deck, order) = parse("begin: ctl\n n = 1\nend: ctl\n").unwrap();
        assert_eq!(order, vec![BlockId::flat(" ctl")]);
        assert!(deck.contains_key(" ctl"));
    }

    #[test]
    fn test_missing_separator() {
        let err = parse("begin:block\n  a 1\nend:block\n").unwrap_err();
        assert!(matches!(err, Error::Structural { line: 2, .. }));
    }

    #[test]
    fn test_unclosed_block() {
        let err = parse("begin:block\n  a = 1\n").unwrap_err();
        assert!(matches!(err, Error::UnexpectedEof { .. }));
    }

    #[test]
    fn test_nameless_block() {
        let err = parse("begin:\nend:\n").unwrap_err();
        assert!(matches!(err, Error::Structural { line: 1, .. }));
    }

    #[test]
    fn test_import_and_stray_lines_are_skipped() {
        let (deck, order) =
            parse("import:other.deck\nstray text\nbegin:a\n x = 1\nend:a\n").unwrap();
        assert_eq!(deck.len(), 1);
        assert_eq!(order, vec![BlockId::flat("a")]);
    }

    #[test]
    fn test_top_level_comments_and_continuation() {
        // The joined header gains a space before the continued text
        let (deck, order) = parse("# header\nbegin:\\\nctl\n n = 1 # c\nend: ctl\n").unwrap();
        assert_eq!(order, vec![BlockId::flat(" ctl")]);
        assert!(deck.contains_key(" ctl"));
    }
}
