//! Configuration options for reading and writing decks.
//!
//! [`DeckOptions`] controls the indentation of entries inside written blocks and
//! the set of special keywords that use `:` instead of `=` as their separator.
//!
//! ## Examples
//!
//! ```rust
//! use epoch_deck::{dumps_with_options, loads, DeckOptions};
//!
//! let (deck, order) = loads("begin:control\n  nx = 10\nend:control\n").unwrap();
//!
//! let options = DeckOptions::new().with_indent(4);
//! let text = dumps_with_options(&deck, Some(&order), &options).unwrap();
//! assert_eq!(text, "begin:control\n    nx = 10\nend:control\n\n");
//! ```

use serde::{Deserialize, Serialize};

/// Keywords written as `key:value` rather than `key = value`.
pub const DEFAULT_SPECIAL_KEYWORDS: [&str; 2] = ["include_species", "identify"];

/// Configuration options for deck parsing and serialization.
///
/// Options can be embedded in a host application's own configuration; missing
/// fields take their defaults.
///
/// ```rust
/// use epoch_deck::DeckOptions;
///
/// let options: DeckOptions = serde_json::from_str(r#"{"indent": 4}"#).unwrap();
/// assert_eq!(options.indent, 4);
/// assert!(options.is_special_keyword("identify"));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckOptions {
    /// Spaces before each entry and comment line inside a written block.
    pub indent: usize,
    /// Keys that use `:` as their separator.
    pub special_keywords: Vec<String>,
}

impl Default for DeckOptions {
    fn default() -> Self {
        DeckOptions {
            indent: 2,
            special_keywords: DEFAULT_SPECIAL_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
        }
    }
}

impl DeckOptions {
    /// Creates default options (2-space indent, `include_species` and `identify`).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the indentation used for entries when writing.
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Adds one special keyword.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use epoch_deck::DeckOptions;
    ///
    /// let options = DeckOptions::new().with_special_keyword("use_species");
    /// assert!(options.is_special_keyword("use_species"));
    /// assert!(options.is_special_keyword("include_species"));
    /// ```
    #[must_use]
    pub fn with_special_keyword(mut self, keyword: &str) -> Self {
        if !self.is_special_keyword(keyword) {
            self.special_keywords.push(keyword.to_string());
        }
        self
    }

    /// Replaces the whole special keyword set.
    #[must_use]
    pub fn with_special_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.special_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Returns `true` if `key` is written with the `:` separator.
    #[must_use]
    pub fn is_special_keyword(&self, key: &str) -> bool {
        self.special_keywords.iter().any(|k| k == key)
    }

    /// Returns the special keyword an entry line starts with, if any.
    ///
    /// The match is case-insensitive and requires the keyword to be followed by
    /// optional whitespace and `:`.
    pub(crate) fn special_keyword_prefix(&self, line: &str) -> Option<&str> {
        self.special_keywords.iter().map(String::as_str).find(|keyword| {
            line.get(..keyword.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(keyword))
                && line[keyword.len()..].trim_start().starts_with(':')
        })
    }
}
