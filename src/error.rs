//! Error types for reading and writing input decks.
//!
//! ## Error Categories
//!
//! - **Format Errors**: An `end:` marker names a different block than the `begin:` it closes
//! - **Structural Errors**: A line inside a block cannot be split into key and value, or
//!   the blocks of one name cannot be arranged into a single group
//! - **Unexpected End of Input**: A continuation or a block runs past the last line
//! - **Unresolved Blocks**: A block-order identifier that does not exist in the deck
//! - **I/O Errors**: Reader or writer failures
//!
//! Parsing errors carry the 1-based physical line number where they were detected.
//! Any error aborts the parse; no partial deck is ever returned.
//!
//! ## Examples
//!
//! ```rust
//! use epoch_deck::{loads, Error};
//!
//! let result = loads("begin:control\n  nx = 10\nend:constant\n");
//! assert!(matches!(result, Err(Error::Format { .. })));
//! ```

use thiserror::Error;

/// Represents all possible errors that can occur while reading or writing a deck.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// The `end:` marker does not match the enclosing `begin:`
    #[error("Block name mismatch at line {line}: expected '{expected}', got '{found}'")]
    Format {
        line: usize,
        expected: String,
        found: String,
    },

    /// A line or block that cannot be placed in the deck structure
    #[error("Structural error at line {line}: {msg}\n{context}")]
    Structural {
        line: usize,
        msg: String,
        context: String,
    },

    /// Unexpected end of input
    #[error("Unexpected end of input at line {line}\nExpected: {expected}")]
    UnexpectedEof { line: usize, expected: String },

    /// A block-order identifier with no matching block in the deck
    #[error("Block '{0}' is not present in the deck")]
    UnresolvedBlock(String),
}

impl Error {
    /// Creates a block name mismatch error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use epoch_deck::Error;
    ///
    /// let err = Error::format(12, "control", "boundaries");
    /// assert!(err.to_string().contains("expected 'control'"));
    /// ```
    pub fn format(line: usize, expected: &str, found: &str) -> Self {
        Error::Format {
            line,
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// Creates a structural error, quoting the offending line as context.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use epoch_deck::Error;
    ///
    /// let err = Error::structural(3, "missing '=' separator", "nx 10");
    /// assert!(err.to_string().contains("line 3"));
    /// ```
    pub fn structural(line: usize, msg: &str, context: &str) -> Self {
        Error::Structural {
            line,
            msg: msg.to_string(),
            context: context.to_string(),
        }
    }

    /// Creates an unexpected end-of-input error.
    pub fn unexpected_eof(line: usize, expected: &str) -> Self {
        Error::UnexpectedEof {
            line,
            expected: expected.to_string(),
        }
    }

    /// Creates an error for a block-order identifier missing from the deck.
    pub fn unresolved_block(id: &str) -> Self {
        Error::UnresolvedBlock(id.to_string())
    }

    /// Creates an I/O error for reader or writer failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// The physical line an error was detected on, if it came from parsing.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Format { line, .. }
            | Error::Structural { line, .. }
            | Error::UnexpectedEof { line, .. } => Some(*line),
            Error::Io(_) | Error::UnresolvedBlock(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_numbers() {
        assert_eq!(Error::format(4, "a", "b").line(), Some(4));
        assert_eq!(Error::unexpected_eof(9, "end:a").line(), Some(9));
        assert_eq!(Error::unresolved_block("laser_3").line(), None);
    }

    #[test]
    fn test_messages() {
        let err = Error::unresolved_block("species:ion");
        assert_eq!(err.to_string(), "Block 'species:ion' is not present in the deck");

        let err = Error::unexpected_eof(7, "continuation line");
        assert!(err.to_string().contains("Expected: continuation line"));
    }
}
