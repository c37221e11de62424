//! Line preprocessing: comment stripping and backslash continuation.
//!
//! [`LineReader`] hands out physical lines and counts them so parse errors can
//! report where they happened. A backslash anywhere on a line joins it with the
//! next physical line, with a single space in between:
//!
//! ```rust
//! use epoch_deck::lines::LineReader;
//!
//! let mut reader = LineReader::new("x = 1 + \\\n    2\n".as_bytes());
//! let first = reader.next_line().unwrap().unwrap();
//! assert_eq!(reader.join_continuations(first).unwrap(), "x = 1 + 2");
//! ```

use crate::{Error, Result};
use std::io::BufRead;

/// Truncates `line` at the first `#`.
///
/// A `#` inside a quoted value is not protected.
///
/// ```rust
/// use epoch_deck::strip_comment;
///
/// assert_eq!(strip_comment("nx = 10 # cells"), "nx = 10 ");
/// assert_eq!(strip_comment("nx = 10"), "nx = 10");
/// ```
#[must_use]
pub fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(start) => &line[..start],
        None => line,
    }
}

/// A source of physical lines with 1-based line counting.
pub struct LineReader<R> {
    reader: R,
    line: usize,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(reader: R) -> Self {
        LineReader { reader, line: 0 }
    }

    /// Number of the most recently read physical line (0 before the first read).
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.line
    }

    /// Reads the next physical line without its line terminator.
    ///
    /// Returns `Ok(None)` at end of input.
    pub fn next_line(&mut self) -> Result<Option<String>> {
        let mut buf = String::new();
        let read = self
            .reader
            .read_line(&mut buf)
            .map_err(|e| Error::io(&e.to_string()))?;
        if read == 0 {
            return Ok(None);
        }
        self.line += 1;
        if buf.ends_with('\n') {
            buf.pop();
            if buf.ends_with('\r') {
                buf.pop();
            }
        }
        Ok(Some(buf))
    }

    /// Joins `line` with as many following lines as its backslashes request.
    ///
    /// Every backslash is removed from the joined text. Fails with
    /// [`Error::UnexpectedEof`] when a continuation runs past the last line.
    pub fn join_continuations(&mut self, mut line: String) -> Result<String> {
        while line.contains('\\') {
            let next = self
                .next_line()?
                .ok_or_else(|| Error::unexpected_eof(self.line, "continuation line"))?;
            line = format!("{} {}", line.replace('\\', "").trim(), next.trim());
        }
        Ok(line)
    }
}
