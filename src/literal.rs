//! Value coercion.
//!
//! Every value token read from a deck goes through [`coerce`], which never fails:
//! literals become typed values and everything else stays a trimmed string.
//!
//! Recognized literals:
//!
//! - integers: `42`, `-7`, `1_000`, `0x1F`, `0o17`, `0b101`
//! - floats: `2.5`, `.5`, `5.`, `1e-6`, `2.5E+3`
//! - quoted strings: `'electron'`, `"a \"b\""`, with adjacent literals concatenated
//! - `True` / `False`
//! - sequences: `[1, 2, 3]`, `(0.5, 'x')`, `(1,)`
//!
//! After literal evaluation the bare strings `T` and `F` become booleans.
//!
//! ```rust
//! use epoch_deck::{coerce, Value};
//!
//! assert_eq!(coerce(" 3 "), Value::Integer(3));
//! assert_eq!(coerce("1e-6"), Value::Float(1e-6));
//! assert_eq!(coerce("10 * femto"), Value::from("10 * femto"));
//! assert_eq!(coerce("F"), Value::Bool(false));
//! ```

use crate::Value;

/// Converts a raw value token into a typed [`Value`].
#[must_use]
pub fn coerce(token: &str) -> Value {
    let trimmed = token.trim();
    let value = parse_literal(trimmed).unwrap_or_else(|| Value::String(trimmed.to_string()));

    match value {
        Value::String(s) if s == "T" => Value::Bool(true),
        Value::String(s) if s == "F" => Value::Bool(false),
        other => other,
    }
}

/// Parses `text` as a single literal, returning `None` if any part of it is not
/// literal syntax.
///
/// ```rust
/// use epoch_deck::literal::parse_literal;
/// use epoch_deck::Value;
///
/// assert_eq!(parse_literal("'x'"), Some(Value::from("x")));
/// assert_eq!(parse_literal("x"), None);
/// assert_eq!(parse_literal("[1, 2"), None);
/// ```
#[must_use]
pub fn parse_literal(text: &str) -> Option<Value> {
    let mut parser = LiteralParser { input: text, pos: 0 };
    let value = parser.parse_value()?;
    parser.skip_whitespace();
    if parser.at_end() {
        Some(value)
    } else {
        None
    }
}

struct LiteralParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> LiteralParser<'a> {
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn parse_value(&mut self) -> Option<Value> {
        self.skip_whitespace();
        match self.peek()? {
            '[' => {
                self.bump();
                self.parse_sequence(']').map(Value::List)
            }
            '(' => {
                self.bump();
                self.parse_parenthesized()
            }
            '\'' | '"' => self.parse_strings(),
            '+' | '-' => {
                let negative = self.bump() == Some('-');
                self.skip_whitespace();
                match self.peek() {
                    Some(c) if c.is_ascii_digit() || c == '.' => self.parse_number(negative),
                    _ => None,
                }
            }
            c if c.is_ascii_digit() || c == '.' => self.parse_number(false),
            c if c.is_alphabetic() || c == '_' => self.parse_name(),
            _ => None,
        }
    }

    /// Parses comma-separated values up to `close`; the opening bracket is consumed.
    fn parse_sequence(&mut self, close: char) -> Option<Vec<Value>> {
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek() == Some(close) {
                self.bump();
                return Some(items);
            }
            items.push(self.parse_value()?);
            self.skip_whitespace();
            match self.bump()? {
                ',' => continue,
                c if c == close => return Some(items),
                _ => return None,
            }
        }
    }

    /// `(x)` is just `x`; `()`, `(x,)` and `(x, y)` are sequences.
    fn parse_parenthesized(&mut self) -> Option<Value> {
        self.skip_whitespace();
        if self.peek() == Some(')') {
            self.bump();
            return Some(Value::List(Vec::new()));
        }
        let first = self.parse_value()?;
        self.skip_whitespace();
        match self.bump()? {
            ')' => Some(first),
            ',' => {
                let mut items = vec![first];
                items.extend(self.parse_sequence(')')?);
                Some(Value::List(items))
            }
            _ => None,
        }
    }

    fn parse_name(&mut self) -> Option<Value> {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '_' {
                self.bump();
            } else {
                break;
            }
        }
        match &self.input[start..self.pos] {
            "True" => Some(Value::Bool(true)),
            "False" => Some(Value::Bool(false)),
            _ => None,
        }
    }

    fn parse_number(&mut self, negative: bool) -> Option<Value> {
        let start = self.pos;
        let mut prev = '\0';
        while let Some(ch) = self.peek() {
            let exponent_sign = (ch == '+' || ch == '-') && (prev == 'e' || prev == 'E');
            if ch.is_ascii_alphanumeric() || ch == '_' || ch == '.' || exponent_sign {
                prev = ch;
                self.bump();
            } else {
                break;
            }
        }
        number_from_text(&self.input[start..self.pos], negative)
    }

    /// Parses one or more adjacent string literals into a single string.
    fn parse_strings(&mut self) -> Option<Value> {
        let mut result = String::new();
        while let Some(quote @ ('\'' | '"')) = self.peek() {
            self.bump();
            self.parse_string_body(quote, &mut result)?;
            self.skip_whitespace();
        }
        Some(Value::String(result))
    }

    fn parse_string_body(&mut self, quote: char, out: &mut String) -> Option<()> {
        loop {
            match self.bump()? {
                '\\' => self.parse_escape(out)?,
                '\n' => return None,
                c if c == quote => return Some(()),
                c => out.push(c),
            }
        }
    }

    fn parse_escape(&mut self, out: &mut String) -> Option<()> {
        match self.bump()? {
            '\n' => {}
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'a' => out.push('\u{0007}'),
            'b' => out.push('\u{0008}'),
            'f' => out.push('\u{000C}'),
            'v' => out.push('\u{000B}'),
            'x' => out.push(self.parse_hex_escape(2)?),
            'u' => out.push(self.parse_hex_escape(4)?),
            'U' => out.push(self.parse_hex_escape(8)?),
            first @ '0'..='7' => {
                let mut code = first.to_digit(8)?;
                for _ in 0..2 {
                    match self.peek().and_then(|c| c.to_digit(8)) {
                        Some(digit) => {
                            code = code * 8 + digit;
                            self.bump();
                        }
                        None => break,
                    }
                }
                out.push(char::from_u32(code)?);
            }
            other => {
                // Unknown escape - preserved literally
                out.push('\\');
                out.push(other);
            }
        }
        Some(())
    }

    fn parse_hex_escape(&mut self, digits: usize) -> Option<char> {
        let mut code = 0u32;
        for _ in 0..digits {
            code = code * 16 + self.bump()?.to_digit(16)?;
        }
        char::from_u32(code)
    }
}

/// Digits separated by single underscores, e.g. `1_000`.
fn is_digit_group(s: &str, radix: u32) -> bool {
    !s.is_empty()
        && !s.starts_with('_')
        && !s.ends_with('_')
        && !s.contains("__")
        && s.chars().all(|c| c == '_' || c.is_digit(radix))
}

fn number_from_text(text: &str, negative: bool) -> Option<Value> {
    let sign = if negative { "-" } else { "" };
    let lower = text.to_ascii_lowercase();

    for (prefix, radix) in [("0x", 16), ("0o", 8), ("0b", 2)] {
        if let Some(digits) = lower.strip_prefix(prefix) {
            let digits = digits.strip_prefix('_').unwrap_or(digits);
            if !is_digit_group(digits, radix) {
                return None;
            }
            let digits = format!("{}{}", sign, digits.replace('_', ""));
            return i64::from_str_radix(&digits, radix).ok().map(Value::Integer);
        }
    }

    if lower.contains('.') || lower.contains('e') {
        let (mantissa, exponent) = match lower.split_once('e') {
            Some((m, e)) => (m, Some(e)),
            None => (lower.as_str(), None),
        };
        let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        if (!int_part.is_empty() && !is_digit_group(int_part, 10))
            || (!frac_part.is_empty() && !is_digit_group(frac_part, 10))
        {
            return None;
        }
        if let Some(exponent) = exponent {
            let digits = exponent
                .strip_prefix('+')
                .or_else(|| exponent.strip_prefix('-'))
                .unwrap_or(exponent);
            if !is_digit_group(digits, 10) {
                return None;
            }
        }
        let literal = format!("{}{}", sign, lower.replace('_', ""));
        return literal.parse::<f64>().ok().map(Value::Float);
    }

    if !is_digit_group(&lower, 10) {
        return None;
    }
    let digits = lower.replace('_', "");
    // Leading zeros are only allowed on zero itself
    if digits.len() > 1 && digits.starts_with('0') && digits.chars().any(|c| c != '0') {
        return None;
    }
    format!("{}{}", sign, digits).parse::<i64>().ok().map(Value::Integer)
}
