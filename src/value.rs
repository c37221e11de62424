//! Typed values held by deck entries.
//!
//! This module provides the [`Value`] enum, the typed form of a value token, and
//! [`Entry`], the one-or-more values recorded for a key inside a block.
//!
//! ## Core Types
//!
//! - [`Value`]: integer, float, boolean, string, or a list of values
//! - [`Entry`]: a single value, or the values of a key repeated within one block
//!
//! ## Creating Values
//!
//! ```rust
//! use epoch_deck::{Entry, Value};
//!
//! let nx = Value::from(400);
//! let t_end = Value::from(1.5e-12);
//! let species = Value::from("electron");
//! assert!(nx.is_integer());
//!
//! let repeated = Entry::from_values(vec![Value::from(3), Value::from(4)]);
//! assert_eq!(repeated.len(), 2);
//! ```
//!
//! ## Deck Tokens
//!
//! `Display` renders a value the way it is written in a deck: booleans as `T`/`F`,
//! lists as bracketed literals that read back to the same value, and strings raw
//! unless the raw text would read back as something else, in which case they are
//! quoted.
//!
//! ```rust
//! use epoch_deck::Value;
//!
//! assert_eq!(Value::Bool(false).to_string(), "F");
//! assert_eq!(Value::Float(100.0).to_string(), "100.0");
//! let list = Value::List(vec![Value::from(1), Value::from("a")]);
//! assert_eq!(list.to_string(), "[1, 'a']");
//! assert_eq!(Value::from("10 * femto").to_string(), "10 * femto");
//! assert_eq!(Value::from("42").to_string(), "'42'");
//! ```

use crate::literal::coerce;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A typed value read from the right-hand side of a deck entry.
///
/// Tokens that are not literals stay strings, so `10 * femto` is
/// `Value::String("10 * femto")`.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Bool(bool),
    String(String),
    List(Vec<Value>),
}

impl Value {
    /// Returns `true` if the value is an integer.
    #[inline]
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Value::Integer(_))
    }

    /// Returns `true` if the value is a float.
    #[inline]
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self, Value::Float(_))
    }

    /// Returns `true` if the value is a boolean.
    #[inline]
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    /// Returns `true` if the value is a string.
    #[inline]
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    /// Returns `true` if the value is a list literal.
    #[inline]
    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    /// If the value is a boolean, returns it. Otherwise returns `None`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use epoch_deck::Value;
    ///
    /// assert_eq!(Value::Bool(true).as_bool(), Some(true));
    /// assert_eq!(Value::from(1).as_bool(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// If the value is a string, returns a reference to it. Otherwise returns `None`.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// If the value is an integer, returns it. Otherwise returns `None`.
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as an `f64` if it is numeric.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use epoch_deck::Value;
    ///
    /// assert_eq!(Value::from(2).as_f64(), Some(2.0));
    /// assert_eq!(Value::from(2.5).as_f64(), Some(2.5));
    /// assert_eq!(Value::from("2.5").as_f64(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// If the value is a list, returns its elements. Otherwise returns `None`.
    #[inline]
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

/// Writes a float so it reads back as a float: shortest round-trip digits,
/// always with a decimal point or an exponent.
fn write_float(out: &mut impl fmt::Write, f: f64) -> fmt::Result {
    write!(out, "{:?}", f)
}

/// Writes a string as a quoted literal, preferring single quotes.
fn write_quoted(out: &mut impl fmt::Write, s: &str) -> fmt::Result {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    out.write_char(quote)?;
    for ch in s.chars() {
        match ch {
            '\\' => out.write_str("\\\\")?,
            '\n' => out.write_str("\\n")?,
            '\r' => out.write_str("\\r")?,
            '\t' => out.write_str("\\t")?,
            c if c == quote => {
                out.write_char('\\')?;
                out.write_char(c)?;
            }
            c if c.is_control() => write!(out, "\\x{:02x}", c as u32)?,
            c => out.write_char(c)?,
        }
    }
    out.write_char(quote)
}

/// Returns `true` if `s` written without quotes reads back as the same string.
fn reads_back_bare(s: &str) -> bool {
    matches!(coerce(s), Value::String(ref read) if read == s)
}

/// Writes a value nested inside a list literal.
fn write_literal(out: &mut impl fmt::Write, value: &Value) -> fmt::Result {
    match value {
        Value::Integer(i) => write!(out, "{}", i),
        Value::Float(f) => write_float(out, *f),
        Value::Bool(true) => out.write_str("True"),
        Value::Bool(false) => out.write_str("False"),
        Value::String(s) => write_quoted(out, s),
        Value::List(items) => write_list(out, items),
    }
}

fn write_list(out: &mut impl fmt::Write, items: &[Value]) -> fmt::Result {
    out.write_char('[')?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.write_str(", ")?;
        }
        write_literal(out, item)?;
    }
    out.write_char(']')
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(fl) => write_float(f, *fl),
            Value::Bool(b) => f.write_str(if *b { "T" } else { "F" }),
            Value::String(s) if reads_back_bare(s) => f.write_str(s),
            Value::String(s) => write_quoted(f, s),
            Value::List(items) => write_list(f, items),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::String(s) => serializer.serialize_str(s),
            Value::List(items) => {
                use serde::ser::SerializeSeq;
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an integer, float, boolean, string, or list")
            }

            fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E> {
                Ok(Value::Bool(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E> {
                Ok(Value::Integer(value))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                i64::try_from(value).map(Value::Integer).map_err(|_| {
                    E::invalid_value(
                        de::Unexpected::Unsigned(value),
                        &"an integer within i64 range",
                    )
                })
            }

            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E> {
                Ok(Value::Float(value))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E> {
                Ok(Value::String(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> Result<Self::Value, E> {
                Ok(Value::String(value))
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut items = Vec::new();
                while let Some(item) = seq.next_element()? {
                    items.push(item);
                }
                Ok(Value::List(items))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

/// The value or values recorded for one key in one block.
///
/// A key written once is [`Entry::Single`]; a key written two or more times in the
/// same block is [`Entry::Repeated`], in the order the lines appeared.
#[derive(Clone, Debug, PartialEq)]
pub enum Entry {
    Single(Value),
    Repeated(Vec<Value>),
}

impl Entry {
    /// Collapses collected values: one value becomes `Single`, anything else `Repeated`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use epoch_deck::{Entry, Value};
    ///
    /// assert_eq!(Entry::from_values(vec![Value::from(3)]), Entry::Single(Value::from(3)));
    /// ```
    #[must_use]
    pub fn from_values(mut values: Vec<Value>) -> Self {
        if values.len() == 1 {
            Entry::Single(values.remove(0))
        } else {
            Entry::Repeated(values)
        }
    }

    /// The recorded values in order; a single value is a one-element slice.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        match self {
            Entry::Single(value) => std::slice::from_ref(value),
            Entry::Repeated(values) => values,
        }
    }

    /// Returns the value if the key was written exactly once.
    #[must_use]
    pub fn as_single(&self) -> Option<&Value> {
        match self {
            Entry::Single(value) => Some(value),
            Entry::Repeated(_) => None,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values().is_empty()
    }

    #[must_use]
    pub const fn is_repeated(&self) -> bool {
        matches!(self, Entry::Repeated(_))
    }
}

impl Serialize for Entry {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Entry::Single(value) => value.serialize(serializer),
            Entry::Repeated(values) => {
                use serde::ser::SerializeSeq;
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
        }
    }
}

impl From<Value> for Entry {
    fn from(value: Value) -> Self {
        Entry::Single(value)
    }
}

// TryFrom implementations for extracting values from Value
impl TryFrom<Value> for i64 {
    type Error = Value;

    fn try_from(value: Value) -> Result<Self, Value> {
        match value {
            Value::Integer(i) => Ok(i),
            other => Err(other),
        }
    }
}

impl TryFrom<Value> for f64 {
    type Error = Value;

    fn try_from(value: Value) -> Result<Self, Value> {
        match value {
            Value::Integer(i) => Ok(i as f64),
            Value::Float(f) => Ok(f),
            other => Err(other),
        }
    }
}

impl TryFrom<Value> for bool {
    type Error = Value;

    fn try_from(value: Value) -> Result<Self, Value> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(other),
        }
    }
}

impl TryFrom<Value> for String {
    type Error = Value;

    fn try_from(value: Value) -> Result<Self, Value> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(other),
        }
    }
}

// From implementations for creating Value from primitives
impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value as i64)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Integer(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}
