//! # epoch_deck
//!
//! Reader and writer for EPOCH-style simulation input decks.
//!
//! ## What is an input deck?
//!
//! A deck is a line-oriented file of named blocks:
//!
//! ```text
//! begin:control
//!   # grid
//!   nx = 400          # cells in x
//!   t_end = 1.5e-12
//!   stdout_frequency = 10
//! end:control
//!
//! begin:species
//!   name = electron
//!   charge = -1.0
//!   dump = T
//! end:species
//!
//! begin:dist_fn
//!   include_species: electron
//!   include_species: proton
//! end:dist_fn
//! ```
//!
//! ## Key Features
//!
//! - **Typed values**: integers, floats, quoted strings, booleans (`T`/`F`) and bracketed
//!   lists are recognized; everything else stays a string
//! - **Round trip**: comments, repeated keys, repeated blocks and the source block
//!   order survive `loads` followed by `dumps`
//! - **Named and repeated blocks**: blocks carrying a `name` key are grouped by name,
//!   repeated anonymous blocks by occurrence
//! - **Patching**: [`deep_update`] merges patches without discarding untouched entries
//!
//! ## Quick Start
//!
//! ```rust
//! use epoch_deck::{dumps, loads, Value};
//!
//! let text = "begin:control\n  nx = 400\n  dump = F # no output\nend:control\n\n";
//! let (deck, order) = loads(text).unwrap();
//!
//! let control = deck.get("control").and_then(|g| g.as_flat()).unwrap();
//! assert_eq!(control.get_value("nx"), Some(&Value::Integer(400)));
//! assert_eq!(control.get_value("dump"), Some(&Value::Bool(false)));
//!
//! assert_eq!(dumps(&deck, Some(&order)).unwrap(), text);
//! ```
//!
//! ## Format Notes
//!
//! - `begin:`, `end:` and `import:` markers are case-insensitive; block names are not
//! - `#` starts a comment anywhere on a line, including inside quotes
//! - A backslash joins a line with the next one
//! - `include_species` and `identify` are written `key:value`
//! - `import:` directives are skipped, not expanded

#[macro_use]
pub mod macros;

pub mod de;
pub mod deck;
pub mod error;
pub mod lines;
pub mod literal;
pub mod map;
pub mod merge;
pub mod options;
pub mod ser;
pub mod value;

pub use de::DeckReader;
pub use deck::{BlockGroup, BlockId, Deck, NAME_KEY};
pub use error::{Error, Result};
pub use lines::strip_comment;
pub use literal::coerce;
pub use map::BlockMap;
pub use merge::deep_update;
pub use options::DeckOptions;
pub use ser::DeckWriter;
pub use value::{Entry, Value};

use std::io;

/// Reads a deck and its block order from any reader.
///
/// # Errors
///
/// Returns an error if reading fails or the text is not a well-formed deck.
/// No partial deck is returned.
pub fn load<R>(reader: R) -> Result<(Deck, Vec<BlockId>)>
where
    R: io::Read,
{
    load_with_options(reader, &DeckOptions::default())
}

/// Reads a deck and its block order from any reader with custom options.
///
/// # Errors
///
/// Returns an error if reading fails or the text is not a well-formed deck.
pub fn load_with_options<R>(reader: R, options: &DeckOptions) -> Result<(Deck, Vec<BlockId>)>
where
    R: io::Read,
{
    DeckReader::new(io::BufReader::new(reader), options).read_deck()
}

/// Reads a deck and its block order from a string.
///
/// # Examples
///
/// ```rust
/// use epoch_deck::{loads, BlockId};
///
/// let (deck, order) = loads("begin:boundaries\n  bc_x_min = periodic\nend:boundaries\n").unwrap();
/// assert!(deck.contains_key("boundaries"));
/// assert_eq!(order, vec![BlockId::flat("boundaries")]);
/// ```
///
/// # Errors
///
/// Returns an error if the text is not a well-formed deck.
pub fn loads(text: &str) -> Result<(Deck, Vec<BlockId>)> {
    loads_with_options(text, &DeckOptions::default())
}

/// Reads a deck and its block order from a string with custom options.
///
/// # Errors
///
/// Returns an error if the text is not a well-formed deck.
pub fn loads_with_options(text: &str, options: &DeckOptions) -> Result<(Deck, Vec<BlockId>)> {
    DeckReader::new(text.as_bytes(), options).read_deck()
}

/// Writes a deck to any writer.
///
/// Blocks are written in `block_order`; pass the order returned by [`load`] to
/// reproduce the source arrangement. Without an order the deck's own block
/// names are used, writing every member of named and indexed groups together.
///
/// # Errors
///
/// Returns an error if an id in `block_order` is not in the deck or writing fails.
pub fn dump<W>(deck: &Deck, writer: W, block_order: Option<&[BlockId]>) -> Result<()>
where
    W: io::Write,
{
    dump_with_options(deck, writer, block_order, &DeckOptions::default())
}

/// Writes a deck to any writer with custom options.
///
/// # Errors
///
/// Returns an error if an id in `block_order` is not in the deck or writing fails.
pub fn dump_with_options<W>(
    deck: &Deck,
    mut writer: W,
    block_order: Option<&[BlockId]>,
    options: &DeckOptions,
) -> Result<()>
where
    W: io::Write,
{
    let text = dumps_with_options(deck, block_order, options)?;
    writer
        .write_all(text.as_bytes())
        .map_err(|e| Error::io(&e.to_string()))?;
    Ok(())
}

/// Writes a deck to a string.
///
/// # Examples
///
/// ```rust
/// use epoch_deck::{block, dumps, Deck};
///
/// let mut deck = Deck::new();
/// deck.insert_flat("dist_fn", block! { "include_species" => ["Electron", "Proton"] });
/// assert_eq!(
///     dumps(&deck, None).unwrap(),
///     "begin:dist_fn\n  include_species:Electron\n  include_species:Proton\nend:dist_fn\n\n"
/// );
/// ```
///
/// # Errors
///
/// Returns an error if an id in `block_order` is not in the deck.
pub fn dumps(deck: &Deck, block_order: Option<&[BlockId]>) -> Result<String> {
    dumps_with_options(deck, block_order, &DeckOptions::default())
}

/// Writes a deck to a string with custom options.
///
/// # Errors
///
/// Returns an error if an id in `block_order` is not in the deck.
pub fn dumps_with_options(
    deck: &Deck,
    block_order: Option<&[BlockId]>,
    options: &DeckOptions,
) -> Result<String> {
    let mut writer = DeckWriter::new(options);
    writer.write_deck(deck, block_order)?;
    Ok(writer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DECK: &str = "\
begin:control
  # grid
  nx = 400 # cells
  t_end = 1.5e-12
end:control

begin:species
  name = electron
  charge = -1.0
end:species

begin:laser
  amp = 1
end:laser

begin:species
  name = proton
  charge = 1.0
end:species

begin:laser
  amp = 2
end:laser

";

    #[test]
    fn test_loads_dumps_roundtrip() {
        let (deck, order) = loads(DECK).unwrap();
        assert_eq!(
            order,
            vec![
                BlockId::flat("control"),
                BlockId::named("species", "electron"),
                BlockId::indexed("laser", 0),
                BlockId::named("species", "proton"),
                BlockId::indexed("laser", 1),
            ]
        );
        assert_eq!(dumps(&deck, Some(&order)).unwrap(), DECK);
    }

    #[test]
    fn test_load_from_reader() {
        let (deck, order) = load(io::Cursor::new(DECK.as_bytes())).unwrap();
        assert_eq!((deck, order), loads(DECK).unwrap());
    }

    #[test]
    fn test_dump_to_writer() {
        let (deck, order) = loads(DECK).unwrap();
        let mut buffer = Vec::new();
        dump(&deck, &mut buffer, Some(&order)).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), DECK);
    }

    #[test]
    fn test_custom_special_keyword() {
        let options = DeckOptions::new().with_special_keyword("use_species");
        let text = "begin:output\n  use_species:ion\nend:output\n\n";
        let (deck, order) = loads_with_options(text, &options).unwrap();
        assert_eq!(dumps_with_options(&deck, Some(&order), &options).unwrap(), text);
        assert!(loads(text).is_err());
    }
}
