use epoch_deck::{
    block, dump, dumps, load, loads, BlockGroup, BlockId, BlockMap, Deck, Entry, Error, Value,
};
use std::io::Cursor;

fn flat<'a>(deck: &'a Deck, name: &str) -> &'a BlockMap {
    deck.get(name)
        .and_then(BlockGroup::as_flat)
        .unwrap_or_else(|| panic!("no flat block '{}'", name))
}

fn basic_block() -> BlockMap {
    block! {
        "a" => 1,
        "b" => 2.3,
        "c" => "electron",
        "d" => "10 * femto",
        "e" => false,
        "f" => true,
    }
}

fn repeated_block_deck() -> Deck {
    let mut deck = Deck::new();
    deck.insert_named(
        "repeated_block",
        "first",
        block! { "name" => "first", "a" => 1, "b" => 2, "c" => 3 },
    );
    deck.insert_named(
        "repeated_block",
        "second",
        block! { "name" => "second", "a" => 4, "b" => 5, "c" => 6 },
    );
    deck.insert_flat("block", basic_block());
    deck
}

#[test]
fn test_read_basic_block() {
    let text = "
    begin:block
      a = 1
      b = 2.3
      c = electron
      d = 10 * femto
      e = F
      f = T
    end:block
    ";
    let (deck, order) = loads(text).unwrap();
    assert_eq!(flat(&deck, "block"), &basic_block());
    assert_eq!(order, vec![BlockId::flat("block")]);
}

#[test]
fn test_read_repeated_line() {
    let (deck, _) = loads("begin:block\n a = 1\n c = 3\n c = 4\nend:block\n").unwrap();
    assert_eq!(flat(&deck, "block"), &block! { "a" => 1, "c" => [3, 4] });
}

#[test]
fn test_read_list_literal_is_single_value() {
    let (deck, _) = loads("begin:block\n c = [3, 4]\nend:block\n").unwrap();
    assert_eq!(
        flat(&deck, "block").get("c"),
        Some(&Entry::Single(Value::List(vec![
            Value::Integer(3),
            Value::Integer(4)
        ])))
    );
}

#[test]
fn test_read_anonymous_repeated_block() {
    let text = "begin:block\n a = 1\nend:block\nbegin:block\n a = 4\nend:block\n";
    let (deck, order) = loads(text).unwrap();
    assert_eq!(
        deck.get("block"),
        Some(&BlockGroup::Indexed(vec![
            block! { "a" => 1 },
            block! { "a" => 4 }
        ]))
    );
    assert_eq!(order, vec![BlockId::indexed("block", 0), BlockId::indexed("block", 1)]);
    assert_eq!(order[1].to_string(), "block_1");
}

#[test]
fn test_read_named_repeated_block() {
    let text = "
    begin:species
      name = electron
      charge = -1.0
    end:species

    begin:species
      name = proton
      charge = 1.0
    end:species
    ";
    let (deck, order) = loads(text).unwrap();
    let species = deck.get("species").unwrap();
    assert_eq!(
        species.get_named("proton").and_then(|b| b.get_value("charge")),
        Some(&Value::Float(1.0))
    );
    let order: Vec<String> = order.iter().map(ToString::to_string).collect();
    assert_eq!(order, vec!["species:electron", "species:proton"]);
}

#[test]
fn test_read_include_species() {
    let text = "
    begin:dist_fn
      a = 1
      include_species: electron
      include_species:proton
    end:dist_fn
    ";
    let (deck, _) = loads(text).unwrap();
    assert_eq!(
        flat(&deck, "dist_fn"),
        &block! { "a" => 1, "include_species" => ["electron", "proton"] }
    );
}

#[test]
fn test_read_comments() {
    let text = "
    begin:block
      # This is a comment
      a = 1 # inline
      b = 2
    end:block
    ";
    let (deck, _) = loads(text).unwrap();
    let block = flat(&deck, "block");
    let keys: Vec<&str> = block.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["comment_0", "a", "a_inline_comment_0", "b"]);
    assert_eq!(
        block.get_value("comment_0"),
        Some(&Value::from("This is a comment"))
    );
    assert_eq!(block.inline_comment("a", 0), Some(&Value::from("inline")));
}

#[test]
fn test_read_block_name_mismatch() {
    let err = loads("begin:block\n a = 1\nend:other\n").unwrap_err();
    match &err {
        Error::Format {
            line,
            expected,
            found,
        } => {
            assert_eq!(*line, 3);
            assert_eq!(expected, "block");
            assert_eq!(found, "other");
        }
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(err.line(), Some(3));
}

#[test]
fn test_read_unclosed_continuation() {
    let err = loads("begin:block\n a = 1 \\").unwrap_err();
    assert!(matches!(err, Error::UnexpectedEof { .. }));
}

#[test]
fn test_read_continuation_joins_value() {
    let (deck, _) = loads("begin:block\n expr = 1 + \\\n 2\nend:block\n").unwrap();
    assert_eq!(
        flat(&deck, "block").get_value("expr"),
        Some(&Value::from("1 + 2"))
    );
}

#[test]
fn test_write_basic_block() {
    let mut deck = Deck::new();
    deck.insert_flat("block", basic_block());
    let expected = "\
begin:block
  a = 1
  b = 2.3
  c = electron
  d = 10 * femto
  e = F
  f = T
end:block

";
    assert_eq!(dumps(&deck, None).unwrap(), expected);
}

#[test]
fn test_write_inline_comment() {
    let mut block = block! { "a" => 1 };
    block.insert_inline_comment("a", 0, "This is a comment");
    block.insert_value("b", 2.3);
    let mut deck = Deck::new();
    deck.insert_flat("block", block);
    assert_eq!(
        dumps(&deck, None).unwrap(),
        "begin:block\n  a = 1 # This is a comment\n  b = 2.3\nend:block\n\n"
    );
}

#[test]
fn test_write_repeated_line_ordered_comments() {
    let mut block = BlockMap::new();
    block.insert_comment(0, "comment 0");
    block.insert_value("a", 1);
    block.insert_value("b", 2);
    block.insert_comment(1, "comment 1");
    block.insert(
        "c".to_string(),
        Entry::Repeated(vec![Value::from(3), Value::from(4)]),
    );
    block.insert_comment(2, "comment 2");
    let mut deck = Deck::new();
    deck.insert_flat("block", block);

    let expected = "\
begin:block
  # comment 0
  a = 1
  b = 2
  # comment 1
  c = 3
  c = 4
  # comment 2
end:block

";
    assert_eq!(dumps(&deck, None).unwrap(), expected);
}

#[test]
fn test_write_named_repeated_block() {
    let mut deck = repeated_block_deck();
    deck.insert_flat("block", BlockMap::new());
    let text = dumps(&deck, None).unwrap();
    assert!(text.starts_with(
        "begin:repeated_block\n  name = first\n  a = 1\n  b = 2\n  c = 3\nend:repeated_block\n\n\
         begin:repeated_block\n  name = second\n"
    ));
}

#[test]
fn test_write_identify() {
    let mut deck = Deck::new();
    deck.insert_flat(
        "dist_fn",
        block! { "a" => 1, "identify" => ["Electron", "Proton"] },
    );
    assert_eq!(
        dumps(&deck, None).unwrap(),
        "begin:dist_fn\n  a = 1\n  identify:Electron\n  identify:Proton\nend:dist_fn\n\n"
    );
}

#[test]
fn test_write_list_value() {
    let mut deck = Deck::new();
    deck.insert_flat(
        "block",
        block! { "v" => (vec![Value::from(1), Value::from("a b"), Value::from(true)]) },
    );
    assert_eq!(
        dumps(&deck, None).unwrap(),
        "begin:block\n  v = [1, 'a b', True]\nend:block\n\n"
    );
}

#[test]
fn test_write_then_read_back() {
    let deck = repeated_block_deck();
    let mut buffer = Vec::new();
    dump(&deck, &mut buffer, None).unwrap();

    let (data, order) = load(Cursor::new(buffer)).unwrap();
    assert_eq!(data, deck);
    assert_eq!(order, deck.block_ids());
}

#[test]
fn test_write_then_read_back_ordered() {
    let deck = repeated_block_deck();
    let block_order: Vec<BlockId> = ["repeated_block:first", "block", "repeated_block:second"]
        .iter()
        .map(|id| id.parse().unwrap())
        .collect();

    let mut buffer = Vec::new();
    dump(&deck, &mut buffer, Some(&block_order)).unwrap();

    let (data, loaded_order) = load(Cursor::new(buffer)).unwrap();
    assert_eq!(data, deck);
    assert_eq!(loaded_order, block_order);
}

#[test]
fn test_dump_is_idempotent() {
    let text = "
    begin:control
      # resolution
      nx = 0x10 # hex
      t_end = 1_000.5
      label = 'run' \"one\"
    end:control
    begin:laser
      amp = 1e10
    end:laser
    begin:laser
      amp = 2e10
    end:laser
    ";
    let (deck, order) = loads(text).unwrap();
    let first = dumps(&deck, Some(&order)).unwrap();
    let (again, again_order) = loads(&first).unwrap();
    assert_eq!(again, deck);
    assert_eq!(again_order, order);
    assert_eq!(dumps(&again, Some(&again_order)).unwrap(), first);

    let control = flat(&deck, "control");
    assert_eq!(control.get_value("nx"), Some(&Value::Integer(16)));
    assert_eq!(control.get_value("label"), Some(&Value::from("runone")));
}

#[test]
fn test_unresolved_block_order() {
    let deck = repeated_block_deck();
    let order = [BlockId::named("repeated_block", "third")];
    assert!(matches!(
        dumps(&deck, Some(&order)),
        Err(Error::UnresolvedBlock(ref id)) if id == "repeated_block:third"
    ));
}

#[test]
fn test_json_export() {
    let (deck, _) = loads(
        "begin:control\n nx = 4\n dump = T\nend:control\n\
         begin:species\n name = ion\n charge = 1.5\nend:species\n",
    )
    .unwrap();
    let json = serde_json::to_value(&deck).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "control": { "nx": 4, "dump": true },
            "species": { "ion": { "name": "ion", "charge": 1.5 } }
        })
    );
}

#[test]
fn test_literal_looking_strings_survive_reload() {
    let text = "begin:output\n  label = '42'\n  tag = ' padded'\n  flag = 'True'\nend:output\n";
    let (deck, order) = loads(text).unwrap();
    let output = flat(&deck, "output");
    assert_eq!(output.get_value("label"), Some(&Value::from("42")));
    assert_eq!(output.get_value("tag"), Some(&Value::from(" padded")));
    assert_eq!(output.get_value("flag"), Some(&Value::from("True")));

    let written = dumps(&deck, Some(&order)).unwrap();
    assert_eq!(
        written,
        "begin:output\n  label = '42'\n  tag = ' padded'\n  flag = 'True'\nend:output\n\n"
    );
    let (again, _) = loads(&written).unwrap();
    assert_eq!(again, deck);
}

#[test]
fn test_read_identify_with_uppercase_markers() {
    let text = "
    IMPORT:foo.deck
    BEGIN:subset
      identify: x
      identify:y
    END:subset
    ";
    let (deck, order) = loads(text).unwrap();
    assert_eq!(order, vec![BlockId::flat("subset")]);
    assert_eq!(deck.len(), 1);
    assert_eq!(
        flat(&deck, "subset").get("identify"),
        Some(&Entry::Repeated(vec![Value::from("x"), Value::from("y")]))
    );
}
