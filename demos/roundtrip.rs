//! Reading, patching and writing an input deck.
//!
//! Run with: cargo run --example roundtrip

use epoch_deck::{block, deep_update, dumps, loads, BlockId, Deck};
use std::error::Error;

const INPUT: &str = "\
begin:control
  # grid
  nx = 400          # cells in x
  t_end = 1.5e-12
end:control

begin:species
  name = electron
  charge = -1.0
  density = 1e24 * exp(-x^2)
end:species

begin:species
  name = proton
  charge = 1.0
end:species

begin:dist_fn
  include_species: electron
  include_species: proton
end:dist_fn
";

fn main() -> Result<(), Box<dyn Error>> {
    let (deck, order) = loads(INPUT)?;

    println!("Blocks in file order:");
    for id in &order {
        println!("  {}", id);
    }
    println!();

    // Structured view
    println!("As JSON:");
    println!("{}\n", serde_json::to_string_pretty(&deck)?);

    // Double the resolution and raise the proton charge
    let mut patch = Deck::new();
    patch.insert_flat("control", block! { "nx" => 800 });
    patch.insert_named("species", "proton", block! { "charge" => 2.0 });
    let patched = deep_update(&deck, [&patch]);

    println!("Patched deck:");
    print!("{}", dumps(&patched, Some(&order))?);

    // Custom order: species first
    let species_first: Vec<BlockId> = ["species", "control", "dist_fn"]
        .iter()
        .map(|id| id.parse())
        .collect::<Result<_, _>>()?;
    println!("Species first:");
    print!("{}", dumps(&patched, Some(&species_first))?);

    Ok(())
}
