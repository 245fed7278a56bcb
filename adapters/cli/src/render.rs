use std::fmt::Write as _;

use hotpot_core::{CellCoord, Lifecycle};
use hotpot_world::{query, World};

const EMPTY_CELL: char = '.';
const MATCHED_CELL: char = '#';

/// Draws the pot as text with the top row first.
///
/// Settled items are shown by the upper-case initial of their name, falling
/// items by the lower-case initial and matches by `#`.
pub(crate) fn render_pot(world: &World) -> String {
    let (columns, rows) = query::dimensions(world);
    let grid = query::grid(world);
    let catalog = query::catalog(world);

    let mut output = String::new();
    for row in (0..rows).rev() {
        for column in 0..columns {
            let glyph = grid
                .occupant(CellCoord::new(column, row))
                .ok()
                .flatten()
                .and_then(|food| query::food(world, food))
                .map_or(EMPTY_CELL, |snapshot| {
                    let initial = catalog
                        .item(snapshot.kind)
                        .and_then(|definition| definition.name.chars().next())
                        .unwrap_or('?');
                    match snapshot.lifecycle {
                        Lifecycle::Matched => MATCHED_CELL,
                        Lifecycle::Settled => initial.to_ascii_uppercase(),
                        Lifecycle::Falling | Lifecycle::Removed => initial.to_ascii_lowercase(),
                    }
                });
            output.push(glyph);
        }
        output.push('\n');
    }
    let _ = writeln!(output, "score: {}", query::score(world));
    output
}
