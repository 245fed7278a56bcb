#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Hotpot cooking-pot simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! that presentation layers mirror. Immutable data such as the
//! [`ItemCatalog`] and the [`SpawnTable`] is loaded once before the
//! simulation starts and never changes for the lifetime of a session.

mod catalog;
mod config;

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use catalog::{ItemCatalog, ItemDefinition, MatchRule, SpawnTable, SpawnWeight};
pub use config::{CookSpeedOverride, PotConfig};

/// Upper bound of the doneness accumulator.
pub const MAX_DONENESS: f32 = 100.0;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Requests that a new food item of `kind` enters the top row at `column`.
    SpawnFood {
        /// Column of the spawn row that should receive the item.
        column: u32,
        /// Catalog kind assigned to the spawned item.
        kind: KindId,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Reports that the player interacted with the provided cell.
    ActivateCell {
        /// Cell resolved by the external hit-testing layer.
        cell: CellCoord,
    },
    /// Enables or disables automatic spawning.
    SetSpawning {
        /// Whether spawn requests should be issued.
        enabled: bool,
    },
    /// Resets the score ledger to zero.
    ResetScore,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a food item entered the pot.
    FoodSpawned {
        /// Identifier allocated to the new item.
        food: FoodId,
        /// Catalog kind of the item.
        kind: KindId,
        /// Spawn-row cell the item occupies.
        cell: CellCoord,
        /// Appearance the renderer should display.
        appearance: AppearanceId,
    },
    /// Reports that a spawn request was dropped because the spawn cell was taken.
    SpawnRejected {
        /// Spawn-row cell that was requested.
        cell: CellCoord,
        /// Item currently blocking the cell.
        occupant: FoodId,
    },
    /// Signals that spawns failed for the configured number of consecutive attempts.
    PotFull {
        /// Length of the rejection streak that triggered the signal.
        consecutive_rejections: u32,
    },
    /// Announces that automatic spawning was toggled.
    SpawningChanged {
        /// Whether spawning is active after the change.
        enabled: bool,
    },
    /// Confirms that a falling item descended a single row.
    FoodFell {
        /// Identifier of the item that moved.
        food: FoodId,
        /// Cell occupied before the step.
        from: CellCoord,
        /// Cell occupied after the step.
        to: CellCoord,
    },
    /// Reports that a falling item came to rest.
    FoodSettled {
        /// Identifier of the item that settled.
        food: FoodId,
        /// Cell where the item rests.
        cell: CellCoord,
    },
    /// Confirms that two adjacent items were combined into a match.
    MatchFormed {
        /// Item that stays addressable in the grid.
        primary: FoodId,
        /// Item that left the grid and awaits removal with the primary.
        partner: FoodId,
        /// Cell occupied by the match.
        cell: CellCoord,
        /// Appearance assigned to the match.
        appearance: AppearanceId,
    },
    /// Confirms that a single item was harvested.
    FoodHarvested {
        /// Identifier of the harvested item.
        food: FoodId,
        /// Cell the item occupied.
        cell: CellCoord,
        /// Score awarded for the harvest.
        score: i64,
    },
    /// Confirms that a match was harvested, removing both participants.
    MatchHarvested {
        /// Item that occupied the grid.
        primary: FoodId,
        /// Partner removed alongside the primary.
        partner: FoodId,
        /// Cell the match occupied.
        cell: CellCoord,
        /// Score awarded by the match rule.
        score: i64,
    },
    /// Reports the ledger total after every update.
    ScoreChanged {
        /// Running total after the update.
        total: i64,
        /// Amount applied by the update.
        delta: i64,
    },
}

/// Errors reported by the simulation core.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SimError {
    /// A coordinate fell outside the configured grid.
    #[error("cell {cell} lies outside the {columns}x{rows} grid")]
    OutOfBounds {
        /// Offending coordinate.
        cell: CellCoord,
        /// Number of columns in the grid.
        columns: u32,
        /// Number of rows in the grid.
        rows: u32,
    },
    /// A placement targeted a cell that already holds an item.
    #[error("cell {cell} is already occupied by {occupant}")]
    Occupied {
        /// Cell targeted by the placement.
        cell: CellCoord,
        /// Item currently holding the cell.
        occupant: FoodId,
    },
    /// A match was requested between items that are not orthogonal neighbours.
    #[error("{first} and {second} are not adjacent")]
    NotAdjacent {
        /// First item of the requested match.
        first: FoodId,
        /// Second item of the requested match.
        second: FoodId,
    },
    /// The catalog holds no rule combining the two kinds.
    #[error("no match rule combines {first} and {second}")]
    NoMatchRule {
        /// Kind of the first item.
        first: KindId,
        /// Kind of the second item.
        second: KindId,
    },
    /// The catalog cannot allocate another kind identifier.
    #[error("item catalog cannot hold more kinds")]
    CatalogFull,
    /// Spawning was attempted without any weighted kinds.
    #[error("spawn table has no weighted kinds")]
    EmptyCatalog,
    /// The grid was configured with a zero dimension.
    #[error("grid dimensions {columns}x{rows} must both be non-zero")]
    InvalidDimensions {
        /// Requested number of columns.
        columns: u32,
        /// Requested number of rows.
        rows: u32,
    },
    /// A kind was referenced that the catalog does not define.
    #[error("{0} is not defined in the item catalog")]
    UnknownKind(KindId),
}

/// Lifecycle stage of a food item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lifecycle {
    /// Descending one row per fall interval.
    Falling,
    /// Resting in place and cooking.
    Settled,
    /// Combined with a partner; immobile and no longer cooking.
    Matched,
    /// Harvested and dropped from the world.
    Removed,
}

/// Unique identifier assigned to a food item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FoodId(u32);

impl FoodId {
    /// Creates a new food identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for FoodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "food #{}", self.0)
    }
}

/// Identifier of an item kind within the [`ItemCatalog`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KindId(u32);

impl KindId {
    /// Creates a new kind identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for KindId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "kind #{}", self.0)
    }
}

/// Opaque display identifier forwarded to the rendering collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AppearanceId(u32);

impl AppearanceId {
    /// Creates a new appearance identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
///
/// Row zero is the floor of the pot; rows grow upwards towards the spawn row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell, counted from the floor.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Cell directly beneath this one, or `None` on the floor row.
    #[must_use]
    pub const fn below(self) -> Option<CellCoord> {
        match self.row.checked_sub(1) {
            Some(row) => Some(CellCoord::new(self.column, row)),
            None => None,
        }
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Reports whether the two cells share an edge.
    #[must_use]
    pub fn is_adjacent(self, other: CellCoord) -> bool {
        self.manhattan_distance(other) == 1
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Immutable representation of a single food item used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct FoodSnapshot {
    /// Unique identifier assigned to the item.
    pub id: FoodId,
    /// Catalog kind of the item.
    pub kind: KindId,
    /// Appearance currently displayed for the item.
    pub appearance: AppearanceId,
    /// Grid cell occupied by the item. Inert match partners report `None`.
    pub cell: Option<CellCoord>,
    /// Lifecycle stage of the item.
    pub lifecycle: Lifecycle,
    /// Cook progress in the range `0.0..=100.0`.
    pub doneness: f32,
    /// Time accumulated toward the next fall step.
    pub fall_timer: Duration,
    /// Match partner, present only for matched items.
    pub partner: Option<FoodId>,
}

/// Read-only snapshot describing all food items in the pot.
#[derive(Clone, Debug, Default)]
pub struct FoodView {
    snapshots: Vec<FoodSnapshot>,
}

impl FoodView {
    /// Creates a new food view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<FoodSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &FoodSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot captured for the provided item.
    #[must_use]
    pub fn get(&self, food: FoodId) -> Option<&FoodSnapshot> {
        self.snapshots
            .binary_search_by_key(&food, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of items captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<FoodSnapshot> {
        self.snapshots
    }
}

/// Read-only view into the dense occupancy grid.
#[derive(Clone, Copy, Debug)]
pub struct OccupancyView<'a> {
    cells: &'a [Option<FoodId>],
    columns: u32,
    rows: u32,
}

impl<'a> OccupancyView<'a> {
    /// Captures a new occupancy view backed by the provided row-major cell slice.
    #[must_use]
    pub fn new(cells: &'a [Option<FoodId>], columns: u32, rows: u32) -> Self {
        Self {
            cells,
            columns,
            rows,
        }
    }

    /// Returns the item occupying the provided cell, if any.
    #[must_use]
    pub fn occupant(&self, cell: CellCoord) -> Option<FoodId> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    /// Reports whether the cell lies within the grid and holds no item.
    #[must_use]
    pub fn is_free(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .is_some_and(|index| self.cells.get(index).copied().flatten().is_none())
    }

    /// Returns an iterator over all cells in row-major order starting at the floor.
    pub fn iter(&self) -> impl Iterator<Item = Option<FoodId>> + 'a {
        self.cells.iter().copied()
    }

    /// Provides the dimensions of the underlying occupancy grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}
