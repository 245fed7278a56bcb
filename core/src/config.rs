//! Construction-time parameters of the pot.

use std::{num::NonZeroU32, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{CellCoord, SimError};

const DEFAULT_COLUMNS: u32 = 8;
const DEFAULT_ROWS: u32 = 10;
const DEFAULT_CELL_LENGTH: f32 = 1.0;
const DEFAULT_SPAWN_INTERVAL: Duration = Duration::from_secs(2);
const DEFAULT_FALL_INTERVAL: Duration = Duration::from_secs(1);
const DEFAULT_DONENESS_RATE: f32 = 10.0;
const DEFAULT_COOK_SPEED: f32 = 1.0;
const DEFAULT_FULL_AFTER_REJECTIONS: Option<NonZeroU32> = NonZeroU32::new(3);

/// Cook speed assigned to a single cell, overriding the uniform default.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CookSpeedOverride {
    /// Cell receiving the override.
    pub cell: CellCoord,
    /// Doneness multiplier applied to items resting in the cell.
    pub speed: f32,
}

/// Parameters recognised when constructing the world and the session.
///
/// Missing fields deserialize to their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PotConfig {
    /// Number of columns in the grid.
    pub columns: u32,
    /// Number of rows in the grid. The top row is the spawn row.
    pub rows: u32,
    /// Edge length of a cell in renderer units. Unused by the simulation.
    pub cell_length: f32,
    /// Simulated time between spawn attempts. Zero disables spawning.
    pub spawn_interval: Duration,
    /// Simulated time a falling item waits before each fall step.
    pub fall_interval: Duration,
    /// Doneness gained per simulated second at cook speed `1.0`.
    pub doneness_rate: f32,
    /// Cook speed of every cell without an override.
    pub default_cook_speed: f32,
    /// Per-cell cook speed overrides.
    pub cook_speed_overrides: Vec<CookSpeedOverride>,
    /// Consecutive rejected spawns that signal a full pot. `None` never signals.
    pub full_after_rejections: Option<NonZeroU32>,
}

impl Default for PotConfig {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
            rows: DEFAULT_ROWS,
            cell_length: DEFAULT_CELL_LENGTH,
            spawn_interval: DEFAULT_SPAWN_INTERVAL,
            fall_interval: DEFAULT_FALL_INTERVAL,
            doneness_rate: DEFAULT_DONENESS_RATE,
            default_cook_speed: DEFAULT_COOK_SPEED,
            cook_speed_overrides: Vec::new(),
            full_after_rejections: DEFAULT_FULL_AFTER_REJECTIONS,
        }
    }
}

impl PotConfig {
    /// Returns the configuration with the provided grid dimensions.
    #[must_use]
    pub fn with_dimensions(mut self, columns: u32, rows: u32) -> Self {
        self.columns = columns;
        self.rows = rows;
        self
    }

    /// Returns the configuration with the provided fall interval.
    #[must_use]
    pub fn with_fall_interval(mut self, fall_interval: Duration) -> Self {
        self.fall_interval = fall_interval;
        self
    }

    /// Returns the configuration with the provided spawn interval.
    #[must_use]
    pub fn with_spawn_interval(mut self, spawn_interval: Duration) -> Self {
        self.spawn_interval = spawn_interval;
        self
    }

    /// Checks that the dimensions are usable and every override lies on the grid.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.columns == 0 || self.rows == 0 {
            return Err(SimError::InvalidDimensions {
                columns: self.columns,
                rows: self.rows,
            });
        }

        for entry in &self.cook_speed_overrides {
            if entry.cell.column() >= self.columns || entry.cell.row() >= self.rows {
                return Err(SimError::OutOfBounds {
                    cell: entry.cell,
                    columns: self.columns,
                    rows: self.rows,
                });
            }
        }

        Ok(())
    }
}
