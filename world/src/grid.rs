//! Dense occupancy grid that owns the cell-to-item mapping.

use std::collections::BTreeMap;

use hotpot_core::{CellCoord, FoodId, OccupancyView, PotConfig, SimError};

/// Read-only description of a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    /// Coordinate of the cell.
    pub coord: CellCoord,
    /// Doneness multiplier applied to items resting in the cell.
    pub cook_speed: f32,
    /// Item occupying the cell, if any.
    pub occupant: Option<FoodId>,
}

/// Fixed-size grid mapping cells to at most one food item each.
///
/// The grid keeps a reverse index from item to cell so that every placed item
/// can be located without scanning, and both directions always agree.
#[derive(Clone, Debug)]
pub struct Grid {
    columns: u32,
    rows: u32,
    cells: Vec<Option<FoodId>>,
    cook_speeds: Vec<f32>,
    positions: BTreeMap<FoodId, CellCoord>,
}

impl Grid {
    /// Builds an empty grid from the dimensions and cook speeds in `config`.
    pub fn from_config(config: &PotConfig) -> Result<Self, SimError> {
        config.validate()?;

        let capacity_u64 = u64::from(config.columns) * u64::from(config.rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        let mut grid = Self {
            columns: config.columns,
            rows: config.rows,
            cells: vec![None; capacity],
            cook_speeds: vec![config.default_cook_speed; capacity],
            positions: BTreeMap::new(),
        };

        for entry in &config.cook_speed_overrides {
            let index = grid.checked_index(entry.cell)?;
            grid.cook_speeds[index] = entry.speed;
        }

        Ok(grid)
    }

    /// Number of columns and rows in the grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Reports whether the coordinate addresses a cell of this grid.
    #[must_use]
    pub fn is_in_bounds(&self, cell: CellCoord) -> bool {
        self.index(cell).is_some()
    }

    /// Reports whether the cell holds no item.
    pub fn is_empty(&self, cell: CellCoord) -> Result<bool, SimError> {
        Ok(self.occupant(cell)?.is_none())
    }

    /// Returns the item occupying the cell, if any.
    pub fn occupant(&self, cell: CellCoord) -> Result<Option<FoodId>, SimError> {
        let index = self.checked_index(cell)?;
        Ok(self.cells[index])
    }

    /// Doneness multiplier of the cell.
    pub fn cook_speed(&self, cell: CellCoord) -> Result<f32, SimError> {
        let index = self.checked_index(cell)?;
        Ok(self.cook_speeds[index])
    }

    /// Captures a read-only description of the cell.
    pub fn cell(&self, cell: CellCoord) -> Result<Cell, SimError> {
        let index = self.checked_index(cell)?;
        Ok(Cell {
            coord: cell,
            cook_speed: self.cook_speeds[index],
            occupant: self.cells[index],
        })
    }

    /// Cell currently bound to the item, if it is placed in the grid.
    #[must_use]
    pub fn position_of(&self, food: FoodId) -> Option<CellCoord> {
        self.positions.get(&food).copied()
    }

    /// Spawn-row cell of the provided column.
    pub fn spawn_cell(&self, column: u32) -> Result<CellCoord, SimError> {
        let cell = CellCoord::new(column, self.rows.saturating_sub(1));
        let _ = self.checked_index(cell)?;
        Ok(cell)
    }

    /// Binds `food` to `cell`, releasing whichever cell the item held before.
    ///
    /// Placing an item into the cell it already occupies is a no-op.
    pub fn place(&mut self, cell: CellCoord, food: FoodId) -> Result<(), SimError> {
        let index = self.checked_index(cell)?;
        match self.cells[index] {
            Some(occupant) if occupant == food => return Ok(()),
            Some(occupant) => return Err(SimError::Occupied { cell, occupant }),
            None => {}
        }

        if let Some(previous) = self.positions.insert(food, cell) {
            if let Some(previous_index) = self.index(previous) {
                self.cells[previous_index] = None;
            }
        }
        self.cells[index] = Some(food);
        Ok(())
    }

    /// Clears the cell, returning the item that occupied it.
    pub fn remove(&mut self, cell: CellCoord) -> Result<Option<FoodId>, SimError> {
        let index = self.checked_index(cell)?;
        let occupant = self.cells[index].take();
        if let Some(food) = occupant {
            let _ = self.positions.remove(&food);
        }
        Ok(occupant)
    }

    /// In-bounds orthogonal neighbours ordered up, down, left, right.
    ///
    /// The order is part of the contract: match detection picks the first
    /// compatible neighbour it encounters.
    pub fn neighbors4(&self, cell: CellCoord) -> Result<Vec<CellCoord>, SimError> {
        let _ = self.checked_index(cell)?;
        let column = cell.column();
        let row = cell.row();
        let candidates = [
            row.checked_add(1).map(|up| CellCoord::new(column, up)),
            row.checked_sub(1).map(|down| CellCoord::new(column, down)),
            column.checked_sub(1).map(|left| CellCoord::new(left, row)),
            column.checked_add(1).map(|right| CellCoord::new(right, row)),
        ];
        Ok(candidates
            .into_iter()
            .flatten()
            .filter(|candidate| self.is_in_bounds(*candidate))
            .collect())
    }

    /// Placed items paired with their cells, in identifier order.
    pub fn placements(&self) -> impl Iterator<Item = (FoodId, CellCoord)> + '_ {
        self.positions.iter().map(|(food, cell)| (*food, *cell))
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.positions.len()
    }

    /// Verifies that the forward and reverse mappings agree.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let forward = self.cells.iter().flatten().count();
        if forward != self.positions.len() {
            return false;
        }
        self.positions
            .iter()
            .all(|(food, cell)| self.index(*cell).is_some_and(|index| self.cells[index] == Some(*food)))
    }

    /// Exposes a read-only view over the occupancy cells.
    #[must_use]
    pub fn occupancy_view(&self) -> OccupancyView<'_> {
        OccupancyView::new(&self.cells, self.columns, self.rows)
    }

    fn checked_index(&self, cell: CellCoord) -> Result<usize, SimError> {
        self.index(cell).ok_or(SimError::OutOfBounds {
            cell,
            columns: self.columns,
            rows: self.rows,
        })
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

#[cfg(test)]
mod tests {
    use super::*;
    use hotpot_core::CookSpeedOverride;

    fn grid(columns: u32, rows: u32) -> Grid {
        Grid::from_config(&PotConfig::default().with_dimensions(columns, rows)).expect("grid")
    }

    #[test]
    fn place_rejects_occupied_cells() {
        let mut grid = grid(3, 3);
        let cell = CellCoord::new(1, 1);
        grid.place(cell, FoodId::new(0)).expect("first placement");

        assert_eq!(
            grid.place(cell, FoodId::new(1)),
            Err(SimError::Occupied {
                cell,
                occupant: FoodId::new(0)
            })
        );
        assert_eq!(grid.place(cell, FoodId::new(0)), Ok(()));
        assert!(grid.is_consistent());
    }

    #[test]
    fn place_releases_previous_cell() {
        let mut grid = grid(3, 3);
        let food = FoodId::new(4);
        grid.place(CellCoord::new(0, 2), food).expect("spawn");
        grid.place(CellCoord::new(0, 1), food).expect("move");

        assert_eq!(grid.is_empty(CellCoord::new(0, 2)), Ok(true));
        assert_eq!(grid.position_of(food), Some(CellCoord::new(0, 1)));
        assert_eq!(grid.occupied_count(), 1);
        assert!(grid.is_consistent());
    }

    #[test]
    fn remove_is_a_no_op_on_empty_cells() {
        let mut grid = grid(2, 2);
        assert_eq!(grid.remove(CellCoord::new(1, 1)), Ok(None));

        grid.place(CellCoord::new(1, 1), FoodId::new(2)).expect("place");
        assert_eq!(grid.remove(CellCoord::new(1, 1)), Ok(Some(FoodId::new(2))));
        assert_eq!(grid.position_of(FoodId::new(2)), None);
        assert!(grid.is_consistent());
    }

    #[test]
    fn coordinates_outside_the_grid_are_errors() {
        let mut grid = grid(2, 3);
        let outside = CellCoord::new(2, 0);
        let expected = Err(SimError::OutOfBounds {
            cell: outside,
            columns: 2,
            rows: 3,
        });

        assert!(!grid.is_in_bounds(outside));
        assert_eq!(grid.is_empty(outside), expected.clone().map(|()| false));
        assert_eq!(grid.place(outside, FoodId::new(0)), expected);
        assert!(grid.neighbors4(outside).is_err());
        assert!(grid.spawn_cell(2).is_err());
    }

    #[test]
    fn neighbours_follow_up_down_left_right_order() {
        let grid = grid(3, 3);
        assert_eq!(
            grid.neighbors4(CellCoord::new(1, 1)).expect("center"),
            vec![
                CellCoord::new(1, 2),
                CellCoord::new(1, 0),
                CellCoord::new(0, 1),
                CellCoord::new(2, 1),
            ]
        );
        assert_eq!(
            grid.neighbors4(CellCoord::new(0, 0)).expect("corner"),
            vec![CellCoord::new(0, 1), CellCoord::new(1, 0)]
        );
    }

    #[test]
    fn spawn_cell_lies_on_the_top_row() {
        let grid = grid(4, 6);
        assert_eq!(grid.spawn_cell(3), Ok(CellCoord::new(3, 5)));
    }

    #[test]
    fn cook_speed_overrides_apply_to_single_cells() {
        let mut config = PotConfig::default().with_dimensions(2, 2);
        config.cook_speed_overrides.push(CookSpeedOverride {
            cell: CellCoord::new(1, 0),
            speed: 3.0,
        });
        let grid = Grid::from_config(&config).expect("grid");

        assert_eq!(grid.cook_speed(CellCoord::new(1, 0)), Ok(3.0));
        assert_eq!(grid.cook_speed(CellCoord::new(0, 0)), Ok(1.0));
        let cell = grid.cell(CellCoord::new(1, 0)).expect("cell");
        assert_eq!(cell.occupant, None);
        assert_eq!(cell.cook_speed, 3.0);
    }
}
