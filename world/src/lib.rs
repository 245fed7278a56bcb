#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative pot state management for Hotpot.

mod falling;
mod food;
mod grid;
mod matching;
mod score;

use std::time::Duration;

use hotpot_core::{
    CellCoord, Command, Event, FoodId, ItemCatalog, KindId, Lifecycle, PotConfig, SimError,
};
use tracing::{debug, warn};

pub use falling::FallScheduler;
pub use grid::{Cell, Grid};
pub use matching::{check_adjacent_match, create_match, harvest_match, harvest_single};
pub use score::ScoreLedger;

use food::FoodRegistry;

/// Represents the authoritative state of the cooking pot.
#[derive(Debug)]
pub struct World {
    config: PotConfig,
    catalog: ItemCatalog,
    grid: Grid,
    foods: FoodRegistry,
    falling: FallScheduler,
    ledger: ScoreLedger,
    spawning_enabled: bool,
    rejection_streak: u32,
    tick_index: u64,
}

impl World {
    /// Creates an empty pot with the provided configuration and item catalog.
    pub fn new(config: PotConfig, catalog: ItemCatalog) -> Result<Self, SimError> {
        let grid = Grid::from_config(&config)?;
        let falling = FallScheduler::new(config.fall_interval);
        Ok(Self {
            config,
            catalog,
            grid,
            foods: FoodRegistry::new(),
            falling,
            ledger: ScoreLedger::new(),
            spawning_enabled: true,
            rejection_streak: 0,
            tick_index: 0,
        })
    }

    fn spawn_food(
        &mut self,
        column: u32,
        kind: KindId,
        out_events: &mut Vec<Event>,
    ) -> Result<(), SimError> {
        let appearance = self
            .catalog
            .item(kind)
            .map(|definition| definition.appearance)
            .ok_or(SimError::UnknownKind(kind))?;
        let cell = self.grid.spawn_cell(column)?;

        if let Some(occupant) = self.grid.occupant(cell)? {
            self.reject_spawn(cell, occupant, out_events);
            return Ok(());
        }

        self.rejection_streak = 0;
        let food = self.foods.allocate(kind, appearance);
        self.grid.place(cell, food)?;
        let _ = self.falling.register(food);
        out_events.push(Event::FoodSpawned {
            food,
            kind,
            cell,
            appearance,
        });
        Ok(())
    }

    fn reject_spawn(
        &mut self,
        cell: CellCoord,
        occupant: FoodId,
        out_events: &mut Vec<Event>,
    ) {
        self.rejection_streak = self.rejection_streak.saturating_add(1);
        debug!(cell = %cell, streak = self.rejection_streak, "spawn cell occupied");
        out_events.push(Event::SpawnRejected { cell, occupant });

        let Some(threshold) = self.config.full_after_rejections else {
            return;
        };
        if self.rejection_streak == threshold.get() {
            warn!(
                consecutive_rejections = self.rejection_streak,
                "pot is full, disabling spawns"
            );
            out_events.push(Event::PotFull {
                consecutive_rejections: self.rejection_streak,
            });
            self.set_spawning(false, out_events);
        }
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        out_events.push(Event::TimeAdvanced { dt });

        falling::advance(
            &mut self.falling,
            &mut self.grid,
            &mut self.foods,
            dt,
            out_events,
        );
        self.cook(dt);
    }

    fn cook(&mut self, dt: Duration) {
        let rate = self.config.doneness_rate * dt.as_secs_f32();
        for (food, cell) in self.grid.placements() {
            let Ok(speed) = self.grid.cook_speed(cell) else {
                continue;
            };
            if let Some(state) = self.foods.get_mut(food) {
                if state.lifecycle == Lifecycle::Settled {
                    state.update_doneness(speed * rate);
                }
            }
        }
    }

    fn set_spawning(&mut self, enabled: bool, out_events: &mut Vec<Event>) {
        if self.spawning_enabled == enabled {
            return;
        }
        self.spawning_enabled = enabled;
        if enabled {
            self.rejection_streak = 0;
        }
        out_events.push(Event::SpawningChanged { enabled });
    }

    fn award(&mut self, delta: i64, out_events: &mut Vec<Event>) {
        let total = self.ledger.add_score(delta);
        out_events.push(Event::ScoreChanged { total, delta });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Errors are reserved for requests the caller should never have issued, such
/// as coordinates outside the grid or unknown kinds. Ticks never fail.
pub fn apply(
    world: &mut World,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<(), SimError> {
    match command {
        Command::SpawnFood { column, kind } => world.spawn_food(column, kind, out_events),
        Command::Tick { dt } => {
            world.tick(dt, out_events);
            Ok(())
        }
        Command::ActivateCell { cell } => matching::activate(world, cell, out_events),
        Command::SetSpawning { enabled } => {
            world.set_spawning(enabled, out_events);
            Ok(())
        }
        Command::ResetScore => {
            let previous = world.ledger.total();
            world.ledger.reset();
            out_events.push(Event::ScoreChanged {
                total: world.ledger.total(),
                delta: previous.saturating_neg(),
            });
            Ok(())
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use hotpot_core::{
        FoodId, FoodSnapshot, FoodView, ItemCatalog, Lifecycle, OccupancyView, PotConfig,
    };

    use super::{FallScheduler, Grid, ScoreLedger, World};

    /// Configuration the world was constructed with.
    #[must_use]
    pub fn config(world: &World) -> &PotConfig {
        &world.config
    }

    /// Item catalog shared by every item in the pot.
    #[must_use]
    pub fn catalog(world: &World) -> &ItemCatalog {
        &world.catalog
    }

    /// Provides read-only access to the occupancy grid.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Number of columns and rows in the grid.
    #[must_use]
    pub fn dimensions(world: &World) -> (u32, u32) {
        world.grid.dimensions()
    }

    /// Exposes a read-only view of the dense occupancy grid.
    #[must_use]
    pub fn occupancy_view(world: &World) -> OccupancyView<'_> {
        world.grid.occupancy_view()
    }

    /// Captures a read-only view of every item in the world.
    #[must_use]
    pub fn food_view(world: &World) -> FoodView {
        let snapshots = world
            .foods
            .iter()
            .map(|(id, _)| id)
            .filter_map(|id| food(world, id))
            .collect();
        FoodView::from_snapshots(snapshots)
    }

    /// Captures the state of a single item.
    #[must_use]
    pub fn food(world: &World, food: FoodId) -> Option<FoodSnapshot> {
        let state = world.foods.get(food)?;
        Some(FoodSnapshot {
            id: food,
            kind: state.kind,
            appearance: state.appearance,
            cell: world.grid.position_of(food),
            lifecycle: state.lifecycle,
            doneness: state.doneness,
            fall_timer: state.fall_timer,
            partner: state.partner,
        })
    }

    /// Lifecycle of an item; identifiers that were harvested report `Removed`.
    #[must_use]
    pub fn lifecycle(world: &World, food: FoodId) -> Option<Lifecycle> {
        world.foods.lifecycle(food)
    }

    /// Items currently falling, in identifier order.
    #[must_use]
    pub fn fall_scheduler(world: &World) -> &FallScheduler {
        &world.falling
    }

    /// Ledger holding the running score.
    #[must_use]
    pub fn ledger(world: &World) -> &ScoreLedger {
        &world.ledger
    }

    /// Running score total.
    #[must_use]
    pub fn score(world: &World) -> i64 {
        world.ledger.total()
    }

    /// Reports whether automatic spawning is active.
    #[must_use]
    pub fn spawning_enabled(world: &World) -> bool {
        world.spawning_enabled
    }

    /// Number of consecutive spawn requests rejected because the spawn cell was taken.
    #[must_use]
    pub fn rejection_streak(world: &World) -> u32 {
        world.rejection_streak
    }

    /// Number of ticks applied so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}
