#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tick orchestration that wires the spawning system into the pot world.

use std::time::Duration;

use hotpot_core::{CellCoord, Command, Event, ItemCatalog, PotConfig, SimError, SpawnTable};
use hotpot_system_spawning::{Config, Spawning};
use hotpot_world::{self as world, query, World};
use tracing::warn;

/// Owns the world and the systems that drive it.
#[derive(Debug)]
pub struct Session {
    world: World,
    spawning: Spawning,
}

impl Session {
    /// Builds a session over an empty pot.
    ///
    /// Every kind named by `table` must be registered in `catalog`.
    pub fn new(
        config: PotConfig,
        catalog: ItemCatalog,
        table: SpawnTable,
        rng_seed: u64,
    ) -> Result<Self, SimError> {
        if let Some(entry) = table
            .entries()
            .iter()
            .find(|entry| !catalog.contains(entry.kind))
        {
            return Err(SimError::UnknownKind(entry.kind));
        }

        let spawning = Spawning::new(Config::new(config.spawn_interval, rng_seed), table);
        let world = World::new(config, catalog)?;
        Ok(Self { world, spawning })
    }

    /// Runs one simulation step: interval spawns, then falling and cooking.
    pub fn tick(&mut self, dt: Duration) -> Vec<Event> {
        let mut events = Vec::new();

        let mut commands = Vec::new();
        let (columns, _) = query::dimensions(&self.world);
        self.spawning.handle(
            dt,
            query::spawning_enabled(&self.world),
            columns,
            &mut commands,
        );
        for command in commands {
            self.apply_or_skip(command, &mut events);
        }

        self.apply_or_skip(Command::Tick { dt }, &mut events);
        events
    }

    /// Resolves a player interaction with `cell` immediately.
    pub fn activate(&mut self, cell: CellCoord) -> Result<Vec<Event>, SimError> {
        self.apply(Command::ActivateCell { cell })
    }

    /// Turns automatic spawning on or off.
    pub fn set_spawning(&mut self, enabled: bool) -> Vec<Event> {
        let mut events = Vec::new();
        self.apply_or_skip(Command::SetSpawning { enabled }, &mut events);
        events
    }

    /// Replaces the weighted spawn table.
    pub fn configure_spawn_table(&mut self, table: SpawnTable) -> Result<(), SimError> {
        let catalog = query::catalog(&self.world);
        if let Some(entry) = table
            .entries()
            .iter()
            .find(|entry| !catalog.contains(entry.kind))
        {
            return Err(SimError::UnknownKind(entry.kind));
        }
        self.spawning.configure_table(table);
        Ok(())
    }

    /// Applies an arbitrary command to the world.
    pub fn apply(&mut self, command: Command) -> Result<Vec<Event>, SimError> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events)?;
        Ok(events)
    }

    /// Read-only access to the pot state.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Read-only access to the spawning system.
    #[must_use]
    pub fn spawning(&self) -> &Spawning {
        &self.spawning
    }

    fn apply_or_skip(&mut self, command: Command, events: &mut Vec<Event>) {
        if let Err(error) = world::apply(&mut self.world, command.clone(), events) {
            warn!(%error, ?command, "skipping command during tick");
        }
    }
}
