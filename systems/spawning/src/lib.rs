#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting food spawn commands.

use std::time::Duration;

use hotpot_core::{Command, KindId, SimError, SpawnTable};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{trace, warn};

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    spawn_interval: Duration,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided spawn cadence and seed.
    #[must_use]
    pub const fn new(spawn_interval: Duration, rng_seed: u64) -> Self {
        Self {
            spawn_interval,
            rng_seed,
        }
    }
}

/// Pure system that periodically emits weighted random spawn commands.
#[derive(Debug)]
pub struct Spawning {
    spawn_interval: Duration,
    accumulator: Duration,
    rng: ChaCha8Rng,
    table: SpawnTable,
    reported_empty: bool,
}

impl Spawning {
    /// Creates a new spawning system drawing kinds from `table`.
    #[must_use]
    pub fn new(config: Config, table: SpawnTable) -> Self {
        Self {
            spawn_interval: config.spawn_interval,
            accumulator: Duration::ZERO,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            table,
            reported_empty: false,
        }
    }

    /// Replaces the weighted spawn table, re-enabling spawns after an empty one.
    pub fn configure_table(&mut self, table: SpawnTable) {
        self.table = table;
        self.reported_empty = false;
        self.accumulator = Duration::ZERO;
    }

    /// Weighted table kinds are drawn from.
    #[must_use]
    pub fn table(&self) -> &SpawnTable {
        &self.table
    }

    /// Time accumulated toward the next spawn.
    #[must_use]
    pub const fn accumulator(&self) -> Duration {
        self.accumulator
    }

    /// Draws a kind with probability proportional to its weight.
    pub fn select_kind(&mut self) -> Result<KindId, SimError> {
        if self.table.is_empty() {
            return Err(SimError::EmptyCatalog);
        }
        let draw = self.rng.gen_range(0..self.table.total_weight());
        let kind = self
            .table
            .kind_for_draw(draw)
            .ok_or(SimError::EmptyCatalog)?;
        trace!(draw, kind = kind.get(), "selected spawn kind");
        Ok(kind)
    }

    /// Advances the spawn timer by `dt` and emits at most one spawn command.
    ///
    /// The accumulator restarts from zero after each spawn, so a long frame
    /// never produces a burst of spawns. Disabled spawning clears the timer.
    pub fn handle(
        &mut self,
        dt: Duration,
        spawning_enabled: bool,
        columns: u32,
        out: &mut Vec<Command>,
    ) {
        if !spawning_enabled {
            self.accumulator = Duration::ZERO;
            return;
        }

        if self.spawn_interval.is_zero() || columns == 0 {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(dt);
        if self.accumulator < self.spawn_interval {
            return;
        }
        self.accumulator = Duration::ZERO;

        let kind = match self.select_kind() {
            Ok(kind) => kind,
            Err(error) => {
                if !self.reported_empty {
                    warn!(%error, "spawning suspended until the spawn table is reconfigured");
                    self.reported_empty = true;
                }
                return;
            }
        };
        let column = self.rng.gen_range(0..columns);
        out.push(Command::SpawnFood { column, kind });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotpot_core::SpawnWeight;

    #[test]
    fn empty_table_fails_selection() {
        let mut spawning = Spawning::new(Config::new(Duration::from_secs(1), 1), SpawnTable::default());
        assert_eq!(spawning.select_kind(), Err(SimError::EmptyCatalog));

        let zero = SpawnTable::new(vec![SpawnWeight {
            kind: KindId::new(0),
            weight: 0,
        }]);
        spawning.configure_table(zero);
        assert_eq!(spawning.select_kind(), Err(SimError::EmptyCatalog));
    }

    #[test]
    fn empty_table_emits_nothing() {
        let mut spawning = Spawning::new(Config::new(Duration::from_secs(1), 1), SpawnTable::default());
        let mut commands = Vec::new();
        for _ in 0..4 {
            spawning.handle(Duration::from_secs(1), true, 4, &mut commands);
        }
        assert!(commands.is_empty());
        assert!(spawning.reported_empty);
    }
}
