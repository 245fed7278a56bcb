//! Timer-gated gravity for items that have not come to rest yet.

use std::{collections::BTreeSet, time::Duration};

use hotpot_core::{Event, FoodId, Lifecycle};
use tracing::debug;

use crate::{food::FoodRegistry, grid::Grid};

/// Tracks falling items and the cadence at which they descend.
#[derive(Clone, Debug)]
pub struct FallScheduler {
    interval: Duration,
    tracked: BTreeSet<FoodId>,
}

impl FallScheduler {
    /// Creates an empty scheduler stepping items once per `interval`.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            tracked: BTreeSet::new(),
        }
    }

    /// Simulated time an item waits before each fall step.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Reports whether the item is currently falling.
    #[must_use]
    pub fn is_tracked(&self, food: FoodId) -> bool {
        self.tracked.contains(&food)
    }

    /// Iterator over falling items in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = FoodId> + '_ {
        self.tracked.iter().copied()
    }

    /// Number of falling items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    /// Reports whether nothing is falling.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    pub(crate) fn register(&mut self, food: FoodId) -> bool {
        self.tracked.insert(food)
    }

    /// Stops tracking the item. Untracked items are ignored.
    pub(crate) fn deregister(&mut self, food: FoodId) -> bool {
        self.tracked.remove(&food)
    }
}

/// Advances every falling item by `dt`, stepping those whose timer elapsed.
///
/// Items are visited in identifier order over a snapshot of the falling set,
/// so settling during the pass never disturbs the iteration.
pub(crate) fn advance(
    scheduler: &mut FallScheduler,
    grid: &mut Grid,
    foods: &mut FoodRegistry,
    dt: Duration,
    out_events: &mut Vec<Event>,
) {
    let snapshot: Vec<FoodId> = scheduler.iter().collect();
    for food in snapshot {
        let Some(state) = foods.get_mut(food) else {
            let _ = scheduler.deregister(food);
            continue;
        };
        if state.lifecycle != Lifecycle::Falling {
            let _ = scheduler.deregister(food);
            continue;
        }

        state.fall_timer = state.fall_timer.saturating_add(dt);
        if state.fall_timer < scheduler.interval {
            continue;
        }
        state.fall_timer = Duration::ZERO;

        let Some(from) = grid.position_of(food) else {
            let _ = scheduler.deregister(food);
            continue;
        };

        let destination = from
            .below()
            .filter(|below| grid.is_empty(*below).unwrap_or(false));

        match destination {
            Some(to) => {
                if grid.place(to, food).is_ok() {
                    out_events.push(Event::FoodFell { food, from, to });
                }
            }
            None => {
                state.lifecycle = Lifecycle::Settled;
                let _ = scheduler.deregister(food);
                debug!(food = food.get(), cell = %from, "food settled");
                out_events.push(Event::FoodSettled { food, cell: from });
            }
        }
    }
}
