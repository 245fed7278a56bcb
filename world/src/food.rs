//! Authoritative food item state and identifier allocation.

use std::{collections::BTreeMap, time::Duration};

use hotpot_core::{AppearanceId, FoodId, KindId, Lifecycle, MAX_DONENESS};

/// State of a single food item stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct FoodState {
    /// Catalog kind; never reassigned, even after a match.
    pub(crate) kind: KindId,
    /// Appearance shown to the renderer.
    pub(crate) appearance: AppearanceId,
    pub(crate) doneness: f32,
    /// Time accumulated toward the next fall step.
    pub(crate) fall_timer: Duration,
    pub(crate) lifecycle: Lifecycle,
    /// Non-owning link to the match partner.
    pub(crate) partner: Option<FoodId>,
}

impl FoodState {
    fn spawned(kind: KindId, appearance: AppearanceId) -> Self {
        Self {
            kind,
            appearance,
            doneness: 0.0,
            fall_timer: Duration::ZERO,
            lifecycle: Lifecycle::Falling,
            partner: None,
        }
    }

    /// Adds `delta` to the doneness accumulator unless the item is matched.
    pub(crate) fn update_doneness(&mut self, delta: f32) {
        if self.lifecycle == Lifecycle::Matched {
            return;
        }
        self.doneness = (self.doneness + delta).clamp(0.0, MAX_DONENESS);
    }
}

/// Registry that stores food items and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct FoodRegistry {
    entries: BTreeMap<FoodId, FoodState>,
    next_food_id: FoodId,
}

impl FoodRegistry {
    /// Creates an empty registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_food_id: FoodId::new(0),
        }
    }

    /// Stores a freshly spawned item and returns its identifier.
    pub(crate) fn allocate(&mut self, kind: KindId, appearance: AppearanceId) -> FoodId {
        let id = self.next_food_id;
        self.next_food_id = FoodId::new(id.get().wrapping_add(1));
        let _ = self.entries.insert(id, FoodState::spawned(kind, appearance));
        id
    }

    pub(crate) fn get(&self, food: FoodId) -> Option<&FoodState> {
        self.entries.get(&food)
    }

    pub(crate) fn get_mut(&mut self, food: FoodId) -> Option<&mut FoodState> {
        self.entries.get_mut(&food)
    }

    /// Drops the item, returning its final state marked as removed.
    pub(crate) fn remove(&mut self, food: FoodId) -> Option<FoodState> {
        self.entries.remove(&food).map(|mut state| {
            state.lifecycle = Lifecycle::Removed;
            state
        })
    }

    /// Lifecycle of the item, reporting [`Lifecycle::Removed`] for dropped identifiers.
    pub(crate) fn lifecycle(&self, food: FoodId) -> Option<Lifecycle> {
        match self.entries.get(&food) {
            Some(state) => Some(state.lifecycle),
            None if food < self.next_food_id => Some(Lifecycle::Removed),
            None => None,
        }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (FoodId, &FoodState)> {
        self.entries.iter().map(|(id, state)| (*id, state))
    }
}
