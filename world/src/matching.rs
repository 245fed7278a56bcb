//! Adjacency matching and harvesting.

use std::time::Duration;

use hotpot_core::{CellCoord, Event, FoodId, Lifecycle, SimError};
use tracing::debug;

use crate::World;

/// Finds the first settled, unmatched neighbour that combines with `food`.
///
/// Neighbours are scanned up, down, left, right and the first compatible one
/// wins, even when several neighbours would match.
#[must_use]
pub fn check_adjacent_match(world: &World, food: FoodId) -> Option<FoodId> {
    let state = world.foods.get(food)?;
    if state.lifecycle == Lifecycle::Matched {
        return None;
    }
    let cell = world.grid.position_of(food)?;
    let neighbours = world.grid.neighbors4(cell).ok()?;

    neighbours.into_iter().find_map(|neighbour| {
        let occupant = world.grid.occupant(neighbour).ok().flatten()?;
        let other = world.foods.get(occupant)?;
        if other.lifecycle != Lifecycle::Settled {
            return None;
        }
        world
            .catalog
            .match_rule(state.kind, other.kind)
            .map(|_| occupant)
    })
}

/// Combines `primary` and `partner` into a single match occupying the primary's cell.
///
/// The partner leaves the grid but stays in the world until the match is
/// harvested. Requests naming a removed or already matched item are ignored.
pub fn create_match(
    world: &mut World,
    primary: FoodId,
    partner: FoodId,
    out_events: &mut Vec<Event>,
) -> Result<(), SimError> {
    let (Some(first), Some(second)) = (world.foods.get(primary), world.foods.get(partner)) else {
        return Ok(());
    };
    if first.lifecycle == Lifecycle::Matched || second.lifecycle == Lifecycle::Matched {
        return Ok(());
    }
    let (first_kind, second_kind) = (first.kind, second.kind);

    let not_adjacent = SimError::NotAdjacent {
        first: primary,
        second: partner,
    };
    let (Some(primary_cell), Some(partner_cell)) =
        (world.grid.position_of(primary), world.grid.position_of(partner))
    else {
        return Err(not_adjacent);
    };
    if !primary_cell.is_adjacent(partner_cell) {
        return Err(not_adjacent);
    }

    let rule = world
        .catalog
        .match_rule(first_kind, second_kind)
        .ok_or(SimError::NoMatchRule {
            first: first_kind,
            second: second_kind,
        })?;

    let _ = world.grid.remove(partner_cell)?;
    let _ = world.falling.deregister(primary);
    let _ = world.falling.deregister(partner);

    if let Some(state) = world.foods.get_mut(primary) {
        state.lifecycle = Lifecycle::Matched;
        state.partner = Some(partner);
        state.appearance = rule.appearance();
        state.fall_timer = Duration::ZERO;
    }
    if let Some(state) = world.foods.get_mut(partner) {
        state.lifecycle = Lifecycle::Matched;
        state.partner = Some(primary);
        state.fall_timer = Duration::ZERO;
    }

    debug!(
        primary = primary.get(),
        partner = partner.get(),
        cell = %primary_cell,
        "match formed"
    );
    out_events.push(Event::MatchFormed {
        primary,
        partner,
        cell: primary_cell,
        appearance: rule.appearance(),
    });
    Ok(())
}

/// Harvests a match, awarding the rule score and removing both participants.
///
/// Either participant may be named. The score is looked up from the pre-match
/// kinds of both items rather than from the match appearance.
pub fn harvest_match(world: &mut World, food: FoodId, out_events: &mut Vec<Event>) {
    let Some(state) = world.foods.get(food) else {
        return;
    };
    if state.lifecycle != Lifecycle::Matched {
        return;
    }
    let Some(linked) = state.partner else {
        return;
    };

    let (primary, partner) = if world.grid.position_of(food).is_some() {
        (food, linked)
    } else {
        (linked, food)
    };
    let Some(cell) = world.grid.position_of(primary) else {
        return;
    };

    let score = match (world.foods.get(primary), world.foods.get(partner)) {
        (Some(first), Some(second)) => world
            .catalog
            .match_rule(first.kind, second.kind)
            .map_or(0, |rule| i64::from(rule.score())),
        _ => 0,
    };

    discard(world, primary, cell);
    let _ = world.falling.deregister(partner);
    let _ = world.foods.remove(partner);

    debug!(primary = primary.get(), partner = partner.get(), score, "match harvested");
    out_events.push(Event::MatchHarvested {
        primary,
        partner,
        cell,
        score,
    });
    world.award(score, out_events);
}

/// Harvests a single item, scoring it by how close it is to ideal doneness.
///
/// Matched items are harvested as a match so that both participants leave
/// together.
pub fn harvest_single(world: &mut World, food: FoodId, out_events: &mut Vec<Event>) {
    let Some(state) = world.foods.get(food) else {
        return;
    };
    if state.lifecycle == Lifecycle::Matched {
        harvest_match(world, food, out_events);
        return;
    }
    let Some(cell) = world.grid.position_of(food) else {
        return;
    };

    let score = world
        .catalog
        .item(state.kind)
        .map_or(0, |definition| definition.harvest_score(state.doneness));

    discard(world, food, cell);

    debug!(food = food.get(), score, "food harvested");
    out_events.push(Event::FoodHarvested { food, cell, score });
    world.award(score, out_events);
}

/// Resolves a player interaction with `cell`.
///
/// Matched occupants are harvested as a match, settled occupants with a
/// compatible neighbour form a match, and anything else is harvested on its
/// own. Empty cells are ignored.
pub(crate) fn activate(
    world: &mut World,
    cell: CellCoord,
    out_events: &mut Vec<Event>,
) -> Result<(), SimError> {
    let Some(food) = world.grid.occupant(cell)? else {
        return Ok(());
    };
    let Some(lifecycle) = world.foods.lifecycle(food) else {
        return Ok(());
    };

    match lifecycle {
        Lifecycle::Matched => harvest_match(world, food, out_events),
        Lifecycle::Settled => match check_adjacent_match(world, food) {
            Some(partner) => create_match(world, food, partner, out_events)?,
            None => harvest_single(world, food, out_events),
        },
        Lifecycle::Falling => harvest_single(world, food, out_events),
        Lifecycle::Removed => {}
    }
    Ok(())
}

fn discard(world: &mut World, food: FoodId, cell: CellCoord) {
    let _ = world.grid.remove(cell);
    let _ = world.falling.deregister(food);
    let _ = world.foods.remove(food);
}
