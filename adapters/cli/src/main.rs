#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Hotpot session.

mod manifest;
mod render;

use std::{collections::BTreeMap, path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::Parser;
use hotpot_core::{CellCoord, Event};
use hotpot_session::Session;
use hotpot_world::query;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Runs the cooking pot simulation for a fixed number of ticks.
#[derive(Debug, Parser)]
#[command(name = "hotpot", version, about)]
struct Args {
    /// Kitchen manifest describing the pot, items and matches.
    #[arg(short, long, value_name = "FILE", default_value = "assets/pot.toml")]
    kitchen: PathBuf,

    /// Number of ticks to simulate.
    #[arg(short, long, default_value = "120", value_name = "N")]
    ticks: u32,

    /// Simulated time per tick.
    #[arg(long, default_value = "250", value_name = "MS")]
    dt_ms: u64,

    /// Seed for spawn selection.
    #[arg(short, long, default_value = "0")]
    seed: u64,

    /// Activates a cell after the given tick, written as `TICK:COLUMN,ROW`.
    #[arg(short, long = "activate", value_name = "TICK:COLUMN,ROW", value_parser = parse_activation)]
    activations: Vec<(u32, CellCoord)>,

    /// Prints the pot after every N ticks.
    #[arg(long, value_name = "N")]
    show_every: Option<u32>,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let kitchen = manifest::load_kitchen(&args.kitchen)?;
    let mut session = Session::new(kitchen.config, kitchen.catalog, kitchen.table, args.seed)
        .context("failed to start session")?;
    info!(
        kitchen = %args.kitchen.display(),
        ticks = args.ticks,
        seed = args.seed,
        "session started"
    );

    let mut schedule: BTreeMap<u32, Vec<CellCoord>> = BTreeMap::new();
    for (tick, cell) in &args.activations {
        schedule.entry(*tick).or_default().push(*cell);
    }

    let dt = Duration::from_millis(args.dt_ms);
    for tick in 1..=args.ticks {
        for event in session.tick(dt) {
            log_event(&event);
        }

        for cell in schedule.remove(&tick).unwrap_or_default() {
            let events = session
                .activate(cell)
                .with_context(|| format!("failed to activate cell {cell} after tick {tick}"))?;
            events.iter().for_each(log_event);
        }

        if args.show_every.is_some_and(|every| every > 0 && tick % every == 0) {
            println!("tick {tick}\n{}", render::render_pot(session.world()));
        }
    }

    if let Some(tick) = schedule.keys().next() {
        warn!(tick, "activations scheduled beyond the last tick were skipped");
    }

    print!("{}", render::render_pot(session.world()));
    info!(score = query::score(session.world()), "session finished");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn log_event(event: &Event) {
    match event {
        Event::FoodHarvested { food, cell, score } => {
            info!(food = food.get(), cell = %cell, score, "harvested");
        }
        Event::MatchHarvested {
            primary,
            partner,
            cell,
            score,
        } => info!(
            primary = primary.get(),
            partner = partner.get(),
            cell = %cell,
            score,
            "match harvested"
        ),
        Event::MatchFormed { cell, .. } => info!(cell = %cell, "match formed"),
        Event::PotFull {
            consecutive_rejections,
        } => warn!(consecutive_rejections, "pot is full"),
        Event::ScoreChanged { total, delta } => debug!(total, delta, "score changed"),
        other => debug!(event = ?other, "event"),
    }
}

fn parse_activation(value: &str) -> Result<(u32, CellCoord)> {
    let Some((tick, cell)) = value.split_once(':') else {
        bail!("expected TICK:COLUMN,ROW but found {value:?}");
    };
    let Some((column, row)) = cell.split_once(',') else {
        bail!("expected COLUMN,ROW but found {cell:?}");
    };
    let tick = tick.trim().parse().context("invalid tick")?;
    let column = column.trim().parse().context("invalid column")?;
    let row = row.trim().parse().context("invalid row")?;
    Ok((tick, CellCoord::new(column, row)))
}
