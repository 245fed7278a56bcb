use std::{collections::HashSet, fs, num::NonZeroU32, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use hotpot_core::{
    AppearanceId, CellCoord, CookSpeedOverride, ItemCatalog, ItemDefinition, KindId,
    MatchRule, PotConfig, SpawnTable, SpawnWeight, MAX_DONENESS,
};
use serde::Deserialize;

const SUPPORTED_MANIFEST_VERSION: u32 = 1;

/// Everything needed to start a session, loaded from a kitchen manifest.
#[derive(Debug)]
pub(crate) struct Kitchen {
    pub(crate) config: PotConfig,
    pub(crate) catalog: ItemCatalog,
    pub(crate) table: SpawnTable,
}

/// Reads and validates the kitchen manifest stored at `path`.
pub(crate) fn load_kitchen(path: &Path) -> Result<Kitchen> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read kitchen manifest {}", path.display()))?;
    parse_kitchen(&contents)
        .with_context(|| format!("invalid kitchen manifest {}", path.display()))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    version: u32,
    #[serde(default)]
    pot: PotSection,
    items: Vec<ItemEntry>,
    #[serde(default)]
    matches: Vec<MatchEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PotSection {
    columns: Option<u32>,
    rows: Option<u32>,
    cell_length: Option<f32>,
    spawn_interval_ms: Option<u64>,
    fall_interval_ms: Option<u64>,
    doneness_rate: Option<f32>,
    default_cook_speed: Option<f32>,
    /// Zero disables the full-pot signal.
    full_after_rejections: Option<u32>,
    cook_speed: Vec<CookSpeedEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CookSpeedEntry {
    column: u32,
    row: u32,
    speed: f32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ItemEntry {
    name: String,
    appearance: u32,
    base_score: u32,
    ideal_doneness: f32,
    #[serde(default = "default_score_weight")]
    score_weight: f32,
    #[serde(default)]
    spawn_weight: u32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MatchEntry {
    first: String,
    second: String,
    score: u32,
    appearance: u32,
}

fn default_score_weight() -> f32 {
    1.0
}

fn parse_kitchen(contents: &str) -> Result<Kitchen> {
    let manifest: Manifest =
        toml::from_str(contents).context("failed to parse kitchen manifest toml contents")?;
    if manifest.version != SUPPORTED_MANIFEST_VERSION {
        bail!(
            "unsupported kitchen manifest version {}; expected {}",
            manifest.version,
            SUPPORTED_MANIFEST_VERSION
        );
    }
    if manifest.items.is_empty() {
        bail!("kitchen manifest lists no items");
    }

    let mut catalog = ItemCatalog::new();
    let mut weights = Vec::with_capacity(manifest.items.len());
    for entry in manifest.items {
        if catalog.kind_named(&entry.name).is_some() {
            bail!("kitchen manifest contains duplicate item {:?}", entry.name);
        }
        if !(entry.score_weight >= 0.0 && entry.score_weight.is_finite()) {
            bail!(
                "item {:?} has score weight {}; expected a non-negative number",
                entry.name,
                entry.score_weight
            );
        }
        if !(0.0..=MAX_DONENESS).contains(&entry.ideal_doneness) {
            bail!(
                "item {:?} has ideal doneness {}; expected a value in 0..={MAX_DONENESS}",
                entry.name,
                entry.ideal_doneness
            );
        }
        let kind = catalog.register_item(ItemDefinition::new(
            entry.name,
            AppearanceId::new(entry.appearance),
            entry.base_score,
            entry.ideal_doneness,
            entry.score_weight,
        ))?;
        weights.push(SpawnWeight {
            kind,
            weight: entry.spawn_weight,
        });
    }

    for entry in manifest.matches {
        let first = lookup(&catalog, &entry.first)?;
        let second = lookup(&catalog, &entry.second)?;
        let rule = MatchRule::new(entry.score, AppearanceId::new(entry.appearance));
        if catalog.register_rule(first, second, rule)?.is_some() {
            bail!(
                "kitchen manifest contains duplicate match {:?} + {:?}",
                entry.first,
                entry.second
            );
        }
    }

    let config = pot_config(manifest.pot)?;
    Ok(Kitchen {
        config,
        catalog,
        table: SpawnTable::new(weights),
    })
}

fn lookup(catalog: &ItemCatalog, name: &str) -> Result<KindId> {
    match catalog.kind_named(name) {
        Some(kind) => Ok(kind),
        None => bail!("match refers to unknown item {name:?}"),
    }
}

fn pot_config(section: PotSection) -> Result<PotConfig> {
    let mut config = PotConfig::default();
    if let Some(columns) = section.columns {
        config.columns = columns;
    }
    if let Some(rows) = section.rows {
        config.rows = rows;
    }
    if let Some(cell_length) = section.cell_length {
        config.cell_length = cell_length;
    }
    if let Some(ms) = section.spawn_interval_ms {
        config.spawn_interval = Duration::from_millis(ms);
    }
    if let Some(ms) = section.fall_interval_ms {
        config.fall_interval = Duration::from_millis(ms);
    }
    if let Some(rate) = section.doneness_rate {
        config.doneness_rate = rate;
    }
    if let Some(speed) = section.default_cook_speed {
        config.default_cook_speed = speed;
    }
    if let Some(threshold) = section.full_after_rejections {
        config.full_after_rejections = NonZeroU32::new(threshold);
    }

    let mut seen = HashSet::new();
    for entry in section.cook_speed {
        let cell = CellCoord::new(entry.column, entry.row);
        if !seen.insert(cell) {
            bail!("duplicate cook speed override for cell {cell}");
        }
        config.cook_speed_overrides.push(CookSpeedOverride {
            cell,
            speed: entry.speed,
        });
    }

    config.validate().context("pot section is invalid")?;
    Ok(config)
}
