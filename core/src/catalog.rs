//! Immutable item definitions, pairwise match rules, and spawn weights.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{AppearanceId, KindId, SimError, MAX_DONENESS};

/// Definition of a single item kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemDefinition {
    /// Human readable name used by configuration files.
    pub name: String,
    /// Appearance displayed for unmatched items of this kind.
    pub appearance: AppearanceId,
    /// Score awarded for a harvest at ideal doneness before weighting.
    pub base_score: u32,
    /// Doneness at which a harvest earns the full score.
    pub ideal_doneness: f32,
    /// Multiplier applied to the base score.
    pub score_weight: f32,
}

impl ItemDefinition {
    /// Creates a new item definition.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        appearance: AppearanceId,
        base_score: u32,
        ideal_doneness: f32,
        score_weight: f32,
    ) -> Self {
        Self {
            name: name.into(),
            appearance,
            base_score,
            ideal_doneness,
            score_weight,
        }
    }

    /// Score awarded when harvesting an item of this kind at the given doneness.
    ///
    /// The award decays linearly with the distance between `doneness` and the
    /// ideal doneness, reaching zero once the two are a full doneness range
    /// apart. Under- and over-cooking are penalised symmetrically. Halves round
    /// to the nearest even score.
    #[must_use]
    pub fn harvest_score(&self, doneness: f32) -> i64 {
        let deviation = (doneness - self.ideal_doneness).abs();
        let ratio = (1.0 - deviation / MAX_DONENESS).clamp(0.0, 1.0);
        let score = f64::from(self.base_score) * f64::from(self.score_weight) * f64::from(ratio);
        score.round_ties_even() as i64
    }

    /// Score awarded for a harvest exactly at the ideal doneness.
    #[must_use]
    pub fn max_score(&self) -> i64 {
        self.harvest_score(self.ideal_doneness)
    }
}

/// Result of combining two compatible item kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchRule {
    score: u32,
    appearance: AppearanceId,
}

impl MatchRule {
    /// Creates a new match rule.
    #[must_use]
    pub const fn new(score: u32, appearance: AppearanceId) -> Self {
        Self { score, appearance }
    }

    /// Score awarded when the match is harvested.
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    /// Appearance displayed by the matched item.
    #[must_use]
    pub const fn appearance(&self) -> AppearanceId {
        self.appearance
    }
}

/// Read-only catalog of item kinds and the rules that combine them.
#[derive(Clone, Debug, Default)]
pub struct ItemCatalog {
    items: Vec<ItemDefinition>,
    rules: BTreeMap<(KindId, KindId), MatchRule>,
}

impl ItemCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new item kind and returns its identifier.
    ///
    /// Identifiers are allocated sequentially in registration order.
    pub fn register_item(&mut self, definition: ItemDefinition) -> Result<KindId, SimError> {
        let kind = kind_for_index(self.items.len())?;
        self.items.push(definition);
        Ok(kind)
    }

    /// Registers the rule combining `first` and `second`.
    ///
    /// Rules are order independent; registering `(B, A)` after `(A, B)`
    /// replaces the earlier rule and returns it.
    pub fn register_rule(
        &mut self,
        first: KindId,
        second: KindId,
        rule: MatchRule,
    ) -> Result<Option<MatchRule>, SimError> {
        for kind in [first, second] {
            if !self.contains(kind) {
                return Err(SimError::UnknownKind(kind));
            }
        }
        Ok(self.rules.insert(rule_key(first, second), rule))
    }

    /// Returns the definition registered for `kind`.
    #[must_use]
    pub fn item(&self, kind: KindId) -> Option<&ItemDefinition> {
        usize::try_from(kind.get())
            .ok()
            .and_then(|index| self.items.get(index))
    }

    /// Reports whether `kind` is defined by the catalog.
    #[must_use]
    pub fn contains(&self, kind: KindId) -> bool {
        self.item(kind).is_some()
    }

    /// Resolves a kind by its configured name.
    #[must_use]
    pub fn kind_named(&self, name: &str) -> Option<KindId> {
        self.kinds()
            .find(|(_, definition)| definition.name == name)
            .map(|(kind, _)| kind)
    }

    /// Looks up the rule combining the two kinds regardless of argument order.
    #[must_use]
    pub fn match_rule(&self, first: KindId, second: KindId) -> Option<MatchRule> {
        self.rules.get(&rule_key(first, second)).copied()
    }

    /// Iterator over every registered kind in identifier order.
    pub fn kinds(&self) -> impl Iterator<Item = (KindId, &ItemDefinition)> {
        self.items
            .iter()
            .enumerate()
            .filter_map(|(index, definition)| Some((kind_for_index(index).ok()?, definition)))
    }

    /// Number of registered kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Reports whether the catalog defines no kinds.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of registered match rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

fn kind_for_index(index: usize) -> Result<KindId, SimError> {
    u32::try_from(index)
        .map(KindId::new)
        .map_err(|_| SimError::CatalogFull)
}

fn rule_key(first: KindId, second: KindId) -> (KindId, KindId) {
    if first <= second {
        (first, second)
    } else {
        (second, first)
    }
}

/// Relative likelihood of spawning a particular kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnWeight {
    /// Kind produced when this entry is selected.
    pub kind: KindId,
    /// Relative weight of the entry.
    pub weight: u32,
}

/// Ordered list of weighted kinds eligible for spawning.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpawnTable {
    entries: Vec<SpawnWeight>,
    total_weight: u64,
}

impl SpawnTable {
    /// Creates a table from the provided entries, precomputing the weight sum.
    #[must_use]
    pub fn new(entries: Vec<SpawnWeight>) -> Self {
        let total_weight = entries.iter().map(|entry| u64::from(entry.weight)).sum();
        Self {
            entries,
            total_weight,
        }
    }

    /// Entries in configuration order.
    #[must_use]
    pub fn entries(&self) -> &[SpawnWeight] {
        &self.entries
    }

    /// Sum of all entry weights.
    #[must_use]
    pub const fn total_weight(&self) -> u64 {
        self.total_weight
    }

    /// Reports whether no kind can ever be selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() || self.total_weight == 0
    }

    /// Resolves a draw in `0..total_weight` to a kind by walking cumulative weights.
    ///
    /// Returns `None` when the draw lies outside the weighted range.
    #[must_use]
    pub fn kind_for_draw(&self, draw: u64) -> Option<KindId> {
        let mut cumulative = 0_u64;
        for entry in &self.entries {
            cumulative += u64::from(entry.weight);
            if draw < cumulative {
                return Some(entry.kind);
            }
        }
        None
    }
}
