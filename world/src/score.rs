//! Running score total.

/// Accumulates score deltas reported by harvests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScoreLedger {
    total: i64,
}

impl ScoreLedger {
    /// Creates a ledger with a zero total.
    #[must_use]
    pub const fn new() -> Self {
        Self { total: 0 }
    }

    /// Current running total.
    #[must_use]
    pub const fn total(&self) -> i64 {
        self.total
    }

    /// Adds `delta` to the total and returns the new total.
    pub fn add_score(&mut self, delta: i64) -> i64 {
        self.total = self.total.saturating_add(delta);
        self.total
    }

    /// Resets the total to zero.
    pub fn reset(&mut self) {
        self.total = 0;
    }
}
