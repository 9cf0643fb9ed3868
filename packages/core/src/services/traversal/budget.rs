//! Remote-Call Budget
//!
//! Counts what a traversal may still spend. The root sample costs
//! [`SAMPLE_COST`]; each BFS round (one children fan-out plus one hydrate)
//! costs [`ROUND_COST`]. Running out halts the walk, it is not an error.

use serde::Serialize;

/// Default units per traversal call
pub const DEFAULT_BUDGET: u32 = 8;

/// Cost of the root `get_children` sample
pub const SAMPLE_COST: u32 = 1;

/// Cost of one discovery + hydration round
pub const ROUND_COST: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraversalBudget {
    initial: u32,
    remaining: u32,
}

impl TraversalBudget {
    pub fn new(total: u32) -> Self {
        Self {
            initial: total,
            remaining: total,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn used(&self) -> u32 {
        self.initial - self.remaining
    }

    pub fn can_afford(&self, cost: u32) -> bool {
        self.remaining >= cost
    }

    /// Spend `cost` only if all of it is available
    pub fn try_spend(&mut self, cost: u32) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        self.remaining -= cost;
        true
    }

    /// Spend unconditionally, stopping at zero
    pub fn charge(&mut self, cost: u32) {
        self.remaining = self.remaining.saturating_sub(cost);
    }
}

impl Default for TraversalBudget {
    fn default() -> Self {
        Self::new(DEFAULT_BUDGET)
    }
}
