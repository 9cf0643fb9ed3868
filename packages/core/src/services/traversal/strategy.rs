//! Traversal Strategy Selection
//!
//! A strategy fixes how wide each level is cut (`max_breadth`) and how deep
//! the walk goes (`target_depth`). It is picked from what kind of root the
//! walk starts at, then adjusted once from the root's observed fan-out.
//!
//! | Root kind | Priority | Breadth | Depth |
//! |-----------|----------|---------|-------|
//! | Shared    | breadth  | 20      | 2     |
//! | User      | balanced | 12      | 3     |
//! | Other     | depth    | 8       | 4     |

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Deepest level any adaptive walk may reach
pub const MAX_TARGET_DEPTH: usize = 4;

/// Fan-out above which the root counts as wide
pub const WIDE_FANOUT: usize = 30;

/// Fan-out below which the root counts as narrow
pub const NARROW_FANOUT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraversalPriority {
    Breadth,
    Balanced,
    Depth,
}

impl TraversalPriority {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "breadth" => Some(Self::Breadth),
            "balanced" => Some(Self::Balanced),
            "depth" => Some(Self::Depth),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraversalStrategy {
    pub priority: TraversalPriority,
    pub max_breadth: usize,
    pub target_depth: usize,
}

impl TraversalStrategy {
    /// Base parameters for a priority
    pub fn for_priority(priority: TraversalPriority) -> Self {
        let (max_breadth, target_depth) = match priority {
            TraversalPriority::Breadth => (20, 2),
            TraversalPriority::Balanced => (12, 3),
            TraversalPriority::Depth => (8, 4),
        };
        Self {
            priority,
            max_breadth,
            target_depth,
        }
    }

    /// One-shot adjustment from the root's fan-out
    ///
    /// Wide roots get shallower and wider (breadth clamped to 15..=25), narrow
    /// roots one level deeper with at least 8 per level.
    pub fn adjusted(self, fanout: usize) -> Self {
        if fanout > WIDE_FANOUT {
            Self {
                target_depth: self.target_depth.min(2),
                max_breadth: fanout.max(15).min(25),
                ..self
            }
        } else if fanout < NARROW_FANOUT {
            Self {
                target_depth: (self.target_depth + 1).min(MAX_TARGET_DEPTH),
                max_breadth: fanout.max(8),
                ..self
            }
        } else {
            self
        }
    }
}

/// When breadth is recomputed during a walk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentMode {
    /// Only the root sample adjusts the strategy
    #[default]
    Once,
    /// Each level's breadth also follows the child counts of its first nodes
    PerLevel,
}

/// Breadth for one level under [`AdjustmentMode::PerLevel`]
///
/// `sample_counts` are the annotated child counts of (up to) the first three
/// frontier nodes.
pub fn level_breadth(max_breadth: usize, sample_counts: &[usize]) -> usize {
    let sample = &sample_counts[..sample_counts.len().min(3)];
    if sample.is_empty() {
        return max_breadth;
    }

    let average = sample.iter().sum::<usize>() as f64 / sample.len() as f64;
    if average > 15.0 {
        8
    } else if average < 3.0 {
        (max_breadth + 4).clamp(5, 12)
    } else {
        max_breadth
    }
}

/// What kind of root a walk starts at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootKind {
    /// A configured workspace-wide root
    Shared,
    /// The session user's own root
    User,
    Other,
}

/// Maps root ids to their [`RootKind`]
#[derive(Debug, Clone, Default)]
pub struct RootClassifier {
    shared_roots: HashSet<String>,
    user_root: Option<String>,
}

impl RootClassifier {
    pub fn new<I, S>(shared_roots: I, user_root: Option<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            shared_roots: shared_roots.into_iter().map(Into::into).collect(),
            user_root,
        }
    }

    pub fn classify(&self, root_id: &str) -> RootKind {
        if self.shared_roots.contains(root_id) {
            RootKind::Shared
        } else if self.user_root.as_deref() == Some(root_id) {
            RootKind::User
        } else {
            RootKind::Other
        }
    }

    pub fn strategy_for(&self, root_id: &str) -> TraversalStrategy {
        let priority = match self.classify(root_id) {
            RootKind::Shared => TraversalPriority::Breadth,
            RootKind::User => TraversalPriority::Balanced,
            RootKind::Other => TraversalPriority::Depth,
        };
        TraversalStrategy::for_priority(priority)
    }
}

#[cfg(test)]
#[path = "strategy_test.rs"]
mod strategy_test;
