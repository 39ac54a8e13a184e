//! Progression gates.
//!
//! Four unlock conditions, each the previous gate plus one local threshold.
//! Gates are never stored; [`GateFlags::evaluate`] derives them from counts
//! and milestones every time they are read.

use serde::{Deserialize, Serialize};

use crate::config::ProgressionConfig;

/// One-shot progress flags.
///
/// Each flag starts false, is set by a single action, and only returns to
/// false on reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestones {
    /// The records query has been run.
    pub query_executed: bool,
}

/// Counts and flags the gates are computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateInputs {
    /// Committed evidence cards.
    pub committed: usize,
    /// Evidence commit capacity.
    pub capacity: usize,
    /// One-shot flags.
    pub milestones: Milestones,
    /// Answered questions.
    pub answers: usize,
    /// Selected insights.
    pub insights: usize,
}

/// The four unlock booleans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateFlags {
    /// Evidence board is full.
    pub evidence: bool,
    /// Evidence done and the query has run.
    pub query: bool,
    /// Query done and enough questions answered.
    pub interviews: bool,
    /// Interviews done and enough insights selected.
    pub synthesis: bool,
}

impl GateFlags {
    /// Evaluate the gates for the given inputs.
    pub fn evaluate(inputs: &GateInputs, thresholds: &ProgressionConfig) -> Self {
        let evidence = inputs.committed >= inputs.capacity;
        let query = evidence && inputs.milestones.query_executed;
        let interviews = query && inputs.answers >= thresholds.min_answers;
        let synthesis = interviews && inputs.insights >= thresholds.min_insights;
        Self {
            evidence,
            query,
            interviews,
            synthesis,
        }
    }

    /// Gates as an array, in order.
    pub fn as_array(&self) -> [bool; 4] {
        [self.evidence, self.query, self.interviews, self.synthesis]
    }

    /// Number of gates passed.
    pub fn unlocked_count(&self) -> usize {
        self.as_array().iter().take_while(|&&open| open).count()
    }

    /// Furthest stage the player may enter.
    pub fn stage(&self) -> Stage {
        match self.unlocked_count() {
            0 => Stage::Evidence,
            1 => Stage::Query,
            2 => Stage::Interviews,
            3 => Stage::Synthesis,
            _ => Stage::Debrief,
        }
    }

    /// True when every gate in `self` is also open in `later`.
    pub fn is_subset_of(&self, later: &GateFlags) -> bool {
        self.as_array()
            .iter()
            .zip(later.as_array())
            .all(|(&before, after)| !before || after)
    }
}

/// Progression stages, each unlocked by the gate before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Sorting evidence.
    Evidence,
    /// Running the records query.
    Query,
    /// Interviewing witnesses.
    Interviews,
    /// Choosing insights.
    Synthesis,
    /// Case wrap-up.
    Debrief,
}
