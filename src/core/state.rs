//! Case state and trace types.
//!
//! `CaseState` holds every authoritative field of a session: the evidence
//! board, the resource ledger, the interview tracker, and the one-shot
//! milestones. Everything else (hypothesis, gates, tier, counts) is derived
//! from it on read. The trace is kept beside the state, not inside it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::evidence::EvidenceBoard;
use super::gate::{GateFlags, GateInputs, Milestones};
use super::interview::InterviewTracker;
use super::ledger::ResourceLedger;
use crate::config::Config;
use crate::content::Content;

/// Authoritative state of one case session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseState {
    /// Evidence cards and commitments.
    pub board: EvidenceBoard,
    /// Clock and trust.
    pub ledger: ResourceLedger,
    /// Interview answers and selected insights.
    pub interview: InterviewTracker,
    /// One-shot progress flags.
    pub milestones: Milestones,
}

impl CaseState {
    /// Build the starting state for the given content and rules.
    pub fn new(content: &Content, config: &Config) -> Self {
        Self {
            board: EvidenceBoard::new(&content.cards, config.evidence.commit_capacity),
            ledger: ResourceLedger::new(&config.ledger),
            interview: InterviewTracker::new(),
            milestones: Milestones::default(),
        }
    }

    /// Counts and flags the gates read.
    pub fn gate_inputs(&self) -> GateInputs {
        GateInputs {
            committed: self.board.committed_count(),
            capacity: self.board.capacity(),
            milestones: self.milestones,
            answers: self.interview.answer_count(),
            insights: self.interview.insights().len(),
        }
    }

    /// Current gate flags.
    pub fn gates(&self, config: &Config) -> GateFlags {
        GateFlags::evaluate(&self.gate_inputs(), &config.progression)
    }
}

/// Individual trace event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TraceEvent {
    /// Type of event.
    pub event_type: EventType,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// Optional details.
    pub details: Option<String>,
}

impl TraceEvent {
    /// Create a new trace event.
    pub fn new(event_type: EventType, details: Option<String>) -> Self {
        Self {
            event_type,
            timestamp: Utc::now(),
            details,
        }
    }
}

/// Event type enum for trace events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// Session constructed.
    SessionStart,
    /// Card committed or re-categorized.
    EvidenceCommitted,
    /// Commit refused (full board or unknown card).
    CommitRejected,
    /// Records query run.
    QueryExecuted,
    /// Interview answer recorded.
    AnswerRecorded,
    /// Choice effect applied to the ledger.
    ChoiceEffectApplied,
    /// Insight selection changed.
    InsightToggled,
    /// Action refused for an unknown id.
    ReferenceRejected,
    /// A new gate opened.
    GateUnlocked,
    /// State restored to its starting snapshot.
    Reset,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::CardSpec;
    use crate::core::Category;

    fn content() -> Content {
        Content::new()
            .with_card(CardSpec::new("a", "A"))
            .with_card(CardSpec::new("b", "B"))
            .with_card(CardSpec::new("c", "C"))
    }

    #[test]
    fn test_new_state() {
        let config = Config::default();
        let state = CaseState::new(&content(), &config);

        assert_eq!(state.board.cards().len(), 3);
        assert_eq!(state.ledger.clock_minutes(), 120);
        assert_eq!(state.interview.answer_count(), 0);
        assert!(!state.milestones.query_executed);
        assert_eq!(state.gates(&config), GateFlags::default());
    }

    #[test]
    fn test_gate_inputs_track_state() {
        let config = Config::default();
        let mut state = CaseState::new(&content(), &config);
        state.board.commit("a", Category::Human).unwrap();
        state.interview.set_answer("q1", "x");
        state.milestones.query_executed = true;

        let inputs = state.gate_inputs();
        assert_eq!(inputs.committed, 1);
        assert_eq!(inputs.capacity, 3);
        assert_eq!(inputs.answers, 1);
        assert!(inputs.milestones.query_executed);
    }

    #[test]
    fn test_trace_event_new() {
        let event = TraceEvent::new(EventType::Reset, Some("manual".to_string()));
        assert_eq!(event.event_type, EventType::Reset);
        assert_eq!(event.details.as_deref(), Some("manual"));
    }

    #[test]
    fn test_event_type_serde() {
        let json = serde_json::to_string(&EventType::GateUnlocked).unwrap();
        assert_eq!(json, "\"gate_unlocked\"");
    }
}
