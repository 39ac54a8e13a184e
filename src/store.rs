//! The case store: the single owned context for one play session.
//!
//! `Casebook` owns the content, the rules, and the authoritative
//! [`CaseState`]. The presentation layer holds it (usually behind `&mut`)
//! and calls exactly one action per UI event. Each action runs to
//! completion before returning, and every read derives hypothesis, gates,
//! and tier from the live state.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::content::Content;
use crate::core::{
    format_clock, CaseState, Category, EventType, EvidenceCard, GateFlags, Stage, Toggle,
    TraceEvent, TrustTier,
};
use crate::error::{CasebookError, ReferenceKind, Result};

/// Result of a successful commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CommitOutcome {
    /// Leading hypothesis after the commit.
    pub hypothesis: Option<Category>,
    /// True when this commit consumed budget.
    pub newly_committed: bool,
    /// Committed cards after the commit.
    pub committed_count: usize,
}

/// Read-only view of everything the presentation layer shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseSnapshot {
    /// Cards with their current assignment.
    pub cards: Vec<EvidenceCard>,
    /// Committed card ids, in commit order.
    pub committed: Vec<String>,
    /// Number of committed cards.
    pub committed_count: usize,
    /// Leading hypothesis.
    pub hypothesis: Option<Category>,
    /// Display label for the hypothesis.
    pub hypothesis_label: Option<String>,
    /// Minutes left.
    pub clock_minutes: u32,
    /// Clock formatted as `H:MM`.
    pub clock: String,
    /// Trust score.
    pub trust: i32,
    /// Trust tier.
    pub trust_tier: TrustTier,
    /// Answers keyed by question id.
    pub answers: BTreeMap<String, String>,
    /// Selected insight ids.
    pub insights: Vec<String>,
    /// Whether the query has run.
    pub query_executed: bool,
    /// Gate flags.
    pub gates: GateFlags,
    /// Furthest unlocked stage.
    pub stage: Stage,
}

/// The case store.
#[derive(Debug, Clone)]
pub struct Casebook {
    content: Content,
    config: Config,
    state: CaseState,
    trace: Vec<TraceEvent>,
}

impl Casebook {
    /// Start a session from validated content and rules.
    pub fn new(content: Content, config: Config) -> Result<Self> {
        content.validate()?;
        config.validate()?;

        let state = CaseState::new(&content, &config);
        let mut casebook = Self {
            content,
            config,
            state,
            trace: Vec::new(),
        };
        casebook.record(
            EventType::SessionStart,
            Some(format!("{} cards", casebook.content.cards.len())),
        );
        info!(
            cards = casebook.content.cards.len(),
            questions = casebook.content.questions.len(),
            insights = casebook.content.insights.len(),
            "case session started"
        );
        Ok(casebook)
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Assign a category to an evidence card.
    ///
    /// The first commit of a card consumes one board slot and
    /// `commit_cost_minutes` of clock. Re-categorizing a committed card is
    /// free. A full board rejects new cards with `CapacityExceeded`; an id
    /// not in content is rejected with `UnknownReference`. Rejections leave
    /// the state untouched.
    pub fn commit(&mut self, card_id: &str, category: Category) -> Result<CommitOutcome> {
        let before = self.gates();
        let commitment = match self.state.board.commit(card_id, category) {
            Ok(commitment) => commitment,
            Err(err) => {
                warn!(card = card_id, %category, "commit rejected: {}", err);
                self.record(EventType::CommitRejected, Some(err.to_string()));
                return Err(err);
            }
        };

        if commitment.newly_committed {
            self.state
                .ledger
                .spend_time(self.config.ledger.commit_cost_minutes);
        }

        let outcome = CommitOutcome {
            hypothesis: self.hypothesis(),
            newly_committed: commitment.newly_committed,
            committed_count: self.state.board.committed_count(),
        };
        debug!(
            card = card_id,
            %category,
            previous = ?commitment.previous,
            newly_committed = outcome.newly_committed,
            committed = outcome.committed_count,
            hypothesis = ?outcome.hypothesis,
            "evidence committed"
        );
        let details = match commitment.previous {
            Some(previous) if previous != category => {
                format!("{} -> {} (was {})", card_id, category, previous)
            }
            _ => format!("{} -> {}", card_id, category),
        };
        self.record(EventType::EvidenceCommitted, Some(details));
        self.note_unlocks(before);
        Ok(outcome)
    }

    /// Run the records query. Idempotent.
    ///
    /// Returns true the first time.
    pub fn run_query(&mut self) -> bool {
        if self.state.milestones.query_executed {
            debug!("query already executed");
            return false;
        }
        let before = self.gates();
        self.state.milestones.query_executed = true;
        debug!("query executed");
        self.record(EventType::QueryExecuted, None);
        self.note_unlocks(before);
        true
    }

    /// Record an interview answer, replacing any earlier one.
    ///
    /// Ids are stored as given unless `validation.strict_references` is on.
    pub fn set_answer(&mut self, question_id: &str, answer_id: &str) -> Result<()> {
        if self.config.validation.strict_references {
            self.check_reference(ReferenceKind::Question, question_id)?;
            if self.content.choice(question_id, answer_id).is_none() {
                return Err(self.reject(ReferenceKind::Choice, answer_id));
            }
        }

        let before = self.gates();
        let replaced = self.state.interview.set_answer(question_id, answer_id);
        debug!(
            question = question_id,
            answer = answer_id,
            replaced = ?replaced,
            "answer recorded"
        );
        self.record(
            EventType::AnswerRecorded,
            Some(format!("{} = {}", question_id, answer_id)),
        );
        self.note_unlocks(before);
        Ok(())
    }

    /// Answer a question with one of its content choices and apply the
    /// choice's time and trust effect.
    ///
    /// Unknown questions or choices are always rejected.
    pub fn choose_answer(&mut self, question_id: &str, choice_id: &str) -> Result<()> {
        if !self.content.has_question(question_id) {
            return Err(self.reject(ReferenceKind::Question, question_id));
        }
        let Some(choice) = self.content.choice(question_id, choice_id).cloned() else {
            return Err(self.reject(ReferenceKind::Choice, choice_id));
        };

        self.set_answer(question_id, choice_id)?;
        self.apply_choice_effect(choice.time_cost, choice.trust_delta);
        Ok(())
    }

    /// Spend `time_cost` minutes and shift trust by `trust_delta` times the
    /// configured multiplier.
    pub fn apply_choice_effect(&mut self, time_cost: u32, trust_delta: i32) {
        let previous_tier = self.trust_tier();
        self.state.ledger.apply_choice_effect(
            time_cost,
            trust_delta,
            self.config.ledger.trust_multiplier,
        );
        let tier = self.trust_tier();
        debug!(
            time_cost,
            trust_delta,
            clock = self.state.ledger.clock_minutes(),
            trust = self.state.ledger.trust(),
            ?tier,
            "choice effect applied"
        );
        if tier != previous_tier {
            info!(from = ?previous_tier, to = ?tier, "trust tier changed");
        }
        self.record(
            EventType::ChoiceEffectApplied,
            Some(format!("time -{} trust {:+}", time_cost, trust_delta)),
        );
    }

    /// Toggle an insight in or out of the selection.
    ///
    /// `max` defaults to `interview.max_insights`. Toggling a selected id
    /// removes it only while the synthesis gate is closed. Once that gate is
    /// open the selection is sealed: removals return `Toggle::Unchanged` so
    /// the gate cannot close again, and additions under the cap still apply.
    /// `reset` lifts the seal.
    pub fn toggle_insight(&mut self, insight_id: &str, max: Option<usize>) -> Result<Toggle> {
        if self.config.validation.strict_references {
            self.check_reference(ReferenceKind::Insight, insight_id)?;
        }

        let before = self.gates();
        let max = max.unwrap_or(self.config.interview.max_insights);
        let outcome = self
            .state
            .interview
            .toggle_insight(insight_id, max, !before.synthesis);
        debug!(insight = insight_id, max, ?outcome, "insight toggled");
        if outcome != Toggle::Unchanged {
            self.record(
                EventType::InsightToggled,
                Some(format!("{} {:?}", insight_id, outcome)),
            );
        }
        self.note_unlocks(before);
        Ok(outcome)
    }

    /// Restore the starting state.
    ///
    /// The fresh state is built in full and swapped in with one assignment.
    /// The trace is kept and records the reset.
    pub fn reset(&mut self) {
        self.state = CaseState::new(&self.content, &self.config);
        info!("case reset");
        self.record(EventType::Reset, None);
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// The loaded content.
    pub fn content(&self) -> &Content {
        &self.content
    }

    /// The active rules.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The authoritative state.
    pub fn state(&self) -> &CaseState {
        &self.state
    }

    /// Cards with their current assignment.
    pub fn cards(&self) -> &[EvidenceCard] {
        self.state.board.cards()
    }

    /// Find a card by id.
    pub fn card(&self, id: &str) -> Option<&EvidenceCard> {
        self.state.board.card(id)
    }

    /// Committed card ids, in commit order.
    pub fn committed(&self) -> &[String] {
        self.state.board.committed()
    }

    /// Number of committed cards.
    pub fn committed_count(&self) -> usize {
        self.state.board.committed_count()
    }

    /// Leading hypothesis.
    pub fn hypothesis(&self) -> Option<Category> {
        self.state.board.hypothesis()
    }

    /// Display label for the leading hypothesis.
    pub fn hypothesis_label(&self) -> Option<&'static str> {
        self.hypothesis().map(|c| c.hypothesis_label())
    }

    /// Minutes left on the clock.
    pub fn clock_minutes(&self) -> u32 {
        self.state.ledger.clock_minutes()
    }

    /// Trust score.
    pub fn trust(&self) -> i32 {
        self.state.ledger.trust()
    }

    /// Trust tier.
    pub fn trust_tier(&self) -> TrustTier {
        self.state.ledger.trust_tier(&self.config.ledger)
    }

    /// Answers keyed by question id.
    pub fn answers(&self) -> &BTreeMap<String, String> {
        self.state.interview.answers()
    }

    /// Answer recorded for a question.
    pub fn answer(&self, question_id: &str) -> Option<&str> {
        self.state.interview.answer(question_id)
    }

    /// Selected insight ids.
    pub fn selected_insights(&self) -> &[String] {
        self.state.interview.insights()
    }

    /// Whether the query has run.
    pub fn query_executed(&self) -> bool {
        self.state.milestones.query_executed
    }

    /// Current gate flags.
    pub fn gates(&self) -> GateFlags {
        self.state.gates(&self.config)
    }

    /// Furthest unlocked stage.
    pub fn stage(&self) -> Stage {
        self.gates().stage()
    }

    /// Action trace since the session started.
    pub fn trace(&self) -> &[TraceEvent] {
        &self.trace
    }

    /// Snapshot of every readable field.
    pub fn snapshot(&self) -> CaseSnapshot {
        let gates = self.gates();
        let hypothesis = self.hypothesis();
        CaseSnapshot {
            cards: self.cards().to_vec(),
            committed: self.committed().to_vec(),
            committed_count: self.committed_count(),
            hypothesis,
            hypothesis_label: hypothesis.map(|c| c.hypothesis_label().to_string()),
            clock_minutes: self.clock_minutes(),
            clock: format_clock(self.clock_minutes()),
            trust: self.trust(),
            trust_tier: self.trust_tier(),
            answers: self.answers().clone(),
            insights: self.selected_insights().to_vec(),
            query_executed: self.query_executed(),
            gates,
            stage: gates.stage(),
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn check_reference(&mut self, kind: ReferenceKind, id: &str) -> Result<()> {
        let known = match kind {
            ReferenceKind::Card => self.content.has_card(id),
            ReferenceKind::Question => self.content.has_question(id),
            ReferenceKind::Insight => self.content.has_insight(id),
            ReferenceKind::Choice => true,
        };
        if known {
            Ok(())
        } else {
            Err(self.reject(kind, id))
        }
    }

    fn reject(&mut self, kind: ReferenceKind, id: &str) -> CasebookError {
        let err = CasebookError::unknown(kind, id);
        warn!("action rejected: {}", err);
        self.record(EventType::ReferenceRejected, Some(err.to_string()));
        err
    }

    fn note_unlocks(&mut self, before: GateFlags) {
        let after = self.gates();
        if after.unlocked_count() > before.unlocked_count() {
            let stage = after.stage();
            info!(?stage, "stage unlocked");
            self.record(EventType::GateUnlocked, Some(format!("{:?}", stage)));
        }
    }

    fn record(&mut self, event_type: EventType, details: Option<String>) {
        self.trace.push(TraceEvent::new(event_type, details));
    }
}
