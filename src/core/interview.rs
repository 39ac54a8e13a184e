//! Interview answers and selected insights.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Result of toggling an insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Toggle {
    /// The insight was added to the selection.
    Selected,
    /// The insight was removed from the selection.
    Deselected,
    /// Nothing changed.
    Unchanged,
}

/// Question→answer bindings plus the capped insight selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewTracker {
    answers: BTreeMap<String, String>,
    insights: Vec<String>,
}

impl InterviewTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an answer. The last answer for a question wins.
    ///
    /// Returns the answer it replaced.
    pub fn set_answer(&mut self, question_id: &str, answer_id: &str) -> Option<String> {
        self.answers
            .insert(question_id.to_string(), answer_id.to_string())
    }

    /// Answer recorded for a question.
    pub fn answer(&self, question_id: &str) -> Option<&str> {
        self.answers.get(question_id).map(String::as_str)
    }

    /// All answers, keyed by question id.
    pub fn answers(&self) -> &BTreeMap<String, String> {
        &self.answers
    }

    /// Number of answered questions.
    pub fn answer_count(&self) -> usize {
        self.answers.len()
    }

    /// Selected insight ids, in selection order.
    pub fn insights(&self) -> &[String] {
        &self.insights
    }

    /// Whether an insight is selected.
    pub fn is_selected(&self, insight_id: &str) -> bool {
        self.insights.iter().any(|i| i == insight_id)
    }

    /// Toggle an insight: remove if present, add if under `max`, else no-op.
    ///
    /// With `allow_removal` false a present insight stays selected.
    pub fn toggle_insight(&mut self, insight_id: &str, max: usize, allow_removal: bool) -> Toggle {
        if let Some(pos) = self.insights.iter().position(|i| i == insight_id) {
            if !allow_removal {
                return Toggle::Unchanged;
            }
            self.insights.remove(pos);
            return Toggle::Deselected;
        }

        if self.insights.len() < max {
            self.insights.push(insight_id.to_string());
            Toggle::Selected
        } else {
            Toggle::Unchanged
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_answer_wins() {
        let mut tracker = InterviewTracker::new();
        assert_eq!(tracker.set_answer("q1", "a"), None);
        assert_eq!(tracker.set_answer("q1", "b"), Some("a".to_string()));

        assert_eq!(tracker.answer("q1"), Some("b"));
        assert_eq!(tracker.answer_count(), 1);
    }

    #[test]
    fn test_toggle_adds_and_removes() {
        let mut tracker = InterviewTracker::new();
        assert_eq!(tracker.toggle_insight("i1", 2, true), Toggle::Selected);
        assert!(tracker.is_selected("i1"));
        assert_eq!(tracker.toggle_insight("i1", 2, true), Toggle::Deselected);
        assert!(!tracker.is_selected("i1"));
    }

    #[test]
    fn test_toggle_at_capacity_is_noop() {
        let mut tracker = InterviewTracker::new();
        tracker.toggle_insight("i1", 2, true);
        tracker.toggle_insight("i2", 2, true);

        assert_eq!(tracker.toggle_insight("i3", 2, true), Toggle::Unchanged);
        assert_eq!(tracker.insights(), &["i1".to_string(), "i2".to_string()]);
    }

    #[test]
    fn test_toggle_removal_blocked() {
        let mut tracker = InterviewTracker::new();
        tracker.toggle_insight("i1", 2, true);

        assert_eq!(tracker.toggle_insight("i1", 2, false), Toggle::Unchanged);
        assert!(tracker.is_selected("i1"));
    }

    #[test]
    fn test_toggle_with_zero_max() {
        let mut tracker = InterviewTracker::new();
        assert_eq!(tracker.toggle_insight("i1", 0, true), Toggle::Unchanged);
        assert!(tracker.insights().is_empty());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // Property: the selection never exceeds max and holds no duplicates
            #[test]
            fn prop_selection_bounded(
                toggles in proptest::collection::vec(0u8..6, 0..40),
                max in 0usize..4,
            ) {
                let mut tracker = InterviewTracker::new();
                for id in toggles {
                    let id = format!("i{}", id);
                    let was_selected = tracker.is_selected(&id);
                    let before = tracker.insights().to_vec();
                    let outcome = tracker.toggle_insight(&id, max, true);

                    prop_assert!(tracker.insights().len() <= max);
                    if was_selected {
                        prop_assert_eq!(outcome, Toggle::Deselected);
                        prop_assert!(!tracker.is_selected(&id));
                    } else if before.len() >= max {
                        prop_assert_eq!(outcome, Toggle::Unchanged);
                        prop_assert_eq!(tracker.insights(), before.as_slice());
                    }
                }
                let mut deduped = tracker.insights().to_vec();
                deduped.sort();
                deduped.dedup();
                prop_assert_eq!(deduped.len(), tracker.insights().len());
            }
        }
    }
}
