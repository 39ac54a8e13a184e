//! Static case content: evidence cards, interview questions, insights.
//!
//! Content is supplied once when a session starts and never mutated by the
//! engine. It is usually authored as JSON:
//!
//! ```json
//! {
//!   "cards": [{ "id": "log", "text": "Shift log", "hint": "Check the times", "category_hint": "systemic" }],
//!   "questions": [{ "id": "q1", "header": "Who was on duty?",
//!                   "choices": [{ "id": "a", "text": "Ask directly", "time_cost": 5, "trust_delta": -1 }] }],
//!   "insights": [{ "id": "i1", "text": "Handover was rushed" }]
//! }
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::Category;
use crate::error::{CasebookError, Result};

/// Static definition of an evidence card.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardSpec {
    /// Stable unique identifier.
    pub id: String,
    /// Display text.
    pub text: String,
    /// Hint shown alongside the card.
    #[serde(default)]
    pub hint: String,
    /// Suggested category. Informational only; never applied automatically.
    #[serde(default)]
    pub category_hint: Option<Category>,
}

impl CardSpec {
    /// Create a card definition with no hint.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            hint: String::new(),
            category_hint: None,
        }
    }

    /// Set the hint text.
    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = hint.into();
        self
    }

    /// Set the suggested category.
    #[must_use]
    pub fn with_category_hint(mut self, category: Category) -> Self {
        self.category_hint = Some(category);
        self
    }
}

/// One answer option for an interview question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Choice {
    /// Identifier, unique within its question.
    pub id: String,
    /// Display text.
    pub text: String,
    /// Minutes spent when this choice is taken.
    #[serde(default)]
    pub time_cost: u32,
    /// Trust adjustment before the multiplier is applied.
    #[serde(default)]
    pub trust_delta: i32,
}

impl Choice {
    /// Create a choice.
    pub fn new(id: impl Into<String>, text: impl Into<String>, time_cost: u32, trust_delta: i32) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            time_cost,
            trust_delta,
        }
    }
}

/// Interview question with ordered choices.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Question {
    /// Stable unique identifier.
    pub id: String,
    /// Header text.
    pub header: String,
    /// Answer options, in display order.
    pub choices: Vec<Choice>,
}

impl Question {
    /// Create a question with no choices.
    pub fn new(id: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            header: header.into(),
            choices: Vec::new(),
        }
    }

    /// Append a choice.
    #[must_use]
    pub fn with_choice(mut self, choice: Choice) -> Self {
        self.choices.push(choice);
        self
    }

    /// Find a choice by id.
    pub fn choice(&self, id: &str) -> Option<&Choice> {
        self.choices.iter().find(|c| c.id == id)
    }
}

/// Insight the player can select during synthesis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Insight {
    /// Stable unique identifier.
    pub id: String,
    /// Display text.
    pub text: String,
}

impl Insight {
    /// Create an insight.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// All static content for one case.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Content {
    /// Evidence cards, in board order.
    pub cards: Vec<CardSpec>,
    /// Interview questions, in display order.
    pub questions: Vec<Question>,
    /// Selectable insights.
    pub insights: Vec<Insight>,
}

impl Content {
    /// Create empty content.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a card (builder pattern).
    #[must_use]
    pub fn with_card(mut self, card: CardSpec) -> Self {
        self.cards.push(card);
        self
    }

    /// Add a question (builder pattern).
    #[must_use]
    pub fn with_question(mut self, question: Question) -> Self {
        self.questions.push(question);
        self
    }

    /// Add an insight (builder pattern).
    #[must_use]
    pub fn with_insight(mut self, insight: Insight) -> Self {
        self.insights.push(insight);
        self
    }

    /// Parse and validate content from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let content: Content = serde_json::from_str(json)?;
        content.validate()?;
        Ok(content)
    }

    /// Read, parse, and validate content from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|e| CasebookError::storage(path, e))?;
        Self::from_json(&json)
    }

    /// Check structural integrity.
    ///
    /// Rejects duplicate card, question, insight, or choice ids, and
    /// questions without any choices.
    pub fn validate(&self) -> Result<()> {
        check_unique("card", self.cards.iter().map(|c| c.id.as_str()))?;
        check_unique("question", self.questions.iter().map(|q| q.id.as_str()))?;
        check_unique("insight", self.insights.iter().map(|i| i.id.as_str()))?;

        for question in &self.questions {
            if question.choices.is_empty() {
                return Err(CasebookError::content(format!(
                    "question '{}' has no choices",
                    question.id
                )));
            }
            check_unique(
                &format!("choice in question '{}'", question.id),
                question.choices.iter().map(|c| c.id.as_str()),
            )?;
        }

        Ok(())
    }

    /// Find a card by id.
    pub fn card(&self, id: &str) -> Option<&CardSpec> {
        self.cards.iter().find(|c| c.id == id)
    }

    /// Find a question by id.
    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Find a choice within a question.
    pub fn choice(&self, question_id: &str, choice_id: &str) -> Option<&Choice> {
        self.question(question_id)?.choice(choice_id)
    }

    /// Find an insight by id.
    pub fn insight(&self, id: &str) -> Option<&Insight> {
        self.insights.iter().find(|i| i.id == id)
    }

    /// Check whether a card id exists.
    pub fn has_card(&self, id: &str) -> bool {
        self.card(id).is_some()
    }

    /// Check whether a question id exists.
    pub fn has_question(&self, id: &str) -> bool {
        self.question(id).is_some()
    }

    /// Check whether an insight id exists.
    pub fn has_insight(&self, id: &str) -> bool {
        self.insight(id).is_some()
    }
}

fn check_unique<'a>(kind: &str, ids: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if id.is_empty() {
            return Err(CasebookError::content(format!("empty {} id", kind)));
        }
        if !seen.insert(id) {
            return Err(CasebookError::content(format!("duplicate {} id '{}'", kind, id)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sample() -> Content {
        Content::new()
            .with_card(CardSpec::new("log", "Shift log").with_category_hint(Category::Systemic))
            .with_card(CardSpec::new("badge", "Badge record"))
            .with_question(
                Question::new("q1", "Who was on duty?")
                    .with_choice(Choice::new("a", "Ask directly", 5, -1))
                    .with_choice(Choice::new("b", "Check the roster", 10, 1)),
            )
            .with_insight(Insight::new("i1", "Handover was rushed"))
    }

    #[test]
    fn test_lookups() {
        let content = sample();

        assert!(content.has_card("log"));
        assert!(!content.has_card("missing"));
        assert_eq!(content.card("log").unwrap().category_hint, Some(Category::Systemic));
        assert!(content.has_question("q1"));
        assert_eq!(content.choice("q1", "b").unwrap().time_cost, 10);
        assert!(content.choice("q1", "z").is_none());
        assert!(content.choice("q9", "a").is_none());
        assert!(content.has_insight("i1"));
    }

    #[test]
    fn test_validate_accepts_sample() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicate_card() {
        let content = sample().with_card(CardSpec::new("log", "Another log"));
        let err = content.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate card id 'log'"));
    }

    #[test]
    fn test_validate_rejects_question_without_choices() {
        let content = sample().with_question(Question::new("q2", "Empty"));
        let err = content.validate().unwrap_err();
        assert!(err.to_string().contains("has no choices"));
    }

    #[test]
    fn test_validate_rejects_duplicate_choice() {
        let content = sample().with_question(
            Question::new("q2", "Twice")
                .with_choice(Choice::new("a", "One", 0, 0))
                .with_choice(Choice::new("a", "Two", 0, 0)),
        );
        assert!(matches!(content.validate(), Err(CasebookError::Content { .. })));
    }

    #[test]
    fn test_from_json_defaults_optional_fields() {
        let json = r#"{
            "cards": [{ "id": "c1", "text": "Receipt" }],
            "questions": [{ "id": "q1", "header": "Why?", "choices": [{ "id": "a", "text": "Because" }] }]
        }"#;
        let content = Content::from_json(json).unwrap();

        assert_eq!(content.cards[0].hint, "");
        assert_eq!(content.cards[0].category_hint, None);
        assert_eq!(content.questions[0].choices[0].time_cost, 0);
        assert_eq!(content.questions[0].choices[0].trust_delta, 0);
        assert!(content.insights.is_empty());
    }

    #[test]
    fn test_from_json_rejects_invalid_content() {
        let json = r#"{ "cards": [{ "id": "c1", "text": "A" }, { "id": "c1", "text": "B" }] }"#;
        assert!(matches!(Content::from_json(json), Err(CasebookError::Content { .. })));
    }

    #[test]
    fn test_from_json_rejects_malformed_json() {
        assert!(matches!(Content::from_json("{ nope"), Err(CasebookError::Serde { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        let json = serde_json::to_string(&sample()).unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let content = Content::load(file.path()).unwrap();
        assert_eq!(content, sample());
    }

    #[test]
    fn test_load_missing_file() {
        let result = Content::load(Path::new("/nonexistent/content.json"));
        assert!(matches!(result, Err(CasebookError::Storage { .. })));
    }
}
