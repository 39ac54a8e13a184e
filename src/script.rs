//! Action scripts: a line-based encoding of store actions.
//!
//! One action per line; blank lines and `#` comments are ignored. A `#`
//! starts a comment only at the start of a line or after whitespace.
//!
//! ```text
//! commit <card> <human|systemic|external>
//! query
//! answer <question> <answer>
//! choose <question> <choice>
//! effect <minutes> <trust-delta>
//! toggle <insight> [max]
//! reset
//! ```

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::core::{Category, Toggle};
use crate::error::{CasebookError, Result};
use crate::store::Casebook;

/// One store action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Assign a category to a card.
    Commit { card_id: String, category: Category },
    /// Run the records query.
    Query,
    /// Record a raw answer id.
    Answer {
        question_id: String,
        answer_id: String,
    },
    /// Answer with a content choice and apply its effect.
    Choose {
        question_id: String,
        choice_id: String,
    },
    /// Apply a time/trust effect directly.
    Effect { time_cost: u32, trust_delta: i32 },
    /// Toggle an insight.
    Toggle {
        insight_id: String,
        max: Option<usize>,
    },
    /// Restore the starting state.
    Reset,
}

impl Action {
    /// Run this action against the store and describe what happened.
    pub fn apply(&self, book: &mut Casebook) -> Result<String> {
        match self {
            Action::Commit { card_id, category } => {
                let outcome = book.commit(card_id, *category)?;
                let hypothesis = outcome
                    .hypothesis
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "none".to_string());
                Ok(format!(
                    "committed {} as {} ({} committed, hypothesis: {})",
                    card_id, category, outcome.committed_count, hypothesis
                ))
            }
            Action::Query => {
                if book.run_query() {
                    Ok("query executed".to_string())
                } else {
                    Ok("query already executed".to_string())
                }
            }
            Action::Answer {
                question_id,
                answer_id,
            } => {
                book.set_answer(question_id, answer_id)?;
                Ok(format!("answered {} with {}", question_id, answer_id))
            }
            Action::Choose {
                question_id,
                choice_id,
            } => {
                book.choose_answer(question_id, choice_id)?;
                Ok(format!(
                    "chose {} for {} (trust {}, clock {})",
                    choice_id,
                    question_id,
                    book.trust(),
                    book.clock_minutes()
                ))
            }
            Action::Effect {
                time_cost,
                trust_delta,
            } => {
                book.apply_choice_effect(*time_cost, *trust_delta);
                Ok(format!(
                    "effect applied (trust {}, clock {})",
                    book.trust(),
                    book.clock_minutes()
                ))
            }
            Action::Toggle { insight_id, max } => {
                let outcome = book.toggle_insight(insight_id, *max)?;
                let verb = match outcome {
                    Toggle::Selected => "selected",
                    Toggle::Deselected => "deselected",
                    Toggle::Unchanged => "left unchanged",
                };
                Ok(format!("insight {} {}", insight_id, verb))
            }
            Action::Reset => {
                book.reset();
                Ok("case reset".to_string())
            }
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Commit { card_id, category } => {
                write!(f, "commit {} {}", card_id, category.display_name().to_lowercase())
            }
            Action::Query => f.write_str("query"),
            Action::Answer {
                question_id,
                answer_id,
            } => write!(f, "answer {} {}", question_id, answer_id),
            Action::Choose {
                question_id,
                choice_id,
            } => write!(f, "choose {} {}", question_id, choice_id),
            Action::Effect {
                time_cost,
                trust_delta,
            } => write!(f, "effect {} {}", time_cost, trust_delta),
            Action::Toggle {
                insight_id,
                max: Some(max),
            } => write!(f, "toggle {} {}", insight_id, max),
            Action::Toggle {
                insight_id,
                max: None,
            } => write!(f, "toggle {}", insight_id),
            Action::Reset => f.write_str("reset"),
        }
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(line: &str) -> std::result::Result<Self, Self::Err> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&verb, args)) = words.split_first() else {
            return Err("empty action".to_string());
        };

        let action = match (verb, args) {
            ("commit", [card, category]) => Action::Commit {
                card_id: card.to_string(),
                category: category.parse()?,
            },
            ("query", []) => Action::Query,
            ("answer", [question, answer]) => Action::Answer {
                question_id: question.to_string(),
                answer_id: answer.to_string(),
            },
            ("choose", [question, choice]) => Action::Choose {
                question_id: question.to_string(),
                choice_id: choice.to_string(),
            },
            ("effect", [minutes, delta]) => Action::Effect {
                time_cost: minutes
                    .parse()
                    .map_err(|_| format!("invalid minutes '{}'", minutes))?,
                trust_delta: delta
                    .parse()
                    .map_err(|_| format!("invalid trust delta '{}'", delta))?,
            },
            ("toggle", [insight]) => Action::Toggle {
                insight_id: insight.to_string(),
                max: None,
            },
            ("toggle", [insight, max]) => Action::Toggle {
                insight_id: insight.to_string(),
                max: Some(max.parse().map_err(|_| format!("invalid max '{}'", max))?),
            },
            ("reset", []) => Action::Reset,
            ("commit" | "query" | "answer" | "choose" | "effect" | "toggle" | "reset", _) => {
                return Err(format!("wrong number of arguments for '{}'", verb));
            }
            (other, _) => return Err(format!("unknown action '{}'", other)),
        };
        Ok(action)
    }
}

/// A parsed action with its 1-based source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLine {
    /// Line number in the script.
    pub line: usize,
    /// The action on that line.
    pub action: Action,
}

/// Parse a whole script. Fails on the first malformed line.
pub fn parse_script(text: &str) -> Result<Vec<ScriptLine>> {
    let mut lines = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let content = strip_comment(raw).trim();
        if content.is_empty() {
            continue;
        }
        let action = content
            .parse::<Action>()
            .map_err(|message| CasebookError::script(line, message))?;
        lines.push(ScriptLine { line, action });
    }
    Ok(lines)
}

/// Drop a trailing comment. `#` starts a comment only at the start of a line
/// or after whitespace, so ids may contain it.
fn strip_comment(raw: &str) -> &str {
    let mut prev_is_space = true;
    for (index, ch) in raw.char_indices() {
        if ch == '#' && prev_is_space {
            return &raw[..index];
        }
        prev_is_space = ch.is_whitespace();
    }
    raw
}
