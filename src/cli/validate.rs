//! Validate command for Casebook.
//!
//! Loads a content file and reports whether it is usable.

use std::path::Path;

use serde::Serialize;

use crate::content::Content;
use crate::error::exit_codes;

/// Options for the validate command.
#[derive(Debug, Clone, Default)]
pub struct ValidateOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the validate command.
#[derive(Debug, Clone, Serialize)]
pub struct ValidateOutput {
    /// Whether the content is valid.
    pub valid: bool,
    /// Number of evidence cards.
    pub cards: usize,
    /// Number of interview questions.
    pub questions: usize,
    /// Number of insights.
    pub insights: usize,
    /// Error message if validation failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidateOutput {
    /// Process exit code: failure when the content is invalid.
    pub fn exit_code(&self) -> u8 {
        if self.valid {
            exit_codes::SUCCESS
        } else {
            exit_codes::FAILURE
        }
    }

    /// Create a successful output.
    pub fn valid(content: &Content) -> Self {
        Self {
            valid: true,
            cards: content.cards.len(),
            questions: content.questions.len(),
            insights: content.insights.len(),
            error: None,
        }
    }

    /// Create a failed output.
    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            cards: 0,
            questions: 0,
            insights: 0,
            error: Some(error.into()),
        }
    }
}

/// The validate command implementation.
#[derive(Debug, Default)]
pub struct ValidateCommand;

impl ValidateCommand {
    /// Create a new validate command.
    pub fn new() -> Self {
        Self
    }

    /// Validate the content file at `path`.
    pub fn run(&self, path: &Path) -> ValidateOutput {
        match Content::load(path) {
            Ok(content) => ValidateOutput::valid(&content),
            Err(err) => ValidateOutput::invalid(err.to_string()),
        }
    }

    /// Format the output based on options.
    pub fn format_output(&self, output: &ValidateOutput, options: &ValidateOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else if output.valid {
            format!(
                "Content OK: {} cards, {} questions, {} insights\n",
                output.cards, output.questions, output.insights
            )
        } else {
            format!(
                "Content invalid: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            )
        }
    }
}
