//! Run command for Casebook.
//!
//! Replays an action script against a fresh session and reports each step
//! plus the final snapshot. Rejected actions are reported and the replay
//! continues, exactly as a UI would keep running after a refused click.

use std::fmt::Write as _;

use serde::Serialize;

use crate::config::Config;
use crate::content::Content;
use crate::error::exit_codes;
use crate::script::parse_script;
use crate::store::{CaseSnapshot, Casebook};

/// Options for the run command.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Report for one script line.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    /// Line number in the script.
    pub line: usize,
    /// The action as written.
    pub action: String,
    /// Whether the store accepted it.
    pub ok: bool,
    /// What happened, or why it was rejected.
    pub message: String,
}

/// Output format for the run command.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutput {
    /// True when the session started and every step was accepted.
    pub success: bool,
    /// Per-line reports.
    pub steps: Vec<StepReport>,
    /// Final state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<CaseSnapshot>,
    /// Error message if the replay could not start.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunOutput {
    /// Process exit code: failure when any step was rejected or the replay
    /// could not start.
    pub fn exit_code(&self) -> u8 {
        if self.success {
            exit_codes::SUCCESS
        } else {
            exit_codes::FAILURE
        }
    }

    /// Create a failed output.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            steps: Vec::new(),
            snapshot: None,
            error: Some(error.into()),
        }
    }
}

/// The run command implementation.
pub struct RunCommand {
    config: Config,
}

impl RunCommand {
    /// Create a new run command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Replay `script` against a fresh session built from `content`.
    pub fn run(&self, content: Content, script: &str) -> RunOutput {
        let lines = match parse_script(script) {
            Ok(lines) => lines,
            Err(err) => return RunOutput::failure(err.to_string()),
        };
        let mut book = match Casebook::new(content, self.config.clone()) {
            Ok(book) => book,
            Err(err) => return RunOutput::failure(err.to_string()),
        };

        let mut steps = Vec::with_capacity(lines.len());
        for script_line in &lines {
            let (ok, message) = match script_line.action.apply(&mut book) {
                Ok(message) => (true, message),
                Err(err) => (false, err.to_string()),
            };
            steps.push(StepReport {
                line: script_line.line,
                action: script_line.action.to_string(),
                ok,
                message,
            });
        }

        RunOutput {
            success: steps.iter().all(|s| s.ok),
            steps,
            snapshot: Some(book.snapshot()),
            error: None,
        }
    }

    /// Format the output based on options.
    pub fn format_output(&self, output: &RunOutput, options: &RunOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    /// Format output as human-readable text.
    fn format_human_readable(&self, output: &RunOutput) -> String {
        if let Some(error) = &output.error {
            return format!("Run failed: {}\n", error);
        }

        let mut text = String::new();
        for step in &output.steps {
            let marker = if step.ok { "ok " } else { "ERR" };
            let _ = writeln!(
                text,
                "{:>4} {} {:<28} {}",
                step.line, marker, step.action, step.message
            );
        }

        if let Some(snapshot) = &output.snapshot {
            if !output.steps.is_empty() {
                text.push('\n');
            }
            let _ = writeln!(text, "Stage:      {:?}", snapshot.stage);
            let _ = writeln!(
                text,
                "Evidence:   {} committed [{}]",
                snapshot.committed_count,
                snapshot.committed.join(", ")
            );
            let _ = writeln!(
                text,
                "Hypothesis: {}",
                snapshot.hypothesis_label.as_deref().unwrap_or("undecided")
            );
            let _ = writeln!(text, "Clock:      {}", snapshot.clock);
            let _ = writeln!(
                text,
                "Trust:      {} ({:?})",
                snapshot.trust, snapshot.trust_tier
            );
            let _ = writeln!(text, "Answers:    {}", snapshot.answers.len());
            let _ = writeln!(text, "Insights:   [{}]", snapshot.insights.join(", "));
            let gates = snapshot.gates;
            let _ = writeln!(
                text,
                "Gates:      evidence={} query={} interviews={} synthesis={}",
                gates.evidence, gates.query, gates.interviews, gates.synthesis
            );
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{CardSpec, Choice, Insight, Question};
    use crate::core::Stage;

    fn content() -> Content {
        Content::new()
            .with_card(CardSpec::new("a", "A"))
            .with_card(CardSpec::new("b", "B"))
            .with_card(CardSpec::new("c", "C"))
            .with_card(CardSpec::new("d", "D"))
            .with_question(Question::new("q1", "One").with_choice(Choice::new("x", "X", 5, 1)))
            .with_question(Question::new("q2", "Two").with_choice(Choice::new("y", "Y", 5, -1)))
            .with_insight(Insight::new("i1", "First"))
            .with_insight(Insight::new("i2", "Second"))
    }

    #[test]
    fn test_full_replay() {
        let script = "\
commit a human
commit b human
commit c systemic
query
choose q1 x
choose q2 y
toggle i1
toggle i2
";
        let cmd = RunCommand::new(Config::default());
        let output = cmd.run(content(), script);

        assert!(output.success);
        assert_eq!(output.exit_code(), exit_codes::SUCCESS);
        assert_eq!(output.steps.len(), 8);
        let snapshot = output.snapshot.unwrap();
        assert_eq!(snapshot.stage, Stage::Debrief);
        assert_eq!(snapshot.clock_minutes, 80);
        assert_eq!(snapshot.trust, 50);
    }

    #[test]
    fn test_rejected_step_continues() {
        let script = "commit a human\ncommit b human\ncommit c human\ncommit d human\nquery\n";
        let cmd = RunCommand::new(Config::default());
        let output = cmd.run(content(), script);

        assert!(!output.success);
        assert!(!output.steps[3].ok);
        assert!(output.steps[3].message.contains("capacity exceeded"));
        assert!(output.steps[4].ok);
        assert_eq!(output.exit_code(), exit_codes::FAILURE);
        assert!(output.snapshot.unwrap().gates.query);
    }

    #[test]
    fn test_malformed_script() {
        let cmd = RunCommand::new(Config::default());
        let output = cmd.run(content(), "commit a\n");

        assert!(!output.success);
        assert!(output.snapshot.is_none());
        assert_eq!(output.exit_code(), exit_codes::FAILURE);
        assert!(output.error.unwrap().contains("line 1"));
    }

    #[test]
    fn test_format_output_modes() {
        let cmd = RunCommand::new(Config::default());
        let output = cmd.run(content(), "commit a external\n");

        let quiet = RunOptions {
            quiet: true,
            ..Default::default()
        };
        assert!(cmd.format_output(&output, &quiet).is_empty());

        let json = RunOptions {
            json: true,
            ..Default::default()
        };
        let parsed: serde_json::Value =
            serde_json::from_str(&cmd.format_output(&output, &json)).unwrap();
        assert_eq!(parsed["snapshot"]["hypothesis"], "external");

        let text = cmd.format_output(&output, &RunOptions::default());
        assert!(text.contains("Hypothesis: Outside circumstances"));
        assert!(text.contains("Clock:      1:50"));
    }
}
