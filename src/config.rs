//! Configuration loading for Casebook.
//!
//! Configuration follows a precedence chain:
//! 1. Environment variables (highest priority)
//! 2. Project config (`.casebook/config.toml`)
//! 3. User config (`~/.casebook/config.toml`)
//! 4. Defaults (lowest priority)
//!
//! All configuration is optional. The defaults reproduce the standard
//! rules: a 120 minute clock, three evidence slots, trust starting at 50.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use toml::{Table, Value};

use crate::error::{CasebookError, FailOpen, Result};

/// Main configuration struct for Casebook.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Clock and trust rules.
    pub ledger: LedgerConfig,
    /// Evidence board rules.
    pub evidence: EvidenceConfig,
    /// Interview and insight rules.
    pub interview: InterviewConfig,
    /// Gate thresholds.
    pub progression: ProgressionConfig,
    /// Reference validation against content.
    pub validation: ValidationConfig,
}

/// Clock and trust rules.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LedgerConfig {
    /// Minutes on the clock at session start.
    pub initial_clock_minutes: u32,
    /// Minutes deducted the first time a card is committed.
    pub commit_cost_minutes: u32,
    /// Trust score at session start.
    pub initial_trust: i32,
    /// Factor applied to a choice's trust delta.
    pub trust_multiplier: i32,
    /// Scores below this are Low.
    pub low_threshold: i32,
    /// Scores at or above this are High.
    pub high_threshold: i32,
}

/// Lowest possible trust score.
pub const TRUST_MIN: i32 = 0;

/// Highest possible trust score.
pub const TRUST_MAX: i32 = 100;

impl LedgerConfig {
    /// Check if a trust value lies in the valid score range.
    pub fn is_valid_trust(value: i32) -> bool {
        (TRUST_MIN..=TRUST_MAX).contains(&value)
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            initial_clock_minutes: 120,
            commit_cost_minutes: 10,
            initial_trust: 50,
            trust_multiplier: 10,
            low_threshold: 40,
            high_threshold: 70,
        }
    }
}

/// Evidence board rules.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EvidenceConfig {
    /// Maximum number of distinct cards that can be committed.
    pub commit_capacity: usize,
}

impl Default for EvidenceConfig {
    fn default() -> Self {
        Self { commit_capacity: 3 }
    }
}

/// Interview and insight rules.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InterviewConfig {
    /// Default cap on selected insights.
    pub max_insights: usize,
}

impl Default for InterviewConfig {
    fn default() -> Self {
        Self { max_insights: 2 }
    }
}

/// Gate thresholds.
///
/// The evidence gate always requires a full board (`evidence.commit_capacity`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProgressionConfig {
    /// Answered questions needed to pass the interview gate.
    pub min_answers: usize,
    /// Selected insights needed to pass the synthesis gate.
    pub min_insights: usize,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            min_answers: 2,
            min_insights: 2,
        }
    }
}

/// Reference validation against content.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ValidationConfig {
    /// Reject question, choice, and insight ids missing from content.
    ///
    /// Card ids are always checked.
    pub strict_references: bool,
}

impl Config {
    /// Load configuration for a working directory.
    ///
    /// Precedence (highest to lowest):
    /// 1. Environment variables
    /// 2. Project config (`.casebook/config.toml` in cwd)
    /// 3. User config (`~/.casebook/config.toml`)
    /// 4. Defaults
    ///
    /// File layers are overlaid as TOML tables, so any key a layer writes
    /// wins over lower layers, even when it restates a default. An
    /// inconsistent result falls back to defaults.
    pub fn load_from_cwd(cwd: &Path) -> Self {
        let mut layers = Table::new();
        if let Some(user_layer) = Self::load_user_layer() {
            overlay(&mut layers, user_layer);
        }
        if let Some(project_layer) = Self::load_project_layer(cwd) {
            overlay(&mut layers, project_layer);
        }

        let mut config = Self::from_table(layers).fail_open_default("merging config layers");
        config.apply_env_overrides();

        config
            .validate()
            .map(|()| config)
            .fail_open_with("validating config", Config::default())
    }

    /// Load the user layer from `~/.casebook/config.toml`.
    fn load_user_layer() -> Option<Table> {
        let home = casebook_home()?;
        Self::load_layer(&home.join("config.toml"), "loading user config")
    }

    /// Load the project layer from `.casebook/config.toml` in the given directory.
    fn load_project_layer(cwd: &Path) -> Option<Table> {
        Self::load_layer(&project_config_path(cwd), "loading project config")
    }

    /// Read one layer as a raw table. Layers that do not describe a valid
    /// config on their own are skipped.
    fn load_layer(path: &Path, context: &str) -> Option<Table> {
        if !path.exists() {
            return None;
        }
        let layer = fs::read_to_string(path)
            .map_err(|e| CasebookError::storage(path, e))
            .and_then(|text| {
                toml::from_str::<Table>(&text).map_err(|e| CasebookError::config(e.to_string()))
            })
            .and_then(|table| Self::from_table(table.clone()).map(|_| table));
        layer.map(Some).fail_open_default(context)
    }

    /// Build a config from a (possibly partial) table.
    fn from_table(table: Table) -> Result<Config> {
        Value::Table(table)
            .try_into::<Config>()
            .map_err(|e| CasebookError::config(e.to_string()))
    }

    /// Load config from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| CasebookError::storage(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Config> {
        toml::from_str(content).map_err(|e| CasebookError::config(e.to_string()))
    }

    /// Serialize the config as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CasebookError::config(e.to_string()))
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        env_override(
            "CASEBOOK_INITIAL_CLOCK",
            &mut self.ledger.initial_clock_minutes,
            |_| true,
        );
        env_override(
            "CASEBOOK_COMMIT_COST",
            &mut self.ledger.commit_cost_minutes,
            |_| true,
        );
        env_override(
            "CASEBOOK_INITIAL_TRUST",
            &mut self.ledger.initial_trust,
            |v| LedgerConfig::is_valid_trust(*v),
        );
        env_override(
            "CASEBOOK_TRUST_MULTIPLIER",
            &mut self.ledger.trust_multiplier,
            |v| *v >= 0,
        );
        env_override(
            "CASEBOOK_COMMIT_CAPACITY",
            &mut self.evidence.commit_capacity,
            |v| *v >= 1,
        );
        env_override(
            "CASEBOOK_MAX_INSIGHTS",
            &mut self.interview.max_insights,
            |v| *v >= 1,
        );

        if let Ok(val) = env::var("CASEBOOK_STRICT_REFERENCES") {
            self.validation.strict_references = val == "true" || val == "1";
        }
    }

    /// Check that the rules are internally consistent.
    pub fn validate(&self) -> Result<()> {
        let ledger = &self.ledger;
        if !LedgerConfig::is_valid_trust(ledger.initial_trust) {
            return Err(CasebookError::config(format!(
                "ledger.initial_trust must be in [{}, {}], got {}",
                TRUST_MIN, TRUST_MAX, ledger.initial_trust
            )));
        }
        if ledger.trust_multiplier < 0 {
            return Err(CasebookError::config(format!(
                "ledger.trust_multiplier must not be negative, got {}",
                ledger.trust_multiplier
            )));
        }
        if !LedgerConfig::is_valid_trust(ledger.low_threshold)
            || !LedgerConfig::is_valid_trust(ledger.high_threshold)
            || ledger.low_threshold > ledger.high_threshold
        {
            return Err(CasebookError::config(format!(
                "trust thresholds must satisfy {} <= low <= high <= {}, got low={} high={}",
                TRUST_MIN, TRUST_MAX, ledger.low_threshold, ledger.high_threshold
            )));
        }
        if self.evidence.commit_capacity == 0 {
            return Err(CasebookError::config(
                "evidence.commit_capacity must be at least 1",
            ));
        }
        if self.interview.max_insights == 0 {
            return Err(CasebookError::config(
                "interview.max_insights must be at least 1",
            ));
        }
        if self.progression.min_insights > self.interview.max_insights {
            return Err(CasebookError::config(format!(
                "progression.min_insights ({}) exceeds interview.max_insights ({})",
                self.progression.min_insights, self.interview.max_insights
            )));
        }
        Ok(())
    }
}

/// Overlay `layer` onto `base`. Nested tables merge key by key; any other
/// value in `layer` replaces the one in `base`.
fn overlay(base: &mut Table, layer: Table) {
    for (key, value) in layer {
        match value {
            Value::Table(nested) => {
                if let Some(Value::Table(existing)) = base.get_mut(&key) {
                    overlay(existing, nested);
                } else {
                    base.insert(key, Value::Table(nested));
                }
            }
            value => {
                base.insert(key, value);
            }
        }
    }
}

/// Parse an environment variable into `target` when it is set and valid.
fn env_override<T>(name: &str, target: &mut T, is_valid: impl Fn(&T) -> bool)
where
    T: FromStr + std::fmt::Display,
{
    let Ok(val) = env::var(name) else {
        return;
    };
    match val.parse::<T>() {
        Ok(parsed) if is_valid(&parsed) => *target = parsed,
        Ok(_) | Err(_) => tracing::warn!(
            "Invalid {} value '{}'. Using default '{}'.",
            name,
            val,
            target
        ),
    }
}

/// Get the Casebook home directory.
///
/// Checks `CASEBOOK_HOME` first, then falls back to `~/.casebook`.
/// An empty `CASEBOOK_HOME` is ignored.
pub fn casebook_home() -> Option<PathBuf> {
    if let Ok(home) = env::var("CASEBOOK_HOME") {
        if home.is_empty() {
            tracing::warn!("CASEBOOK_HOME is empty, using default");
        } else {
            return Some(PathBuf::from(home));
        }
    }

    dirs::home_dir().map(|home| home.join(".casebook"))
}

/// Get the project config path for a given working directory.
///
/// Returns `<cwd>/.casebook/config.toml`.
pub fn project_config_path(cwd: &Path) -> PathBuf {
    cwd.join(".casebook").join("config.toml")
}
