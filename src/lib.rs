//! Casebook - a state engine for a single-case investigation
//!
//! A case moves through four gated stages. Evidence cards are committed to
//! one of three hypotheses, a records query is run, witnesses are
//! interviewed under a time and trust budget, and insights are selected for
//! the final synthesis. [`store::Casebook`] owns the case state and is the
//! only place it changes; gates are always derived from that state.

pub mod cli;
pub mod config;
pub mod content;
pub mod core;
pub mod error;
pub mod script;
pub mod store;

pub use config::Config;
pub use content::{CardSpec, Choice, Content, Insight, Question};
pub use core::{
    format_clock, CaseState, Category, EventType, EvidenceCard, GateFlags, Stage, Toggle,
    TraceEvent, TrustTier,
};
pub use error::{CasebookError, ReferenceKind, Result};
pub use script::{parse_script, Action, ScriptLine};
pub use store::{CaseSnapshot, Casebook, CommitOutcome};

// CLI commands
pub use cli::{ConfigCommand, RunCommand, ValidateCommand};
