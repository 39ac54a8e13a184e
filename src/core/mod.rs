//! Core types and logic for Casebook.
//!
//! This module contains the game-rule components: categories, the evidence
//! board, the resource ledger, the interview tracker, the progression gates,
//! and the aggregate case state.

pub mod category;
pub mod evidence;
pub mod gate;
pub mod interview;
pub mod ledger;
pub mod state;

pub use category::Category;
pub use evidence::{Commitment, EvidenceBoard, EvidenceCard, Tally};
pub use gate::{GateFlags, GateInputs, Milestones, Stage};
pub use interview::{InterviewTracker, Toggle};
pub use ledger::{format_clock, ResourceLedger, TrustTier};
pub use state::{CaseState, EventType, TraceEvent};
