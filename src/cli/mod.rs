//! CLI commands for Casebook.
//!
//! A headless driver for the engine:
//! - **run**: replay an action script against a fresh session
//! - **validate**: check a content file
//! - **config**: show the effective configuration

pub mod config_cmd;
pub mod run;
pub mod validate;

pub use config_cmd::ConfigCommand;
pub use run::RunCommand;
pub use validate::ValidateCommand;
