//! Casebook - headless driver for the investigation engine
//!
//! CLI entry point with global panic handler.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use casebook::cli::config_cmd::{ConfigCommand, ConfigOptions};
use casebook::cli::run::{RunCommand, RunOptions};
use casebook::cli::validate::{ValidateCommand, ValidateOptions};
use casebook::config::{casebook_home, Config};
use casebook::content::Content;
use casebook::error::exit_codes;

// =============================================================================
// CLI Definition
// =============================================================================

/// Casebook - evidence, interviews, and synthesis for a single case
#[derive(Parser)]
#[command(name = "casebook")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log engine events to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay an action script against a fresh case
    Run {
        /// Content file (JSON)
        #[arg(long)]
        content: PathBuf,
        /// Action script; reads stdin when omitted
        #[arg(long)]
        script: Option<PathBuf>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Check a content file
    Validate {
        /// Content file (JSON)
        #[arg(long)]
        content: PathBuf,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Show the effective configuration
    Config {
        /// Output as JSON instead of TOML
        #[arg(long, short)]
        json: bool,
    },
}

// =============================================================================
// Main
// =============================================================================

fn main() -> ExitCode {
    setup_panic_handler();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("casebook error: {}", e);
            ExitCode::from(exit_codes::ERROR)
        }
    }
}

/// Set up the global panic handler.
///
/// On panic, appends to ~/.casebook/crash.log and exits with the error code.
fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("casebook panic: {}", info);

        if let Some(home) = casebook_home() {
            let _ = fs::create_dir_all(&home);
            if let Ok(mut file) = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(home.join("crash.log"))
            {
                let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
                let _ = writeln!(file, "[{}] {}", timestamp, info);
            }
        }

        std::process::exit(i32::from(exit_codes::ERROR));
    }));
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "casebook=debug" } else { "warn" };
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time(),
        )
        .try_init();
}

/// Run the CLI and return the exit code.
fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let cwd = std::env::current_dir()?;

    match cli.command {
        Commands::Run {
            content,
            script,
            json,
            quiet,
        } => run_script(&content, script.as_deref(), json, quiet, &cwd),
        Commands::Validate {
            content,
            json,
            quiet,
        } => run_validate(&content, json, quiet),
        Commands::Config { json } => run_config(json, &cwd),
    }
}

/// Read the action script from `path`, or from `stdin` when no path is given.
fn read_script(path: Option<&Path>, stdin: impl Read) -> io::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path),
        None => io::read_to_string(stdin),
    }
}

fn run_script(
    content_path: &Path,
    script_path: Option<&Path>,
    json: bool,
    quiet: bool,
    cwd: &Path,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = Config::load_from_cwd(cwd);
    let content = Content::load(content_path)?;
    let script = read_script(script_path, io::stdin())?;

    let cmd = RunCommand::new(config);
    let output = cmd.run(content, &script);
    let options = RunOptions { json, quiet };
    print!("{}", cmd.format_output(&output, &options));

    Ok(ExitCode::from(output.exit_code()))
}

fn run_validate(
    content_path: &Path,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cmd = ValidateCommand::new();
    let output = cmd.run(content_path);
    let options = ValidateOptions { json, quiet };
    print!("{}", cmd.format_output(&output, &options));

    Ok(ExitCode::from(output.exit_code()))
}

fn run_config(json: bool, cwd: &Path) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cmd = ConfigCommand::new(Config::load_from_cwd(cwd));
    let text = cmd.run(&ConfigOptions { json })?;
    println!("{}", text.trim_end());

    Ok(ExitCode::from(exit_codes::SUCCESS))
}
