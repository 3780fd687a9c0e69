//! Summit - goal progress and lifecycle engine
//!
//! CLI entry point.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use summit::cli::badge::{BadgeInput, BadgeOptions};
use summit::cli::catalog::CatalogOptions;
use summit::cli::classify::{ClassifyInput, ClassifyOptions};
use summit::cli::diagnose::DiagnoseOptions;
use summit::cli::ladder::LadderOptions;
use summit::cli::{
    read_json_input, BadgeCommand, CatalogAction, CatalogCommand, ClassifyCommand,
    DiagnoseCommand, LadderCommand,
};
use summit::config::Config;
use summit::diagnostic::DiagnosticTerms;
use summit::error::exit_codes;
use summit::phase::GoalPhase;
use summit::storage::{FilePhaseStore, MemoryPhaseStore};

// =============================================================================
// CLI Definition
// =============================================================================

/// Summit - goal progress and lifecycle engine
#[derive(Parser)]
#[command(name = "summit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug output to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate milestone rungs for a goal
    Ladder {
        /// Starting value
        #[arg(long, allow_hyphen_values = true)]
        start: f64,
        /// Final target
        #[arg(long, allow_hyphen_values = true)]
        target: f64,
        /// Growth curve (linear, ease-in, ease-out, ease-in-out)
        #[arg(long, default_value = "linear")]
        curve: String,
        /// Number of rungs
        #[arg(long, conflicts_with = "weeks")]
        rungs: Option<u32>,
        /// Schedule length in weeks
        #[arg(long)]
        weeks: Option<u32>,
        /// Weeks per rung (with --weeks)
        #[arg(long, requires = "weeks")]
        weeks_per_rung: Option<u32>,
        /// Round rungs to multiples of this step
        #[arg(long)]
        step: Option<f64>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Classify a goal's phase from a JSON snapshot history
    Classify {
        /// Input file (`-` for stdin)
        input: PathBuf,
        /// Phase store directory; records the result
        #[arg(long)]
        store: Option<PathBuf>,
        /// Report without persisting
        #[arg(long)]
        preview: bool,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Compute an L2 badge from a JSON children or instances file
    Badge {
        /// Input file (`-` for stdin)
        input: PathBuf,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Score diagnostic terms for a phase
    Diagnose {
        /// Input rate term in [0, 1]
        #[arg(long)]
        input_rate: f64,
        /// Skill leverage term in [0, 1]
        #[arg(long)]
        skill_leverage: f64,
        /// Recovery term in [0, 1]
        #[arg(long)]
        recovery: f64,
        /// Goal phase (acquisition, consolidation, graduated)
        #[arg(long, default_value = "acquisition")]
        phase: GoalPhase,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Look up goal templates
    Catalog {
        #[command(subcommand)]
        action: CatalogSubcommand,
        /// Output as JSON
        #[arg(long, short, global = true)]
        json: bool,
        /// Suppress output
        #[arg(long, short, global = true)]
        quiet: bool,
    },
}

#[derive(Subcommand)]
enum CatalogSubcommand {
    /// List a template's children
    Children { id: String },
    /// List a template's parents
    Parents { id: String },
    /// Show a template and its edges
    Show { id: String },
}

impl From<CatalogSubcommand> for CatalogAction {
    fn from(cmd: CatalogSubcommand) -> Self {
        match cmd {
            CatalogSubcommand::Children { id } => CatalogAction::Children(id),
            CatalogSubcommand::Parents { id } => CatalogAction::Parents(id),
            CatalogSubcommand::Show { id } => CatalogAction::Show(id),
        }
    }
}

// =============================================================================
// Main Entry Point
// =============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(is_quiet(&cli.command), cli.verbose) {
        eprintln!("summit: {}", e);
    }

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("summit error: {}", e);
            ExitCode::from(exit_codes::FAILURE as u8)
        }
    }
}

fn init_tracing(quiet: bool, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("SUMMIT_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| format!("failed to initialize tracing subscriber: {}", e))?;

    Ok(())
}

fn is_quiet(command: &Commands) -> bool {
    match command {
        Commands::Ladder { quiet, .. }
        | Commands::Classify { quiet, .. }
        | Commands::Badge { quiet, .. }
        | Commands::Diagnose { quiet, .. }
        | Commands::Catalog { quiet, .. } => *quiet,
    }
}

/// Run the CLI and return the exit code.
fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Ladder {
            start,
            target,
            curve,
            rungs,
            weeks,
            weeks_per_rung,
            step,
            json,
            quiet,
        } => run_ladder(LadderOptions {
            json,
            quiet,
            start,
            target,
            curve,
            rungs,
            weeks,
            weeks_per_rung,
            step,
        }),
        Commands::Classify {
            input,
            store,
            preview,
            json,
            quiet,
        } => run_classify(&input, store, preview, json, quiet),
        Commands::Badge { input, json, quiet } => run_badge(&input, json, quiet),
        Commands::Diagnose {
            input_rate,
            skill_leverage,
            recovery,
            phase,
            json,
            quiet,
        } => run_diagnose(
            DiagnosticTerms::new(input_rate, skill_leverage, recovery),
            phase,
            json,
            quiet,
        ),
        Commands::Catalog {
            action,
            json,
            quiet,
        } => run_catalog(action.into(), json, quiet),
    }
}

// =============================================================================
// Command Implementations
// =============================================================================

/// Convert a success boolean to an exit code.
fn success_to_exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::from(exit_codes::SUCCESS as u8)
    } else {
        ExitCode::from(exit_codes::FAILURE as u8)
    }
}

fn print_output(formatted: &str) {
    if !formatted.is_empty() {
        print!("{}", formatted);
    }
}

/// Read a JSON input file, reporting failures as a usage error.
fn load_input<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ExitCode> {
    read_json_input(path).map_err(|e| {
        eprintln!("summit: {}", e);
        ExitCode::from(exit_codes::USAGE as u8)
    })
}

fn run_ladder(options: LadderOptions) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cmd = LadderCommand::new();
    let output = cmd.run(&options);
    print_output(&cmd.format_output(&output, &options));
    Ok(success_to_exit_code(output.success))
}

fn run_classify(
    input: &Path,
    store: Option<PathBuf>,
    preview: bool,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let input: ClassifyInput = match load_input(input) {
        Ok(input) => input,
        Err(code) => return Ok(code),
    };
    let options = ClassifyOptions {
        json,
        quiet,
        preview,
    };

    let (success, formatted) = match store {
        Some(dir) => {
            let cmd = ClassifyCommand::with_store(FilePhaseStore::with_dir(dir)?);
            let output = cmd.run(&input, &options);
            (output.success, cmd.format_output(&output, &options))
        }
        None => {
            let cmd = ClassifyCommand::<MemoryPhaseStore>::stateless();
            let output = cmd.run(&input, &options);
            (output.success, cmd.format_output(&output, &options))
        }
    };

    print_output(&formatted);
    Ok(success_to_exit_code(success))
}

fn run_badge(
    input: &Path,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let input: BadgeInput = match load_input(input) {
        Ok(input) => input,
        Err(code) => return Ok(code),
    };
    let config = Config::load()?;
    let cmd = BadgeCommand::new(config);
    let options = BadgeOptions { json, quiet };

    let output = cmd.run(&input, &options);
    print_output(&cmd.format_output(&output, &options));
    Ok(success_to_exit_code(output.success))
}

fn run_diagnose(
    terms: DiagnosticTerms,
    phase: GoalPhase,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let cmd = DiagnoseCommand::new(config);
    let options = DiagnoseOptions { json, quiet };

    let output = cmd.run(&terms, phase);
    print_output(&cmd.format_output(&output, &options));
    Ok(success_to_exit_code(output.success))
}

fn run_catalog(
    action: CatalogAction,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let cmd = CatalogCommand::new(config.load_catalog()?);
    let options = CatalogOptions { json, quiet };

    let output = cmd.run(&action);
    print_output(&cmd.format_output(&output, &options));
    Ok(success_to_exit_code(output.success))
}

// =============================================================================
// Tests
// =============================================================================
