//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// opcert - Operator lifecycle and certification requirement analysis.
#[derive(Debug, Parser)]
#[command(name = "opcert")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides .opcert/config.yml, no merging)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to project root (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Directory containing the snapshot files (overrides data.dir)
    #[arg(long, global = true, env = "OPCERT_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Reference time for the run, e.g. 2024-06-01 (overrides data.as_of)
    #[arg(long, global = true)]
    pub as_of: Option<String>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the full analysis and write the JSON report (default)
    Analyze(AnalyzeArgs),

    /// Show inferred certification requirements per lifecycle step
    Requirements(RequirementsArgs),

    /// Show operator compliance gaps
    Gaps(GapsArgs),

    /// Show operator journeys and stage durations
    Journeys(JourneysArgs),

    /// Show lifecycle bottlenecks and division health
    Bottlenecks(BottlenecksArgs),

    /// Show certification naming drift
    Names(NamesArgs),

    /// Show resolved configuration
    Config(ConfigArgs),

    /// Create a starter .opcert/config.yml
    Init(InitArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `analyze` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct AnalyzeArgs {
    /// Where to write the report (overrides report.output)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the report to stdout as JSON instead of a summary
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `requirements` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RequirementsArgs {
    /// Only show divisions starting with this prefix
    #[arg(short, long)]
    pub division: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `gaps` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct GapsArgs {
    /// Show a single operator in detail
    #[arg(short, long)]
    pub operator: Option<String>,

    /// Only show divisions starting with this prefix
    #[arg(short, long)]
    pub division: Option<String>,

    /// Include operators without gaps
    #[arg(long)]
    pub all: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `journeys` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct JourneysArgs {
    /// Show a single operator's stages
    #[arg(short, long)]
    pub operator: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `bottlenecks` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct BottlenecksArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `names` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct NamesArgs {
    /// Include certifications with a single consistent spelling
    #[arg(long)]
    pub all: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `config` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ConfigArgs {
    /// Output as JSON
    #[arg(long, conflicts_with_all = ["yaml", "schema"])]
    pub json: bool,

    /// Output as YAML (default)
    #[arg(long, conflicts_with = "schema")]
    pub yaml: bool,

    /// Print the JSON Schema of the configuration file
    #[arg(long)]
    pub schema: bool,
}

/// Arguments for the `init` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct InitArgs {
    /// Overwrite an existing configuration
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
