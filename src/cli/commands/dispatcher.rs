//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cli::args::{AnalyzeArgs, Cli, Commands};
use crate::error::Result;
use crate::ui::UserInterface;

use super::analyze::AnalyzeCommand;
use super::bottlenecks::BottlenecksCommand;
use super::completions::CompletionsCommand;
use super::config::ConfigCommand;
use super::context::GlobalOptions;
use super::gaps::GapsCommand;
use super::init::InitCommand;
use super::journeys::JourneysCommand;
use super::names::NamesCommand;
use super::requirements::RequirementsCommand;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Arguments
    ///
    /// * `ui` - User interface for displaying output and prompts
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    project_root: PathBuf,
}

impl CommandDispatcher {
    /// Create a new dispatcher for the given project root.
    pub fn new(project_root: PathBuf) -> Self {
        Self { project_root }
    }

    /// Get the project root path.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Dispatch and execute a command.
    ///
    /// Routes the CLI subcommand to the appropriate command implementation
    /// and executes it. Without a subcommand, `analyze` runs.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let root = self.project_root.as_path();
        let options = GlobalOptions::from_cli(cli);
        match &cli.command {
            Some(Commands::Analyze(args)) => {
                AnalyzeCommand::new(root, options, args.clone()).execute(ui)
            }
            Some(Commands::Requirements(args)) => {
                RequirementsCommand::new(root, options, args.clone()).execute(ui)
            }
            Some(Commands::Gaps(args)) => GapsCommand::new(root, options, args.clone()).execute(ui),
            Some(Commands::Journeys(args)) => {
                JourneysCommand::new(root, options, args.clone()).execute(ui)
            }
            Some(Commands::Bottlenecks(args)) => {
                BottlenecksCommand::new(root, options, args.clone()).execute(ui)
            }
            Some(Commands::Names(args)) => {
                NamesCommand::new(root, options, args.clone()).execute(ui)
            }
            Some(Commands::Config(args)) => {
                ConfigCommand::new(root, options.config, args.clone()).execute(ui)
            }
            Some(Commands::Init(args)) => InitCommand::new(root, args.clone()).execute(ui),
            Some(Commands::Completions(args)) => {
                CompletionsCommand::new(args.clone()).execute(ui)
            }
            None => AnalyzeCommand::new(root, options, AnalyzeArgs::default()).execute(ui),
        }
    }
}
