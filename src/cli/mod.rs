//! Command-line interface for opcert.
//!
//! This module provides the CLI argument parsing using clap's derive macros
//! and command implementations.
//!
//! # Architecture
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{
    AnalyzeArgs, BottlenecksArgs, Cli, Commands, CompletionsArgs, ConfigArgs, GapsArgs, InitArgs,
    JourneysArgs, NamesArgs, RequirementsArgs,
};
pub use commands::{Command, CommandDispatcher, CommandResult};
