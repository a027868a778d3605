//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations. Commands that look at the data
//! share one pipeline run through [`context::AnalysisContext`].

pub mod analyze;
pub mod bottlenecks;
pub mod completions;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod display;
pub mod gaps;
pub mod init;
pub mod journeys;
pub mod names;
pub mod requirements;

#[cfg(test)]
mod fixtures;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
