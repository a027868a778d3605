//! Terminal output components.
//!
//! This module provides:
//! - [`UserInterface`] trait for UI abstraction
//! - [`TerminalUI`] for styled terminal output
//! - [`NonInteractiveUI`] for pipes, CI and headless environments
//! - [`MockUI`] capturing output for tests
//! - A box-drawing [`Table`]
//!
//! # Example
//!
//! ```
//! use opcert::ui::{create_ui, OutputMode, Table};
//!
//! let mut ui = create_ui(false, OutputMode::Quiet);
//! ui.show_header("Requirements");
//!
//! let mut table = Table::new(vec!["Certification", "Adoption"]);
//! table.add_row(vec!["Background Check", "80.0%"]);
//! ui.show_table(&table);
//! ```

pub mod mock;
pub mod non_interactive;
pub mod output;
pub mod table;
pub mod terminal;
pub mod theme;

pub use mock::MockUI;
pub use non_interactive::NonInteractiveUI;
pub use output::OutputMode;
pub use table::{Align, Table};
pub use terminal::{create_ui, TerminalUI};
pub use theme::{should_use_colors, OpcertTheme};

/// Trait for user-facing output.
///
/// Commands only ever talk to this trait so tests can capture what they
/// print.
pub trait UserInterface {
    /// Get the current output mode.
    fn output_mode(&self) -> OutputMode;

    /// Display a message to the user.
    fn message(&mut self, msg: &str);

    /// Display a success message.
    fn success(&mut self, msg: &str);

    /// Display a warning message.
    fn warning(&mut self, msg: &str);

    /// Display an error message. Shown in every mode.
    fn error(&mut self, msg: &str);

    /// Show a header/banner.
    fn show_header(&mut self, title: &str);

    /// Show a contextual hint (e.g. the next command to run).
    fn show_hint(&mut self, hint: &str);

    /// Render a table.
    fn show_table(&mut self, table: &Table);

    /// Emit machine-readable output (JSON, YAML, completions).
    ///
    /// Data is written to stdout unstyled and is never suppressed by the
    /// output mode.
    fn data(&mut self, text: &str);

    /// Check if running attached to a terminal.
    fn is_interactive(&self) -> bool;
}
