//! Mock UI implementation for testing.
//!
//! `MockUI` implements the `UserInterface` trait and captures all output
//! for later assertion.
//!
//! # Example
//!
//! ```
//! use opcert::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.message("Loading snapshots");
//! ui.success("Done!");
//!
//! assert!(ui.has_message("Loading"));
//! assert!(ui.successes().contains(&"Done!".to_string()));
//! ```

use super::{OutputMode, Table, UserInterface};

/// Mock UI implementation for testing.
///
/// Output is captured regardless of the mode so tests can see what a
/// command tried to print; `output_mode` still reports the configured mode
/// for commands that branch on it.
#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    interactive: bool,
    messages: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    headers: Vec<String>,
    hints: Vec<String>,
    tables: Vec<String>,
    data: Vec<String>,
}

impl MockUI {
    /// Create a new MockUI with Normal output mode.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn hints(&self) -> &[String] {
        &self.hints
    }

    /// Rendered tables, in the order shown.
    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    /// Machine-readable output, in the order emitted.
    pub fn data_lines(&self) -> &[String] {
        &self.data
    }

    /// Check if a message containing `msg` was shown.
    pub fn has_message(&self, msg: &str) -> bool {
        self.messages.iter().any(|m| m.contains(msg))
    }

    pub fn has_success(&self, msg: &str) -> bool {
        self.successes.iter().any(|m| m.contains(msg))
    }

    pub fn has_warning(&self, msg: &str) -> bool {
        self.warnings.iter().any(|m| m.contains(msg))
    }

    pub fn has_error(&self, msg: &str) -> bool {
        self.errors.iter().any(|m| m.contains(msg))
    }

    pub fn has_hint(&self, msg: &str) -> bool {
        self.hints.iter().any(|m| m.contains(msg))
    }

    /// Check if any rendered table contains `text`.
    pub fn table_contains(&self, text: &str) -> bool {
        self.tables.iter().any(|t| t.contains(text))
    }

    /// All emitted data joined into one string.
    pub fn data_output(&self) -> String {
        self.data.join("\n")
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn show_header(&mut self, title: &str) {
        self.headers.push(title.to_string());
    }

    fn show_hint(&mut self, hint: &str) {
        self.hints.push(hint.to_string());
    }

    fn show_table(&mut self, table: &Table) {
        self.tables.push(table.render());
    }

    fn data(&mut self, text: &str) {
        self.data.push(text.to_string());
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}
