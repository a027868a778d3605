//! Styled terminal UI.

use console::Term;
use std::io::Write;

use super::{should_use_colors, NonInteractiveUI, OpcertTheme, OutputMode, Table, UserInterface};

/// Terminal UI implementation.
pub struct TerminalUI {
    term: Term,
    theme: OpcertTheme,
    mode: OutputMode,
}

impl TerminalUI {
    /// Create a new terminal UI.
    pub fn new(mode: OutputMode) -> Self {
        let theme = if should_use_colors() {
            OpcertTheme::new()
        } else {
            OpcertTheme::plain()
        };

        Self {
            term: Term::stdout(),
            theme,
            mode,
        }
    }

    pub fn theme(&self) -> &OpcertTheme {
        &self.theme
    }
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", msg).ok();
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", self.theme.format_success(msg)).ok();
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", self.theme.format_warning(msg)).ok();
        }
    }

    fn error(&mut self, msg: &str) {
        let stderr = Term::stderr();
        writeln!(&stderr, "{}", self.theme.format_error(msg)).ok();
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "\n{}\n", self.theme.format_header(title)).ok();
        }
    }

    fn show_hint(&mut self, hint: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "  {}", self.theme.hint.apply_to(hint)).ok();
        }
    }

    fn show_table(&mut self, table: &Table) {
        let rendered = table.render();
        for line in rendered.lines() {
            writeln!(self.term, "{}", line).ok();
        }
    }

    fn data(&mut self, text: &str) {
        writeln!(self.term, "{}", text).ok();
    }

    fn is_interactive(&self) -> bool {
        self.term.is_term()
    }
}

/// Create the appropriate UI based on context.
pub fn create_ui(interactive: bool, mode: OutputMode) -> Box<dyn UserInterface> {
    if interactive && Term::stdout().is_term() {
        Box::new(TerminalUI::new(mode))
    } else {
        Box::new(NonInteractiveUI::new(mode))
    }
}
