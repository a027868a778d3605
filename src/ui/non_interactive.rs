//! Plain UI for pipes, CI and headless environments.

use super::{OutputMode, Table, UserInterface};

/// UI implementation without styling.
///
/// Warnings and errors go to stderr so stdout stays clean for tables and
/// machine-readable data.
pub struct NonInteractiveUI {
    mode: OutputMode,
}

impl NonInteractiveUI {
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("✓ {}", msg);
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            eprintln!("⚠ {}", msg);
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("✗ {}", msg);
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            println!("\n{}\n", title);
        }
    }

    fn show_hint(&mut self, hint: &str) {
        if self.mode.shows_status() {
            println!("  {}", hint);
        }
    }

    fn show_table(&mut self, table: &Table) {
        println!("{}", table.render());
    }

    fn data(&mut self, text: &str) {
        println!("{}", text);
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_interactive() {
        let ui = NonInteractiveUI::new(OutputMode::Normal);
        assert!(!ui.is_interactive());
        assert_eq!(ui.output_mode(), OutputMode::Normal);
    }

    #[test]
    fn quiet_mode_accepts_every_call() {
        let mut ui = NonInteractiveUI::new(OutputMode::Quiet);
        ui.message("hidden");
        ui.success("hidden");
        ui.warning("hidden");
        ui.show_header("hidden");
        ui.show_hint("hidden");
        ui.show_table(&Table::new(vec!["A"]));
    }
}
