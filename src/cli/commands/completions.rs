//! Shell completions generation.
//!
//! The `opcert completions` command generates shell completion scripts.

use crate::cli::args::{Cli, CompletionsArgs};
use crate::ui::UserInterface;
use clap::CommandFactory;

use super::dispatcher::{Command, CommandResult};

/// The completions command implementation.
pub struct CompletionsCommand {
    args: CompletionsArgs,
}

impl CompletionsCommand {
    /// Create a new completions command.
    pub fn new(args: CompletionsArgs) -> Self {
        Self { args }
    }

    fn script(&self) -> String {
        let mut cmd = Cli::command();
        let mut buf = Vec::new();
        clap_complete::generate(self.args.shell, &mut cmd, "opcert", &mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl Command for CompletionsCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> crate::error::Result<CommandResult> {
        ui.data(self.script().trim_end());
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use clap_complete::Shell;

    fn run(shell: Shell) -> String {
        let cmd = CompletionsCommand::new(CompletionsArgs { shell });
        let mut ui = MockUI::new();
        let result = cmd.execute(&mut ui).unwrap();
        assert!(result.success);
        ui.data_output()
    }

    #[test]
    fn generates_bash_completions() {
        let output = run(Shell::Bash);
        assert!(output.contains("opcert"));
        assert!(output.contains("complete"));
        assert!(output.contains("bottlenecks"));
    }

    #[test]
    fn generates_zsh_completions() {
        assert!(run(Shell::Zsh).contains("opcert"));
    }

    #[test]
    fn generates_fish_completions() {
        let output = run(Shell::Fish);
        assert!(output.contains("opcert"));
        assert!(output.contains("journeys"));
    }
}
