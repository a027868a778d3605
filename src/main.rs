//! opcert CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use opcert::cli::{Cli, CommandDispatcher};
use opcert::ui::{create_ui, OutputMode};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is INFO
///
/// Logs go to stderr so `--json` output stays parseable.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("opcert=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("opcert=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// CI runners are never interactive.
fn is_ci() -> bool {
    ["CI", "GITHUB_ACTIONS", "GITLAB_CI", "BUILDKITE", "JENKINS_URL"]
        .iter()
        .any(|var| std::env::var_os(var).is_some())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    tracing::debug!("opcert starting with args: {:?}", cli);

    let output_mode = OutputMode::from_flags(cli.verbose, cli.quiet);

    if cli.no_color {
        std::env::set_var("NO_COLOR", "1");
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    let project_root = cli
        .project
        .as_ref()
        .cloned()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());

    let mut ui = create_ui(!is_ci(), output_mode);
    let dispatcher = CommandDispatcher::new(project_root);

    match dispatcher.dispatch(&cli, ui.as_mut()) {
        Ok(result) => ExitCode::from(result.exit_code as u8),
        Err(e) => {
            ui.error(&format!("Error: {}", e));
            ExitCode::from(1)
        }
    }
}
