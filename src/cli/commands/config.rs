//! Config command implementation.
//!
//! The `opcert config` command shows the resolved configuration, or the
//! JSON Schema of the configuration file.

use std::path::{Path, PathBuf};

use crate::cli::args::ConfigArgs;
use crate::config::{load_config, validate_config, AnalysisConfig};
use crate::error::{OpcertError, Result};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::display;

/// The config command implementation.
pub struct ConfigCommand {
    project_root: PathBuf,
    config_path: Option<PathBuf>,
    args: ConfigArgs,
}

impl ConfigCommand {
    /// Create a new config command.
    pub fn new(project_root: &Path, config_path: Option<PathBuf>, args: ConfigArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config_path,
            args,
        }
    }

    /// Get the project root path.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }
}

impl Command for ConfigCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        if self.args.schema {
            let schema = schemars::schema_for!(AnalysisConfig);
            display::emit_json(ui, &schema)?;
            return Ok(CommandResult::success());
        }

        let loaded = match load_config(&self.project_root, self.config_path.as_deref()) {
            Ok(loaded) => loaded,
            Err(OpcertError::ConfigNotFound { path }) => {
                ui.error(&format!("Configuration not found: {}", path.display()));
                return Ok(CommandResult::failure(2));
            }
            Err(e) => return Err(e),
        };

        if loaded.is_default() {
            ui.data("# built-in defaults");
        } else {
            for path in &loaded.sources {
                ui.data(&format!("# {}", path.display()));
            }
        }

        if self.args.json {
            display::emit_json(ui, &loaded.config)?;
        } else {
            let yaml = serde_yaml::to_string(&loaded.config)
                .map_err(|e| OpcertError::Other(e.into()))?;
            ui.data(yaml.trim_end());
        }

        let errors = validate_config(&loaded.config);
        if errors.is_empty() {
            return Ok(CommandResult::success());
        }
        for error in &errors {
            ui.error(&format!("{}: {}", error.field, error.message));
        }
        Ok(CommandResult::failure(1))
    }
}
