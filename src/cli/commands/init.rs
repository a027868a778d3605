//! Init command implementation.
//!
//! The `opcert init` command writes a starter `.opcert/config.yml` holding
//! the default thresholds and a seed alias table.

use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::args::InitArgs;
use crate::config::{AnalysisConfig, CONFIG_DIR};
use crate::error::{OpcertError, Result};
use crate::normalize::starter_aliases;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

const HEADER: &str = "\
# opcert configuration
#
# data:        where the exported snapshots live (relative to this project)
# thresholds:  adoption shares for REQUIRED / COMMON and bottleneck ratios
# health:      lifecycle spread bands per division
# recommendations: cut-offs for the prioritised action list
# divisions:   include / exclude division id prefixes
# aliases:     canonical certification name -> raw spellings seen in exports
# policy:      expiration handling and which step gaps are measured against
#
# Local overrides go in .opcert/config.local.yml (not committed).
";

/// The init command implementation.
pub struct InitCommand {
    project_root: PathBuf,
    args: InitArgs,
}

impl InitCommand {
    /// Create a new init command.
    pub fn new(project_root: &Path, args: InitArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            args,
        }
    }

    fn config_path(&self) -> PathBuf {
        self.project_root.join(CONFIG_DIR).join("config.yml")
    }

    /// Starter configuration: defaults plus the seed aliases.
    fn create_config() -> Result<String> {
        let config = AnalysisConfig {
            aliases: starter_aliases(),
            ..Default::default()
        };
        let yaml = serde_yaml::to_string(&config).map_err(|e| OpcertError::Other(e.into()))?;
        Ok(format!("{}\n{}", HEADER, yaml))
    }

    /// Keep local overrides out of version control.
    fn update_gitignore(&self, ui: &mut dyn UserInterface) -> Result<()> {
        let entry = ".opcert/config.local.yml";
        let gitignore_path = self.project_root.join(".gitignore");

        if gitignore_path.exists() {
            let content = fs::read_to_string(&gitignore_path)?;
            if !content.lines().any(|line| line.trim() == entry) {
                let new_content = if content.ends_with('\n') || content.is_empty() {
                    format!("{}{}\n", content, entry)
                } else {
                    format!("{}\n{}\n", content, entry)
                };
                fs::write(&gitignore_path, new_content)?;
                ui.message(&format!("Added {} to .gitignore", entry));
            }
        }

        Ok(())
    }
}

impl Command for InitCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let path = self.config_path();
        if path.exists() && !self.args.force {
            ui.warning("Configuration already exists. Use --force to overwrite.");
            return Ok(CommandResult::failure(1));
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, Self::create_config()?)?;
        tracing::info!("Wrote {}", path.display());
        ui.success(&format!("Created {}", path.display()));

        self.update_gitignore(ui)?;

        let data_dir = self.project_root.join(AnalysisConfig::default().data.dir);
        if !data_dir.is_dir() {
            ui.show_hint(&format!(
                "Export the snapshots into {} or set data.dir",
                data_dir.display()
            ));
        }
        ui.show_hint("Run 'opcert analyze' to produce the first report");

        Ok(CommandResult::success())
    }
}
