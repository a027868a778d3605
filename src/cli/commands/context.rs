//! Shared setup for commands that analyze snapshots.
//!
//! Loads and validates the configuration, applies global overrides, reads
//! the snapshots and runs the pipeline.

use std::path::{Path, PathBuf};

use crate::analysis::{resolve_as_of, Analysis, AnalysisReport};
use crate::cli::args::Cli;
use crate::config::{load_config, LoadedConfig};
use crate::error::{OpcertError, Result};
use crate::ingest::Dataset;
use crate::ui::UserInterface;

/// Global flags that shape every analysis run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalOptions {
    pub config: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub as_of: Option<String>,
}

impl GlobalOptions {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            config: cli.config.clone(),
            data_dir: cli.data_dir.clone(),
            as_of: cli.as_of.clone(),
        }
    }
}

/// A completed run with the configuration it used.
#[derive(Debug)]
pub struct AnalysisContext {
    pub project_root: PathBuf,
    pub loaded: LoadedConfig,
    pub report: AnalysisReport,
}

impl AnalysisContext {
    /// Load config and data, then run the analysis.
    pub fn load(project_root: &Path, options: &GlobalOptions) -> Result<Self> {
        let mut loaded = load_config(project_root, options.config.as_deref())?;
        if loaded.is_default() {
            tracing::debug!("No project config found; using defaults");
        }
        if let Some(dir) = &options.data_dir {
            loaded.config.data.dir = dir.clone();
        }

        let as_of = resolve_as_of(options.as_of.as_deref(), &loaded.config.data)?;
        let analysis = Analysis::new(loaded.config.clone(), as_of)?;
        let dataset = Dataset::load(&loaded.config.data, project_root)?;
        let report = analysis.run(&dataset);

        Ok(Self {
            project_root: project_root.to_path_buf(),
            loaded,
            report,
        })
    }

    /// Like [`load`](Self::load), but reports a missing config file on
    /// `ui` and returns `None`; the caller exits with code 2.
    pub fn load_or_report(
        project_root: &Path,
        options: &GlobalOptions,
        ui: &mut dyn UserInterface,
    ) -> Result<Option<Self>> {
        match Self::load(project_root, options) {
            Ok(ctx) => Ok(Some(ctx)),
            Err(OpcertError::ConfigNotFound { path }) => {
                ui.error(&format!("Configuration not found: {}", path.display()));
                ui.show_hint("Run 'opcert init' to create .opcert/config.yml");
                Ok(None)
            }
            Err(OpcertError::DataSourceNotFound { path }) => {
                ui.show_hint("Point data.dir (or --data-dir) at the exported snapshots");
                Err(OpcertError::DataSourceNotFound { path })
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use tempfile::TempDir;

    #[test]
    fn missing_explicit_config_is_reported() {
        let temp = TempDir::new().unwrap();
        let options = GlobalOptions {
            config: Some(temp.path().join("nope.yml")),
            ..Default::default()
        };
        let mut ui = MockUI::new();

        let ctx = AnalysisContext::load_or_report(temp.path(), &options, &mut ui).unwrap();
        assert!(ctx.is_none());
        assert!(ui.has_error("Configuration not found"));
        assert!(ui.has_hint("opcert init"));
    }

    #[test]
    fn missing_data_is_an_error() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();

        let result =
            AnalysisContext::load_or_report(temp.path(), &GlobalOptions::default(), &mut ui);
        assert!(matches!(result, Err(OpcertError::DataSourceNotFound { .. })));
        assert!(ui.has_hint("data.dir"));
    }

    #[test]
    fn bad_as_of_is_rejected() {
        let temp = TempDir::new().unwrap();
        let options = GlobalOptions {
            as_of: Some("yesterday".to_string()),
            ..Default::default()
        };
        let result = AnalysisContext::load(temp.path(), &options);
        assert!(matches!(
            result,
            Err(OpcertError::ConfigValidationError { .. })
        ));
    }
}
