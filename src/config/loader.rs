//! Configuration file discovery and loading.
//!
//! Project configuration lives in `.opcert/config.yml`, optionally layered
//! with an uncommitted `.opcert/config.local.yml`. Layers are merged as raw
//! YAML before being deserialized, so a local file only needs the keys it
//! overrides.

use crate::config::schema::AnalysisConfig;
use crate::error::{OpcertError, Result};
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the project configuration directory.
pub const CONFIG_DIR: &str = ".opcert";

/// Paths to configuration files in merge order (later overrides earlier).
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// Project config: .opcert/config.yml
    pub project: Option<PathBuf>,

    /// Local overrides: .opcert/config.local.yml
    pub project_local: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover config files for the given project root.
    pub fn discover(project_root: &Path) -> Self {
        let existing = |name: &str| {
            let path = project_root.join(CONFIG_DIR).join(name);
            path.is_file().then_some(path)
        };

        Self {
            project: existing("config.yml"),
            project_local: existing("config.local.yml"),
        }
    }

    /// Returns all existing config paths in merge order.
    pub fn all_existing(&self) -> Vec<&PathBuf> {
        self.project.iter().chain(self.project_local.iter()).collect()
    }

    /// Check if any project config exists, local overrides included.
    pub fn has_project_config(&self) -> bool {
        self.project.is_some() || self.project_local.is_some()
    }
}

/// A resolved configuration together with the files it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: AnalysisConfig,
    /// Files merged into `config`, in merge order. Empty when built-in
    /// defaults are in use.
    pub sources: Vec<PathBuf>,
}

impl LoadedConfig {
    /// Whether no configuration file was found.
    pub fn is_default(&self) -> bool {
        self.sources.is_empty()
    }
}

/// Parse YAML content into an [`AnalysisConfig`].
///
/// `source_path` is only used for error reporting.
pub fn parse_config(content: &str, source_path: &Path) -> Result<AnalysisConfig> {
    if content.trim().is_empty() {
        return Ok(AnalysisConfig::default());
    }
    serde_yaml::from_str(content).map_err(|e| OpcertError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load a single config file without layering.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist and
/// `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<AnalysisConfig> {
    let content = read_config(path)?;
    parse_config(&content, path)
}

/// Load a config file as a raw YAML value for layering.
pub fn load_config_value(path: &Path) -> Result<Value> {
    let content = read_config(path)?;
    if content.trim().is_empty() {
        return Ok(Value::Mapping(Default::default()));
    }
    serde_yaml::from_str(&content).map_err(|e| OpcertError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn read_config(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            OpcertError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            OpcertError::Io(e)
        }
    })
}

/// Overlay `layer` onto `base` in place.
///
/// Mappings merge key by key, a `null` in the layer removes the key, and
/// any other value (sequences included) replaces what was there.
pub fn merge_layer(base: &mut Value, layer: Value) {
    match (base, layer) {
        (Value::Mapping(base_map), Value::Mapping(layer_map)) => {
            for (key, value) in layer_map {
                if value.is_null() {
                    base_map.remove(&key);
                    continue;
                }
                match base_map.get_mut(&key) {
                    Some(existing) => merge_layer(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Load the project configuration, falling back to built-in defaults when
/// the project has neither `.opcert/config.yml` nor
/// `.opcert/config.local.yml`. A local file on its own is layered over the
/// defaults.
///
/// With `config_override` only that file is read and it must exist.
pub fn load_config(project_root: &Path, config_override: Option<&Path>) -> Result<LoadedConfig> {
    if let Some(path) = config_override {
        let config = load_config_file(path)?;
        return Ok(LoadedConfig {
            config,
            sources: vec![path.to_path_buf()],
        });
    }

    let paths = ConfigPaths::discover(project_root);
    if !paths.has_project_config() {
        tracing::debug!(
            "No {}/config.yml or config.local.yml under {}, using defaults",
            CONFIG_DIR,
            project_root.display()
        );
        return Ok(LoadedConfig {
            config: AnalysisConfig::default(),
            sources: Vec::new(),
        });
    }

    let mut merged = Value::Mapping(Default::default());
    let mut sources = Vec::new();
    for path in paths.all_existing() {
        merge_layer(&mut merged, load_config_value(path)?);
        sources.push(path.clone());
    }

    let config = serde_yaml::from_value(merged).map_err(|e| OpcertError::ConfigParseError {
        path: sources
            .last()
            .cloned()
            .unwrap_or_else(|| project_root.join(CONFIG_DIR)),
        message: format!("Failed to parse merged config: {}", e),
    })?;

    Ok(LoadedConfig { config, sources })
}
