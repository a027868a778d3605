//! Configuration loading, parsing, and validation for opcert.
//!
//! - Schema definitions in [`schema`]
//! - File discovery, layering and loading in [`loader`]
//! - Validation in [`validator`]
//!
//! # Example
//!
//! ```
//! use opcert::config::{load_config, validate};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! let dir = temp.path().join(".opcert");
//! fs::create_dir_all(&dir).unwrap();
//! fs::write(dir.join("config.yml"), "thresholds:\n  required: 0.9\n").unwrap();
//!
//! let loaded = load_config(temp.path(), None).unwrap();
//! validate(&loaded.config).unwrap();
//! assert_eq!(loaded.config.thresholds.required, 0.9);
//! ```
//!
//! # Configuration File Locations
//!
//! 1. Project config (`.opcert/config.yml`)
//! 2. Local overrides (`.opcert/config.local.yml`)
//!
//! Without a project config the documented defaults apply.

pub mod loader;
pub mod schema;
pub mod validator;

pub use schema::{
    AnalysisConfig, DataSources, DivisionSelection, ExpirationPolicy, GapTarget, HealthBands,
    Policy, RecommendationRules, ReportSettings, Thresholds,
};

pub use loader::{
    load_config, load_config_file, load_config_value, merge_layer, parse_config, ConfigPaths,
    LoadedConfig, CONFIG_DIR,
};

pub use validator::{validate, validate_config, ValidationError};
