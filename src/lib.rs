//! opcert - Operator lifecycle and certification requirement analysis.
//!
//! opcert reads exported operator, certification and status snapshots,
//! reconstructs each division's lifecycle, infers which certifications are
//! effectively required at every step, and reports per-operator gaps,
//! journey durations, bottlenecks and certification naming drift.
//!
//! # Modules
//!
//! - [`analysis`] - Gaps, bottlenecks and the end-to-end pipeline
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading, parsing, and validation
//! - [`diagnostics`] - Data-quality findings
//! - [`error`] - Error types and result aliases
//! - [`ingest`] - Snapshot readers and record coercion
//! - [`lifecycle`] - Lifecycle steps, journeys and progression
//! - [`normalize`] - Certification name normalization and aliases
//! - [`requirements`] - Holdings and requirement inference
//! - [`ui`] - Terminal output
//!
//! # Example
//!
//! ```
//! use opcert::normalize::{normalize, AliasTable};
//!
//! assert_eq!(normalize("  Drug  Test ").as_str(), "drug test");
//!
//! let mut aliases = std::collections::BTreeMap::new();
//! aliases.insert(
//!     "Background Check".to_string(),
//!     vec!["Background Chk".to_string()],
//! );
//! let table = AliasTable::from_config(&aliases).unwrap();
//! assert_eq!(table.canonicalize("background chk"), "Background Check");
//! ```
//!
//! For file-based runs, see the integration tests.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod ingest;
pub mod lifecycle;
pub mod normalize;
pub mod requirements;
pub mod ui;

pub use error::{OpcertError, Result};
