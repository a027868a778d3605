//! Configuration schema definitions for opcert.
//!
//! This module contains all the struct definitions that map to
//! the YAML configuration file format. Every section carries explicit
//! defaults; unknown keys are rejected so a misspelled threshold never
//! silently falls back to its default.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Root configuration structure for `.opcert/config.yml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Input snapshot locations
    pub data: DataSources,

    /// Classification and bottleneck thresholds
    pub thresholds: Thresholds,

    /// Division health spread bands
    pub health: HealthBands,

    /// Cut-offs for the prioritised recommendations
    pub recommendations: RecommendationRules,

    /// Division allow / exclude lists
    #[serde(default, skip_serializing_if = "DivisionSelection::is_empty")]
    pub divisions: DivisionSelection,

    /// Certification alias table: canonical name -> known raw variants
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub aliases: BTreeMap<String, Vec<String>>,

    /// Policies for the open data questions
    pub policy: Policy,

    /// Report output settings
    pub report: ReportSettings,
}

/// Where the exported snapshots live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct DataSources {
    /// Directory containing the snapshot files (relative to the project root)
    pub dir: PathBuf,

    /// Operator snapshot
    pub operators: PathBuf,

    /// Certification records
    pub certifications: PathBuf,

    /// Status-type (lifecycle step) definitions
    pub status_types: PathBuf,

    /// Coarse ("pizza") status definitions
    pub pizza_statuses: PathBuf,

    /// Status-change events
    pub status_tracker: PathBuf,

    /// Reference time for the run ("now"); defaults to the wall clock
    #[serde(skip_serializing_if = "Option::is_none")]
    pub as_of: Option<String>,
}

impl Default for DataSources {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
            operators: PathBuf::from("pay_Operators.json"),
            certifications: PathBuf::from("pay_Certifications.json"),
            status_types: PathBuf::from("pay_StatusTypes.txt"),
            pizza_statuses: PathBuf::from("pay_PizzaStatuses.txt"),
            status_tracker: PathBuf::from("pay_StatusTracker.json"),
            as_of: None,
        }
    }
}

/// Classification and bottleneck thresholds.
///
/// All ratios are fractions in `[0, 1]` and are compared unrounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct Thresholds {
    /// Adoption at or above this is REQUIRED
    #[serde(default = "default_required")]
    pub required: f64,

    /// Adoption at or above this (and below `required`) is COMMON
    #[serde(default = "default_common")]
    pub common: f64,

    /// Smallest step population allowed to produce REQUIRED classifications
    #[serde(default = "default_min_sample_size")]
    pub min_sample_size: usize,

    /// Status concentration flagged as a high bottleneck
    #[serde(default = "default_bottleneck_high")]
    pub bottleneck_high: f64,

    /// Status concentration flagged as a critical bottleneck
    #[serde(default = "default_bottleneck_critical")]
    pub bottleneck_critical: f64,

    /// Concentration within a single division flagged as a bottleneck
    #[serde(default = "default_division_bottleneck")]
    pub division_bottleneck: f64,

    /// Similarity ratio treated as naming drift (advisory only)
    #[serde(default = "default_fuzzy_match")]
    pub fuzzy_match: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            required: default_required(),
            common: default_common(),
            min_sample_size: default_min_sample_size(),
            bottleneck_high: default_bottleneck_high(),
            bottleneck_critical: default_bottleneck_critical(),
            division_bottleneck: default_division_bottleneck(),
            fuzzy_match: default_fuzzy_match(),
        }
    }
}

fn default_required() -> f64 {
    0.80
}

fn default_common() -> f64 {
    0.50
}

fn default_min_sample_size() -> usize {
    3
}

fn default_bottleneck_high() -> f64 {
    0.25
}

fn default_bottleneck_critical() -> f64 {
    0.50
}

fn default_division_bottleneck() -> f64 {
    0.40
}

fn default_fuzzy_match() -> f64 {
    0.90
}

/// Spread bands for division health scoring.
///
/// A spread above `critical_above` is critical, above `concerning_above`
/// is concerning, anything else is healthy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct HealthBands {
    #[serde(default = "default_concerning_above")]
    pub concerning_above: u32,

    #[serde(default = "default_critical_above")]
    pub critical_above: u32,
}

impl Default for HealthBands {
    fn default() -> Self {
        Self {
            concerning_above: default_concerning_above(),
            critical_above: default_critical_above(),
        }
    }
}

fn default_concerning_above() -> u32 {
    5
}

fn default_critical_above() -> u32 {
    10
}

/// Cut-offs used when turning findings into recommendations.
///
/// Early-stage shares are compared strictly (`share > early_stage_high`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct RecommendationRules {
    /// Steps with an order below this count as early in the lifecycle
    #[serde(default = "default_early_stage_below")]
    pub early_stage_below: u32,

    /// Share of operators in early steps that is a high priority
    #[serde(default = "default_early_stage_high")]
    pub early_stage_high: f64,

    /// Share of operators in early steps that is a critical priority
    #[serde(default = "default_early_stage_critical")]
    pub early_stage_critical: f64,

    /// A division whose average order is below this is stuck early
    #[serde(default = "default_stalled_average_below")]
    pub stalled_average_below: f64,

    /// Share of a status missing the same certification worth acting on
    #[serde(default = "default_compliance_share")]
    pub compliance_share: f64,
}

impl Default for RecommendationRules {
    fn default() -> Self {
        Self {
            early_stage_below: default_early_stage_below(),
            early_stage_high: default_early_stage_high(),
            early_stage_critical: default_early_stage_critical(),
            stalled_average_below: default_stalled_average_below(),
            compliance_share: default_compliance_share(),
        }
    }
}

fn default_early_stage_below() -> u32 {
    5
}

fn default_early_stage_high() -> f64 {
    0.25
}

fn default_early_stage_critical() -> f64 {
    0.40
}

fn default_stalled_average_below() -> f64 {
    4.0
}

fn default_compliance_share() -> f64 {
    0.50
}

/// Division allow / exclude lists, matched by prefix (`"2 - IL"`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct DivisionSelection {
    /// When non-empty, only divisions starting with one of these are kept
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,

    /// Divisions starting with one of these are dropped
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
}

impl DivisionSelection {
    /// Whether neither list has entries.
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }
}

/// Policies for behavior the source data leaves ambiguous.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct Policy {
    /// How certification expiration dates affect validity
    pub expiration: ExpirationPolicy,

    /// Which lifecycle step an operator's gap is measured against
    pub gap_target: GapTarget,
}

/// How certification expiration dates affect validity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExpirationPolicy {
    /// Expiration dates are never considered.
    Ignore,
    /// A record is invalid only when an explicit expiration is in the past.
    #[default]
    Explicit,
    /// A record without an expiration date is invalid as well.
    Require,
}

/// Which lifecycle step a compliance gap targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum GapTarget {
    /// The next step; operators at a final step are checked against it.
    #[default]
    Next,
    /// Always the operator's current step.
    Current,
}

/// Report output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct ReportSettings {
    /// Path of the JSON report written by `opcert analyze`
    pub output: PathBuf,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            output: PathBuf::from("generated/opcert_report.json"),
        }
    }
}
