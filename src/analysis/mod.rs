//! Compliance gaps, bottlenecks and the end-to-end pipeline.
//!
//! - [`gaps`] - Per-operator compliance against the target step
//! - [`bottleneck`] - Concentration, division health and empty steps
//! - [`recommendations`] - Prioritised actions drawn from the findings
//! - [`pipeline`] - Runs every stage and assembles the report

pub mod bottleneck;
pub mod gaps;
pub mod pipeline;
pub mod recommendations;

pub use bottleneck::{
    division_concentration, division_health, empty_steps, health_band, status_concentration,
    BottleneckReport, BottleneckSeverity, DivisionConcentration, DivisionHealth, EmptyStep,
    HealthBand, StatusConcentration,
};
pub use gaps::{
    compute_gap, progress_percent, summarize_gaps, CertRef, ComplianceGap, GapOptions,
    GapSummary, GapTally, NamingHint, ProgressionState, RequirementBasis, TargetStep,
};
pub use pipeline::{
    resolve_as_of, Analysis, AnalysisReport, DivisionLifecycle, ReportSummary,
};
pub use recommendations::{recommend, Category, Priority, Recommendation, RecommendationInputs};
