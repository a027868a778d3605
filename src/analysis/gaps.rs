//! Per-operator compliance gaps.

use crate::config::GapTarget;
use crate::ingest::Operator;
use crate::lifecycle::{next_step, LifecycleSchema, LifecycleStep, Progression};
use crate::normalize::{best_match, NormalizedKey, DEFAULT_FUZZY_THRESHOLD};
use crate::requirements::{Holdings, RequirementLookup, RequirementSet};
use serde::Serialize;
use std::collections::BTreeMap;

/// A certification by key and display name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct CertRef {
    pub key: NormalizedKey,
    pub name: String,
}

/// The step a gap is measured against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetStep {
    pub status: String,
    pub order: Option<u32>,
}

impl From<&LifecycleStep> for TargetStep {
    fn from(step: &LifecycleStep) -> Self {
        Self {
            status: step.status_name.clone(),
            order: step.order,
        }
    }
}

/// Where the operator stands in their lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressionState {
    HasNext,
    Final,
    UnknownStatus,
}

/// Why `required` holds what it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RequirementBasis {
    /// The operator's status is not part of their division's lifecycle.
    NoTarget,
    /// Nobody is currently at the target step.
    NoData,
    /// The target step has too few operators to infer requirements.
    InsufficientSample { population: usize },
    /// Requirements were inferred (possibly none).
    Computed,
}

/// A held certification that looks like a missing one. Advisory only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamingHint {
    pub missing: String,
    pub held: String,
    pub ratio: f64,
}

/// Options for gap computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GapOptions {
    pub target: GapTarget,
    pub fuzzy_threshold: f64,
}

impl Default for GapOptions {
    fn default() -> Self {
        Self {
            target: GapTarget::Next,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
        }
    }
}

/// Compliance of one operator against their target step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceGap {
    pub operator_id: String,
    pub operator_name: String,
    pub division: String,
    pub current_status: String,
    pub progression: ProgressionState,
    /// Next step name, `FINAL STATUS` or `UNKNOWN STATUS`.
    pub next_status: String,
    pub target: Option<TargetStep>,
    pub basis: RequirementBasis,
    pub required: Vec<CertRef>,
    pub has: Vec<CertRef>,
    pub satisfied: Vec<CertRef>,
    pub missing: Vec<CertRef>,
    pub progress_percent: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub naming_hints: Vec<NamingHint>,
}

impl ComplianceGap {
    /// Requirements were computed and all of them are held.
    pub fn is_ready(&self) -> bool {
        self.basis == RequirementBasis::Computed && self.missing.is_empty()
    }

    pub fn has_gap(&self) -> bool {
        !self.missing.is_empty()
    }
}

/// Percentage of `required` that is satisfied; 100 when nothing is required.
pub fn progress_percent(satisfied: usize, required: usize) -> u32 {
    if required == 0 {
        return 100;
    }
    (100.0 * satisfied as f64 / required as f64).round() as u32
}

/// Compute an operator's gap against their target step.
///
/// Only exact normalized matches satisfy a requirement. Fuzzy similarity
/// between missing and held names is reported in `naming_hints` and
/// nothing else.
pub fn compute_gap(
    operator: &Operator,
    holdings: &Holdings,
    requirements: &RequirementSet,
    schema: &LifecycleSchema,
    options: &GapOptions,
) -> ComplianceGap {
    let division = operator.division_id.as_str();
    let progression = next_step(&operator.current_status, division, schema);

    let (state, target) = match (progression, options.target) {
        (Progression::Next { next, .. }, GapTarget::Next) => (ProgressionState::HasNext, Some(next)),
        (Progression::Next { current, .. }, GapTarget::Current) => {
            (ProgressionState::HasNext, Some(current))
        }
        (Progression::Final(current), _) => (ProgressionState::Final, Some(current)),
        (Progression::UnknownStatus, _) => (ProgressionState::UnknownStatus, None),
    };

    let held = holdings.held_by(&operator.id);
    let has: Vec<CertRef> = held
        .iter()
        .map(|key| CertRef {
            key: key.clone(),
            name: holdings.display_name(key),
        })
        .collect();

    let (basis, required) = match target {
        None => (RequirementBasis::NoTarget, Vec::new()),
        Some(step) => match requirements.required(division, &step.status_name) {
            RequirementLookup::NoData => (RequirementBasis::NoData, Vec::new()),
            RequirementLookup::InsufficientSample { population } => {
                (RequirementBasis::InsufficientSample { population }, Vec::new())
            }
            RequirementLookup::Computed { required } => {
                let entry = requirements.get(division, &step.status_name);
                let refs = required
                    .into_iter()
                    .map(|key| {
                        let name = entry
                            .and_then(|e| e.certification(&key))
                            .map(|c| c.name.clone())
                            .unwrap_or_else(|| holdings.display_name(&key));
                        CertRef { key, name }
                    })
                    .collect();
                (RequirementBasis::Computed, refs)
            }
        },
    };

    let (satisfied, missing): (Vec<CertRef>, Vec<CertRef>) =
        required.iter().cloned().partition(|c| held.contains(&c.key));

    let naming_hints = missing
        .iter()
        .filter_map(|m| {
            let candidates = has.iter().map(|h| h.name.as_str());
            best_match(&m.name, candidates, options.fuzzy_threshold).map(|found| NamingHint {
                missing: m.name.clone(),
                held: found.candidate,
                ratio: found.ratio,
            })
        })
        .collect();

    ComplianceGap {
        operator_id: operator.id.clone(),
        operator_name: operator.display_name(),
        division: operator.division_id.clone(),
        current_status: operator.current_status.clone(),
        progression: state,
        next_status: progression.label().to_string(),
        target: target.map(TargetStep::from),
        basis,
        progress_percent: progress_percent(satisfied.len(), required.len()),
        required,
        has,
        satisfied,
        missing,
        naming_hints,
    }
}

/// Gap counts for one status or division.
///
/// Every operator lands in exactly one bucket: requirements computed and
/// held (`compliant`), computed and not held (`non_compliant`), nobody at
/// the target step (`no_requirement`), a target step too small to infer
/// from (`insufficient_sample`), or a status outside the lifecycle
/// (`unknown_status`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GapTally {
    pub operators: usize,
    pub compliant: usize,
    pub non_compliant: usize,
    pub no_requirement: usize,
    pub insufficient_sample: usize,
    pub unknown_status: usize,
    /// How often each certification is missing.
    pub missing: BTreeMap<String, usize>,
}

impl GapTally {
    fn add(&mut self, gap: &ComplianceGap) {
        self.operators += 1;
        match gap.basis {
            RequirementBasis::Computed if gap.has_gap() => {
                self.non_compliant += 1;
                for cert in &gap.missing {
                    *self.missing.entry(cert.name.clone()).or_default() += 1;
                }
            }
            RequirementBasis::Computed => self.compliant += 1,
            RequirementBasis::NoData => self.no_requirement += 1,
            RequirementBasis::InsufficientSample { .. } => self.insufficient_sample += 1,
            RequirementBasis::NoTarget => self.unknown_status += 1,
        }
    }
}

/// Gaps aggregated by current status and by division.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GapSummary {
    pub total: GapTally,
    pub by_status: BTreeMap<String, GapTally>,
    pub by_division: BTreeMap<String, GapTally>,
}

/// Aggregate gaps by current status and division.
pub fn summarize_gaps(gaps: &[ComplianceGap]) -> GapSummary {
    let mut summary = GapSummary::default();
    for gap in gaps {
        summary.total.add(gap);
        summary
            .by_status
            .entry(gap.current_status.clone())
            .or_default()
            .add(gap);
        summary
            .by_division
            .entry(gap.division.clone())
            .or_default()
            .add(gap);
    }
    summary
}
