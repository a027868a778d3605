//! Lifecycle step definitions per division.
//!
//! Status types describe every status of every lifecycle the source system
//! knows: operators, fleet vehicles and providers. Only operator statuses
//! that are live and resolve to an operator coarse status become
//! [`LifecycleStep`]s.

use crate::config::DivisionSelection;
use crate::diagnostics::{Finding, FindingKind};
use crate::ingest::{CoarseStatus, StatusType};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Order given to steps without a numeric order; they sort last.
pub const UNORDERED: u32 = 999;

/// One step of a division's lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LifecycleStep {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub division_id: String,
    pub status_name: String,
    pub order: Option<u32>,
    pub cert_gate: bool,
}

impl LifecycleStep {
    /// Effective order used for sorting and progression.
    pub fn sort_order(&self) -> u32 {
        self.order.unwrap_or(UNORDERED)
    }
}

/// Division allow / exclude lists, matched by prefix.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DivisionFilter {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl DivisionFilter {
    pub fn new(include: Vec<String>, exclude: Vec<String>) -> Self {
        Self { include, exclude }
    }

    /// A filter that allows every division.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn from_selection(selection: &DivisionSelection) -> Self {
        Self::new(selection.include.clone(), selection.exclude.clone())
    }

    /// Whether `division` passes: it must match an include prefix when any
    /// are given, and must match no exclude prefix.
    pub fn allows(&self, division: &str) -> bool {
        let included = self.include.is_empty()
            || self.include.iter().any(|p| division.starts_with(p.as_str()));
        included && !self.exclude.iter().any(|p| division.starts_with(p.as_str()))
    }
}

/// Ordered lifecycle steps of every division.
#[derive(Debug, Clone, Default)]
pub struct LifecycleSchema {
    divisions: BTreeMap<String, Vec<LifecycleStep>>,
    status_names: HashMap<String, String>,
    /// Data-quality findings raised while building the schema.
    pub findings: Vec<Finding>,
}

impl LifecycleSchema {
    /// Ordered steps of a division; empty for unknown divisions.
    pub fn steps(&self, division: &str) -> &[LifecycleStep] {
        self.divisions.get(division).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Known divisions with their ordered steps.
    pub fn divisions(&self) -> impl Iterator<Item = (&str, &[LifecycleStep])> {
        self.divisions
            .iter()
            .map(|(division, steps)| (division.as_str(), steps.as_slice()))
    }

    pub fn has_division(&self, division: &str) -> bool {
        self.divisions.contains_key(division)
    }

    /// The step named `status` in `division`.
    pub fn step(&self, division: &str, status: &str) -> Option<&LifecycleStep> {
        self.steps(division)
            .iter()
            .find(|step| step.status_name == status)
    }

    /// Effective order of `status` in `division`.
    pub fn order_of(&self, division: &str, status: &str) -> Option<u32> {
        self.step(division, status).map(LifecycleStep::sort_order)
    }

    /// Status name of a status-type id, including filtered-out types.
    pub fn status_name(&self, status_id: &str) -> Option<&str> {
        self.status_names.get(status_id).map(String::as_str)
    }

    /// Total number of steps across divisions.
    pub fn step_count(&self) -> usize {
        self.divisions.values().map(Vec::len).sum()
    }
}

/// Build the lifecycle schema from raw status types.
///
/// Status types are dropped when soft-deleted, fleet, provider, not backed
/// by an operator coarse status, or outside `filter`. A division left with
/// no steps is kept with an empty list.
pub fn build_lifecycle_steps(
    status_types: &[StatusType],
    coarse_statuses: &[CoarseStatus],
    filter: &DivisionFilter,
) -> LifecycleSchema {
    let is_operator: HashMap<&str, bool> = coarse_statuses
        .iter()
        .map(|c| (c.id.as_str(), c.is_operator))
        .collect();

    let mut schema = LifecycleSchema::default();
    let mut dropped = 0usize;

    for st in status_types {
        if let Some(id) = &st.id {
            schema
                .status_names
                .entry(id.clone())
                .or_insert_with(|| st.status_name.clone());
        }

        if !filter.allows(&st.division_id) {
            continue;
        }
        let steps = schema.divisions.entry(st.division_id.clone()).or_default();

        let operator_status = st
            .coarse_status_id
            .as_deref()
            .and_then(|id| is_operator.get(id))
            .copied()
            .unwrap_or(false);
        if st.is_deleted || st.is_fleet || st.is_provider || !operator_status {
            dropped += 1;
            continue;
        }

        steps.push(LifecycleStep {
            id: st.id.clone(),
            division_id: st.division_id.clone(),
            status_name: st.status_name.clone(),
            order: st.order,
            cert_gate: st.cert_gate,
        });
    }

    let mut findings = Vec::new();
    for (division, steps) in schema.divisions.iter_mut() {
        steps.sort_by(|a, b| {
            a.sort_order()
                .cmp(&b.sort_order())
                .then_with(|| a.status_name.cmp(&b.status_name))
        });

        let mut names_by_order: BTreeMap<u32, BTreeSet<&str>> = BTreeMap::new();
        for step in steps.iter() {
            match step.order {
                Some(order) => {
                    names_by_order
                        .entry(order)
                        .or_default()
                        .insert(step.status_name.as_str());
                }
                None => findings.push(
                    Finding::new(
                        FindingKind::MissingOrder,
                        format!(
                            "Status '{}' has no numeric order; sorted last",
                            step.status_name
                        ),
                    )
                    .with_division(division.clone())
                    .with_status(step.status_name.clone()),
                ),
            }
        }

        for (order, names) in names_by_order.iter().filter(|(_, n)| n.len() > 1) {
            let listed: Vec<&str> = names.iter().copied().collect();
            findings.push(
                Finding::new(
                    FindingKind::DuplicateOrder,
                    format!("Order {} maps to {} statuses: {}", order, names.len(), listed.join(", ")),
                )
                .with_division(division.clone())
                .with_subject(order.to_string()),
            );
        }
    }
    schema.findings = findings;

    tracing::debug!(
        "Lifecycle: {} divisions, {} steps, {} status types dropped",
        schema.divisions.len(),
        schema.step_count(),
        dropped
    );
    schema
}
