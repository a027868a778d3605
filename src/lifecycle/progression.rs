//! Operator journeys and next-step progression.

use super::schema::{LifecycleSchema, LifecycleStep};
use crate::diagnostics::{Finding, FindingKind};
use crate::ingest::StatusChangeEvent;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Time spent in one status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stage {
    pub status: String,
    pub status_id: String,
    pub entered_at: Option<NaiveDateTime>,
    /// `None` for the open-ended current stage or an unknown next time.
    pub exited_at: Option<NaiveDateTime>,
    /// Whole days in the stage, truncated; 0 when an endpoint is unknown.
    pub days: i64,
    /// The stage the operator is still in.
    pub current: bool,
}

/// An operator's chronological path through the lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperatorJourney {
    pub operator_id: String,
    pub division_id: Option<String>,
    pub stages: Vec<Stage>,
    pub current_status: Option<String>,
    /// Sum of the stages' truncated `days`. Each closed stage drops its
    /// fractional day, so this can trail the whole days between the first
    /// event and `now` by up to one day per closed stage.
    pub total_days: i64,
}

/// Whole days between two instants, never negative.
fn whole_days(start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> i64 {
    match (start, end) {
        (Some(start), Some(end)) => (end - start).num_days().max(0),
        _ => 0,
    }
}

/// Build one operator's journey from their status-change events.
///
/// Exact duplicates (same status id and raw timestamp) collapse into one
/// stage. Events sort by timestamp; an unparseable timestamp sorts first
/// and keeps its input position among other unparseable ones. The last
/// stage runs until `now`.
pub fn build_journey<'a, I>(
    operator_id: &str,
    events: I,
    schema: &LifecycleSchema,
    now: NaiveDateTime,
) -> (OperatorJourney, Vec<Finding>)
where
    I: IntoIterator<Item = &'a StatusChangeEvent>,
{
    let mut findings = Vec::new();
    let mut seen = HashSet::new();
    let mut duplicates = 0usize;
    let mut events: Vec<&StatusChangeEvent> = events
        .into_iter()
        .filter(|&e| {
            let fresh = seen.insert((e.status_id.as_str(), e.timestamp_raw.as_str()));
            if !fresh {
                duplicates += 1;
            }
            fresh
        })
        .collect();

    if duplicates > 0 {
        findings.push(
            Finding::new(
                FindingKind::DuplicateEvent,
                format!("{} duplicate status events collapsed", duplicates),
            )
            .with_operator(operator_id),
        );
    }

    events.sort_by_key(|e| e.timestamp.unwrap_or(NaiveDateTime::MIN));

    for event in events.iter().filter(|e| e.timestamp.is_none()) {
        findings.push(
            Finding::new(
                FindingKind::UnparseableTimestamp,
                format!(
                    "Event for status {} has unparseable timestamp '{}'",
                    event.status_id, event.timestamp_raw
                ),
            )
            .with_operator(operator_id)
            .with_subject(event.timestamp_raw.clone()),
        );
    }

    let mut stages = Vec::with_capacity(events.len());
    for (i, event) in events.iter().enumerate() {
        let status = match schema.status_name(&event.status_id) {
            Some(name) => name.to_string(),
            None => {
                findings.push(
                    Finding::new(
                        FindingKind::UnresolvedEventStatus,
                        format!("Status id {} matches no status type", event.status_id),
                    )
                    .with_operator(operator_id)
                    .with_subject(event.status_id.clone()),
                );
                event.status_id.clone()
            }
        };

        let current = i + 1 == events.len();
        let exited_at = events.get(i + 1).and_then(|next| next.timestamp);
        let end = if current { Some(now) } else { exited_at };

        stages.push(Stage {
            status,
            status_id: event.status_id.clone(),
            entered_at: event.timestamp,
            exited_at,
            days: whole_days(event.timestamp, end),
            current,
        });
    }

    let journey = OperatorJourney {
        operator_id: operator_id.to_string(),
        division_id: events.first().and_then(|e| e.division_id.clone()),
        current_status: stages.last().map(|s| s.status.clone()),
        total_days: stages.iter().map(|s| s.days).sum(),
        stages,
    };
    (journey, findings)
}

/// Where an operator goes from their current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progression<'a> {
    /// The lowest-order step above the current one.
    Next {
        current: &'a LifecycleStep,
        next: &'a LifecycleStep,
    },
    /// The current step has the highest order in the division.
    Final(&'a LifecycleStep),
    /// The current status is not a step of the division.
    UnknownStatus,
}

impl<'a> Progression<'a> {
    /// The operator's current step, when known.
    pub fn current(&self) -> Option<&'a LifecycleStep> {
        match *self {
            Progression::Next { current, .. } | Progression::Final(current) => Some(current),
            Progression::UnknownStatus => None,
        }
    }

    /// Name of the next step as shown in reports.
    pub fn label(&self) -> &'a str {
        match *self {
            Progression::Next { next, .. } => next.status_name.as_str(),
            Progression::Final(_) => "FINAL STATUS",
            Progression::UnknownStatus => "UNKNOWN STATUS",
        }
    }
}

/// Find the step after `current_status` in `division`.
pub fn next_step<'a>(
    current_status: &str,
    division: &str,
    schema: &'a LifecycleSchema,
) -> Progression<'a> {
    let Some(current) = schema.step(division, current_status) else {
        return Progression::UnknownStatus;
    };
    let order = current.sort_order();
    match schema
        .steps(division)
        .iter()
        .find(|step| step.sort_order() > order)
    {
        Some(next) => Progression::Next { current, next },
        None => Progression::Final(current),
    }
}

/// Time spent per status across all journeys.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageDurationStats {
    pub status: String,
    pub order: Option<u32>,
    pub operators: usize,
    pub stages: usize,
    pub avg_days: f64,
    pub min_days: i64,
    pub max_days: i64,
}

/// Duration statistics per status name, slowest first.
pub fn stage_durations(
    journeys: &[OperatorJourney],
    schema: &LifecycleSchema,
) -> Vec<StageDurationStats> {
    struct Acc {
        days: Vec<i64>,
        operators: BTreeSet<String>,
        order: Option<u32>,
    }

    let mut by_status: BTreeMap<&str, Acc> = BTreeMap::new();
    for journey in journeys {
        for stage in &journey.stages {
            let order = journey
                .division_id
                .as_deref()
                .and_then(|d| schema.order_of(d, &stage.status));
            let acc = by_status.entry(stage.status.as_str()).or_insert_with(|| Acc {
                days: Vec::new(),
                operators: BTreeSet::new(),
                order: None,
            });
            acc.days.push(stage.days);
            acc.operators.insert(journey.operator_id.clone());
            acc.order = match (acc.order, order) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            };
        }
    }

    let mut stats: Vec<StageDurationStats> = by_status
        .into_iter()
        .map(|(status, acc)| StageDurationStats {
            status: status.to_string(),
            order: acc.order,
            operators: acc.operators.len(),
            stages: acc.days.len(),
            avg_days: acc.days.iter().sum::<i64>() as f64 / acc.days.len() as f64,
            min_days: acc.days.iter().copied().min().unwrap_or(0),
            max_days: acc.days.iter().copied().max().unwrap_or(0),
        })
        .collect();

    stats.sort_by(|a, b| {
        b.avg_days
            .total_cmp(&a.avg_days)
            .then_with(|| a.status.cmp(&b.status))
    });
    stats
}

/// Journey statistics for one division.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DivisionJourneyStats {
    pub division: String,
    pub operators: usize,
    pub avg_total_days: f64,
    pub avg_stages: f64,
    pub slowest_status: Option<String>,
    pub slowest_status_avg_days: f64,
}

/// Compare journeys between divisions, longest average journey first.
///
/// Journeys without stages are left out of the averages.
pub fn division_journey_stats(journeys: &[OperatorJourney]) -> Vec<DivisionJourneyStats> {
    let mut by_division: BTreeMap<&str, Vec<&OperatorJourney>> = BTreeMap::new();
    for journey in journeys.iter().filter(|j| !j.stages.is_empty()) {
        if let Some(division) = journey.division_id.as_deref() {
            by_division.entry(division).or_default().push(journey);
        }
    }

    let mut stats: Vec<DivisionJourneyStats> = by_division
        .into_iter()
        .map(|(division, journeys)| {
            let count = journeys.len() as f64;
            let mut status_days: BTreeMap<&str, (i64, usize)> = BTreeMap::new();
            for stage in journeys.iter().flat_map(|j| j.stages.iter()) {
                let entry = status_days.entry(stage.status.as_str()).or_default();
                entry.0 += stage.days;
                entry.1 += 1;
            }
            let slowest = status_days
                .into_iter()
                .map(|(status, (days, n))| (status, days as f64 / n as f64))
                .fold(None, |best: Option<(&str, f64)>, (status, avg)| match best {
                    Some((_, best_avg)) if best_avg >= avg => best,
                    _ => Some((status, avg)),
                });

            DivisionJourneyStats {
                division: division.to_string(),
                operators: journeys.len(),
                avg_total_days: journeys.iter().map(|j| j.total_days).sum::<i64>() as f64 / count,
                avg_stages: journeys.iter().map(|j| j.stages.len()).sum::<usize>() as f64 / count,
                slowest_status: slowest.map(|(s, _)| s.to_string()),
                slowest_status_avg_days: slowest.map(|(_, avg)| avg).unwrap_or(0.0),
            }
        })
        .collect();

    stats.sort_by(|a, b| {
        b.avg_total_days
            .total_cmp(&a.avg_total_days)
            .then_with(|| a.division.cmp(&b.division))
    });
    stats
}
