//! End-to-end analysis run.
//!
//! [`Analysis`] owns everything fixed for one run (validated config, alias
//! table, division filter, reference time) and turns a [`Dataset`] into an
//! [`AnalysisReport`]. Every stage is recomputed from scratch.

use super::bottleneck::{
    division_concentration, division_health, empty_steps, status_concentration, BottleneckReport,
};
use super::gaps::{compute_gap, summarize_gaps, ComplianceGap, GapOptions, GapSummary, ProgressionState};
use super::recommendations::{recommend, Recommendation, RecommendationInputs};
use crate::config::{validate, AnalysisConfig, DataSources};
use crate::diagnostics::{sort_findings, summarize, Finding, FindingKind, FindingSummary};
use crate::error::{OpcertError, Result};
use crate::ingest::{parse_timestamp, Dataset, Operator, StatusChangeEvent};
use crate::lifecycle::{
    build_journey, build_lifecycle_steps, division_journey_stats, stage_durations,
    DivisionFilter, LifecycleSchema, LifecycleStep, OperatorJourney,
};
use crate::normalize::{naming_drift, AliasTable, DriftReport};
use crate::requirements::{infer_requirements, Holdings, OperatorIndex, RequirementSet};
use chrono::{NaiveDateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Resolve the run's reference time.
///
/// An explicit value (from `--as-of`) wins over `data.as_of`; without
/// either the wall clock is used.
pub fn resolve_as_of(explicit: Option<&str>, sources: &DataSources) -> Result<NaiveDateTime> {
    match explicit.or(sources.as_of.as_deref()) {
        Some(raw) => parse_timestamp(raw).ok_or_else(|| OpcertError::ConfigValidationError {
            message: format!("as_of '{}' is not a recognized timestamp", raw),
        }),
        None => Ok(Utc::now().naive_utc()),
    }
}

/// Ordered steps of one division.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DivisionLifecycle {
    pub division: String,
    pub steps: Vec<LifecycleStep>,
}

/// Headline numbers of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportSummary {
    pub operators: usize,
    pub certification_records: usize,
    /// Records that counted toward a holding.
    pub counted_records: usize,
    pub events: usize,
    pub divisions: usize,
    pub steps: usize,
    pub requirement_entries: usize,
    pub operators_with_gaps: usize,
    pub operators_ready: usize,
    /// Average total journey length over journeys with at least one stage.
    pub average_journey_days: f64,
}

/// Everything one analysis run produces.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub generated_at: NaiveDateTime,
    pub as_of: NaiveDateTime,
    pub summary: ReportSummary,
    pub lifecycle: Vec<DivisionLifecycle>,
    pub requirements: RequirementSet,
    pub journeys: Vec<OperatorJourney>,
    pub gaps: Vec<ComplianceGap>,
    pub gap_summary: GapSummary,
    pub bottlenecks: BottleneckReport,
    pub recommendations: Vec<Recommendation>,
    pub naming: DriftReport,
    pub findings: Vec<Finding>,
    pub finding_summary: FindingSummary,
}

impl AnalysisReport {
    /// Gap of a single operator.
    pub fn gap(&self, operator_id: &str) -> Option<&ComplianceGap> {
        self.gaps.iter().find(|g| g.operator_id == operator_id)
    }

    /// Journey of a single operator.
    pub fn journey(&self, operator_id: &str) -> Option<&OperatorJourney> {
        self.journeys.iter().find(|j| j.operator_id == operator_id)
    }
}

/// A configured analysis run.
#[derive(Debug, Clone)]
pub struct Analysis {
    config: AnalysisConfig,
    aliases: AliasTable,
    filter: DivisionFilter,
    as_of: NaiveDateTime,
}

impl Analysis {
    /// Validate `config` and prepare a run at `as_of`.
    pub fn new(config: AnalysisConfig, as_of: NaiveDateTime) -> Result<Self> {
        validate(&config)?;
        let aliases = AliasTable::from_config(&config.aliases)?;
        let filter = DivisionFilter::from_selection(&config.divisions);
        Ok(Self {
            config,
            aliases,
            filter,
            as_of,
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn as_of(&self) -> NaiveDateTime {
        self.as_of
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Run every stage over `dataset`.
    ///
    /// Operators outside the division filter are dropped together with
    /// their certification records and events.
    pub fn run(&self, dataset: &Dataset) -> AnalysisReport {
        let thresholds = &self.config.thresholds;
        let policy = &self.config.policy;
        let mut findings = dataset.findings.clone();

        let schema = build_lifecycle_steps(
            &dataset.status_types,
            &dataset.coarse_statuses,
            &self.filter,
        );
        findings.extend(schema.findings.iter().cloned());

        let (operators, excluded) = self.select_operators(&dataset.operators);
        let index = OperatorIndex::from_operators(&operators);
        let certifications: Vec<_> = dataset
            .certifications
            .iter()
            .filter(|c| {
                c.operator_id
                    .as_deref()
                    .map_or(true, |id| !excluded.contains(id))
            })
            .cloned()
            .collect();
        tracing::debug!(
            "{} operators in scope, {} excluded by division filter",
            index.len(),
            excluded.len()
        );

        let holdings = Holdings::collect(
            &certifications,
            &index,
            &self.aliases,
            policy.expiration,
            self.as_of,
        );
        findings.extend(holdings.findings.iter().cloned());

        let mut requirements = infer_requirements(&holdings, &index, thresholds);
        requirements.annotate_steps(&schema);
        findings.extend(requirements.sample_findings(thresholds.min_sample_size));

        let journeys =
            self.build_journeys(&dataset.events, &operators, &excluded, &schema, &mut findings);

        let options = GapOptions {
            target: policy.gap_target,
            fuzzy_threshold: thresholds.fuzzy_match,
        };
        let gaps = self.compute_gaps(&operators, &holdings, &requirements, &schema, &options, &mut findings);

        let bottlenecks = BottleneckReport {
            statuses: status_concentration(&index, thresholds),
            divisions: division_concentration(&index, thresholds),
            health: division_health(&index, &schema, &self.config.health),
            durations: stage_durations(&journeys, &schema),
            division_journeys: division_journey_stats(&journeys),
            empty_steps: empty_steps(&index, &schema),
        };

        let gap_summary = summarize_gaps(&gaps);
        let recommendations = recommend(&RecommendationInputs {
            operators: &index,
            schema: &schema,
            bottlenecks: &bottlenecks,
            gap_summary: &gap_summary,
            thresholds,
            rules: &self.config.recommendations,
        });

        let naming = naming_drift(&certifications, &operators, &self.aliases, thresholds.fuzzy_match);
        findings.extend(naming.findings());

        sort_findings(&mut findings);
        let finding_summary = summarize(&findings);

        let with_stages: Vec<i64> = journeys
            .iter()
            .filter(|j| !j.stages.is_empty())
            .map(|j| j.total_days)
            .collect();
        let summary = ReportSummary {
            operators: index.len(),
            certification_records: certifications.len(),
            counted_records: holdings.counted_records,
            events: journeys.iter().map(|j| j.stages.len()).sum(),
            divisions: schema.divisions().count(),
            steps: schema.step_count(),
            requirement_entries: requirements.len(),
            operators_with_gaps: gaps.iter().filter(|g| g.has_gap()).count(),
            operators_ready: gaps.iter().filter(|g| g.is_ready()).count(),
            average_journey_days: if with_stages.is_empty() {
                0.0
            } else {
                with_stages.iter().sum::<i64>() as f64 / with_stages.len() as f64
            },
        };

        tracing::info!(
            "Analyzed {} operators: {} requirement entries, {} with gaps, {} findings",
            summary.operators,
            summary.requirement_entries,
            summary.operators_with_gaps,
            finding_summary.total
        );

        AnalysisReport {
            generated_at: self.as_of,
            as_of: self.as_of,
            summary,
            lifecycle: lifecycle_of(&schema),
            gap_summary,
            requirements,
            journeys,
            gaps,
            bottlenecks,
            recommendations,
            naming,
            findings,
            finding_summary,
        }
    }

    /// Operators allowed by the division filter, first snapshot per id,
    /// plus the ids that were filtered out.
    fn select_operators(&self, all: &[Operator]) -> (Vec<Operator>, HashSet<String>) {
        let mut seen = HashSet::new();
        let mut excluded = HashSet::new();
        let mut kept = Vec::new();
        for op in all {
            if !self.filter.allows(&op.division_id) {
                excluded.insert(op.id.clone());
            } else if seen.insert(op.id.as_str()) {
                kept.push(op.clone());
            }
        }
        (kept, excluded)
    }

    /// One journey per operator in scope; operators without events get an
    /// empty one.
    fn build_journeys(
        &self,
        events: &[StatusChangeEvent],
        operators: &[Operator],
        excluded: &HashSet<String>,
        schema: &LifecycleSchema,
        findings: &mut Vec<Finding>,
    ) -> Vec<OperatorJourney> {
        let mut by_operator: BTreeMap<&str, Vec<&StatusChangeEvent>> = operators
            .iter()
            .map(|op| (op.id.as_str(), Vec::new()))
            .collect();
        let mut orphans: BTreeMap<&str, usize> = BTreeMap::new();
        for event in events {
            let id = event.operator_id.as_str();
            if excluded.contains(id) {
                continue;
            }
            match by_operator.get_mut(id) {
                Some(list) => list.push(event),
                None => *orphans.entry(id).or_default() += 1,
            }
        }

        for (id, count) in orphans {
            findings.push(
                Finding::new(
                    FindingKind::OrphanEvent,
                    format!("{} status events belong to unknown operator {}", count, id),
                )
                .with_operator(id),
            );
        }

        let divisions: BTreeMap<&str, &str> = operators
            .iter()
            .map(|op| (op.id.as_str(), op.division_id.as_str()))
            .collect();
        by_operator
            .into_iter()
            .map(|(id, events)| {
                let (mut journey, journey_findings) =
                    build_journey(id, events.iter().copied(), schema, self.as_of);
                if journey.division_id.is_none() {
                    journey.division_id = divisions.get(id).map(|d| d.to_string());
                }
                findings.extend(journey_findings);
                journey
            })
            .collect()
    }

    fn compute_gaps(
        &self,
        operators: &[Operator],
        holdings: &Holdings,
        requirements: &RequirementSet,
        schema: &LifecycleSchema,
        options: &GapOptions,
        findings: &mut Vec<Finding>,
    ) -> Vec<ComplianceGap> {
        let gaps: Vec<ComplianceGap> = operators
            .iter()
            .map(|op| compute_gap(op, holdings, requirements, schema, options))
            .collect();

        let mut unknown: BTreeMap<(&str, &str), usize> = BTreeMap::new();
        for gap in gaps
            .iter()
            .filter(|g| g.progression == ProgressionState::UnknownStatus)
        {
            *unknown
                .entry((gap.division.as_str(), gap.current_status.as_str()))
                .or_default() += 1;
        }
        for ((division, status), count) in unknown {
            findings.push(
                Finding::new(
                    FindingKind::UnknownStatus,
                    format!(
                        "{} operator(s) at '{}', which is not a lifecycle step of {}",
                        count, status, division
                    ),
                )
                .with_division(division)
                .with_status(status),
            );
        }
        gaps
    }
}

fn lifecycle_of(schema: &LifecycleSchema) -> Vec<DivisionLifecycle> {
    schema
        .divisions()
        .map(|(division, steps)| DivisionLifecycle {
            division: division.to_string(),
            steps: steps.to_vec(),
        })
        .collect()
}
