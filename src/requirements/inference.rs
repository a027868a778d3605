//! Requirement inference.
//!
//! For every occupied lifecycle step, count the distinct operators holding
//! each certification and classify the resulting adoption.

use super::classification::{classify, Classification};
use super::holdings::{Holdings, OperatorIndex, StepKey};
use crate::config::Thresholds;
use crate::diagnostics::{Finding, FindingKind};
use crate::lifecycle::{LifecycleSchema, LifecycleStep};
use crate::normalize::NormalizedKey;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};

/// Adoption of one certification at one step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdoptionInfo {
    pub key: NormalizedKey,
    pub name: String,
    pub holders: usize,
    pub population: usize,
    /// Unrounded fraction used for classification.
    pub adoption: f64,
    pub classification: Classification,
}

impl AdoptionInfo {
    /// Adoption in percent, rounded to one decimal for display.
    pub fn percentage(&self) -> f64 {
        (self.adoption * 1000.0).round() / 10.0
    }
}

/// Whether a step's population supports REQUIRED classifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleStatus {
    Sufficient,
    Insufficient,
}

/// Adoption table of one lifecycle step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepRequirements {
    pub step: StepKey,
    pub order: Option<u32>,
    pub population: usize,
    pub sample: SampleStatus,
    /// The step is flagged as a certification gate in the status types.
    pub cert_gate: bool,
    /// Sorted by adoption, highest first.
    pub certifications: Vec<AdoptionInfo>,
}

impl StepRequirements {
    /// Keys classified as REQUIRED.
    pub fn required_keys(&self) -> BTreeSet<NormalizedKey> {
        self.with_classification(Classification::Required)
            .map(|c| c.key.clone())
            .collect()
    }

    pub fn with_classification(
        &self,
        classification: Classification,
    ) -> impl Iterator<Item = &AdoptionInfo> {
        self.certifications
            .iter()
            .filter(move |c| c.classification == classification)
    }

    pub fn certification(&self, key: &NormalizedKey) -> Option<&AdoptionInfo> {
        self.certifications.iter().find(|c| &c.key == key)
    }
}

impl Serialize for StepRequirements {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Certification<'a> {
            key: &'a NormalizedKey,
            name: &'a str,
            holders: usize,
            adoption: f64,
            percentage: f64,
            classification: Classification,
        }

        #[derive(Serialize)]
        struct Step<'a> {
            division: &'a str,
            status: &'a str,
            order: Option<u32>,
            cert_gate: bool,
            population: usize,
            sample: SampleStatus,
            certifications: Vec<Certification<'a>>,
        }

        Step {
            division: &self.step.division,
            status: &self.step.status,
            order: self.order,
            cert_gate: self.cert_gate,
            population: self.population,
            sample: self.sample,
            certifications: self
                .certifications
                .iter()
                .map(|c| Certification {
                    key: &c.key,
                    name: &c.name,
                    holders: c.holders,
                    adoption: c.adoption,
                    percentage: c.percentage(),
                    classification: c.classification,
                })
                .collect(),
        }
        .serialize(serializer)
    }
}

/// What is known about a step's REQUIRED set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequirementLookup {
    /// No operator is currently at the step.
    NoData,
    /// The population is too small for REQUIRED classifications.
    InsufficientSample { population: usize },
    /// Computed; may be empty when nothing reaches the threshold.
    Computed { required: BTreeSet<NormalizedKey> },
}

/// Classified adoption tables of every occupied step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequirementSet {
    steps: BTreeMap<StepKey, StepRequirements>,
}

impl Serialize for RequirementSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.steps.values())
    }
}

impl RequirementSet {
    pub fn get(&self, division: &str, status: &str) -> Option<&StepRequirements> {
        self.steps.get(&StepKey::new(division, status))
    }

    /// REQUIRED certifications of a step, distinguishing missing data from
    /// an insufficient sample.
    pub fn required(&self, division: &str, status: &str) -> RequirementLookup {
        match self.get(division, status) {
            None => RequirementLookup::NoData,
            Some(entry) if entry.sample == SampleStatus::Insufficient => {
                RequirementLookup::InsufficientSample {
                    population: entry.population,
                }
            }
            Some(entry) => RequirementLookup::Computed {
                required: entry.required_keys(),
            },
        }
    }

    /// Entries in (division, status) order.
    pub fn iter(&self) -> impl Iterator<Item = &StepRequirements> {
        self.steps.values()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Fill in each entry's lifecycle order and gate flag.
    pub fn annotate_steps(&mut self, schema: &LifecycleSchema) {
        for entry in self.steps.values_mut() {
            let step = schema.step(&entry.step.division, &entry.step.status);
            entry.order = step.map(LifecycleStep::sort_order);
            entry.cert_gate = step.is_some_and(|s| s.cert_gate);
        }
    }

    /// One finding per step with an insufficient sample.
    pub fn sample_findings(&self, min_sample_size: usize) -> Vec<Finding> {
        self.iter()
            .filter(|entry| entry.sample == SampleStatus::Insufficient)
            .map(|entry| {
                Finding::new(
                    FindingKind::InsufficientSample,
                    format!(
                        "Only {} operator(s) at this step; REQUIRED needs at least {}",
                        entry.population, min_sample_size
                    ),
                )
                .with_division(entry.step.division.clone())
                .with_status(entry.step.status.clone())
            })
            .collect()
    }
}

/// Infer classified requirements for every occupied step.
///
/// Certifications are grouped by each holder's current step. Adoption is
/// distinct holders over the step's full population, holders or not.
pub fn infer_requirements(
    holdings: &Holdings,
    operators: &OperatorIndex,
    thresholds: &Thresholds,
) -> RequirementSet {
    let mut set = RequirementSet::default();

    for (step, members) in operators.steps() {
        let population = members.len();
        if population == 0 {
            continue;
        }

        let mut holders: BTreeMap<&NormalizedKey, usize> = BTreeMap::new();
        for id in members {
            for key in holdings.held_by(id) {
                *holders.entry(key).or_default() += 1;
            }
        }

        let mut certifications: Vec<AdoptionInfo> = holders
            .into_iter()
            .map(|(key, count)| {
                let adoption = count as f64 / population as f64;
                AdoptionInfo {
                    key: key.clone(),
                    name: holdings.display_name(key),
                    holders: count,
                    population,
                    adoption,
                    classification: classify(adoption, population, thresholds),
                }
            })
            .collect();
        certifications.sort_by(|a, b| {
            b.adoption
                .total_cmp(&a.adoption)
                .then_with(|| a.name.cmp(&b.name))
        });

        let sample = if population < thresholds.min_sample_size {
            SampleStatus::Insufficient
        } else {
            SampleStatus::Sufficient
        };

        set.steps.insert(
            step.clone(),
            StepRequirements {
                step: step.clone(),
                order: None,
                cert_gate: false,
                population,
                sample,
                certifications,
            },
        );
    }

    tracing::debug!("Inferred requirements for {} steps", set.len());
    set
}
