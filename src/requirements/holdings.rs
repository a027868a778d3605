//! Who holds which certification.

use crate::config::ExpirationPolicy;
use crate::diagnostics::{Finding, FindingKind};
use crate::ingest::{CertificationRecord, Operator};
use crate::normalize::{AliasTable, NormalizedKey};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

static NO_HOLDINGS: BTreeSet<NormalizedKey> = BTreeSet::new();

/// A lifecycle position: a status within a division.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct StepKey {
    pub division: String,
    pub status: String,
}

impl StepKey {
    pub fn new(division: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            division: division.into(),
            status: status.into(),
        }
    }
}

impl fmt::Display for StepKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.division, self.status)
    }
}

/// Operators by id and by current lifecycle position.
#[derive(Debug, Clone, Default)]
pub struct OperatorIndex {
    positions: BTreeMap<String, StepKey>,
    populations: BTreeMap<StepKey, BTreeSet<String>>,
}

impl OperatorIndex {
    /// Index operator snapshots. A repeated id keeps its first snapshot.
    pub fn from_operators(operators: &[Operator]) -> Self {
        let mut index = Self::default();
        for op in operators {
            if index.positions.contains_key(&op.id) {
                tracing::debug!("Operator {} appears more than once; keeping first", op.id);
                continue;
            }
            let step = StepKey::new(&op.division_id, &op.current_status);
            index
                .populations
                .entry(step.clone())
                .or_default()
                .insert(op.id.clone());
            index.positions.insert(op.id.clone(), step);
        }
        index
    }

    pub fn contains(&self, operator_id: &str) -> bool {
        self.positions.contains_key(operator_id)
    }

    /// Current position of an operator.
    pub fn step_of(&self, operator_id: &str) -> Option<&StepKey> {
        self.positions.get(operator_id)
    }

    /// Distinct operators currently at `step`.
    pub fn population(&self, step: &StepKey) -> usize {
        self.populations.get(step).map_or(0, BTreeSet::len)
    }

    /// Occupied steps with the ids of their operators, in step order.
    pub fn steps(&self) -> impl Iterator<Item = (&StepKey, &BTreeSet<String>)> {
        self.populations.iter()
    }

    /// Number of distinct operators.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Distinct valid certifications held by each operator.
#[derive(Debug, Clone, Default)]
pub struct Holdings {
    by_operator: BTreeMap<String, BTreeSet<NormalizedKey>>,
    display: BTreeMap<NormalizedKey, String>,
    /// Records that counted toward a holding.
    pub counted_records: usize,
    /// Orphaned records, one finding per unknown operator id.
    pub findings: Vec<Finding>,
}

impl Holdings {
    /// Collect holdings from certification records.
    ///
    /// A record counts when it is approved, not deleted, still valid at
    /// `as_of` under `policy`, and linked to a known operator.
    pub fn collect(
        records: &[CertificationRecord],
        operators: &OperatorIndex,
        aliases: &AliasTable,
        policy: ExpirationPolicy,
        as_of: NaiveDateTime,
    ) -> Self {
        let mut holdings = Self::default();
        let mut spellings: BTreeMap<NormalizedKey, BTreeMap<String, usize>> = BTreeMap::new();
        let mut unlinked = 0usize;
        let mut orphans: BTreeMap<&str, usize> = BTreeMap::new();

        for record in records {
            let operator_id = match record.operator_id.as_deref() {
                Some(id) if operators.contains(id) => id,
                Some(id) => {
                    *orphans.entry(id).or_default() += 1;
                    continue;
                }
                None => {
                    unlinked += 1;
                    continue;
                }
            };

            if !record.counts_toward_compliance() || !record.is_current(policy, as_of) {
                continue;
            }

            let key = aliases.key(&record.cert_name);
            if key.is_empty() {
                continue;
            }
            *spellings
                .entry(key.clone())
                .or_default()
                .entry(record.cert_name.trim().to_string())
                .or_default() += 1;
            holdings
                .by_operator
                .entry(operator_id.to_string())
                .or_default()
                .insert(key);
            holdings.counted_records += 1;
        }

        holdings.display = spellings
            .iter()
            .map(|(key, counts)| (key.clone(), aliases.display_name(key, counts)))
            .collect();

        if unlinked > 0 {
            holdings.findings.push(Finding::new(
                FindingKind::OrphanCertification,
                format!("{} certification records have no operator id", unlinked),
            ));
        }
        for (id, count) in orphans {
            holdings.findings.push(
                Finding::new(
                    FindingKind::OrphanCertification,
                    format!(
                        "{} certification records belong to unknown operator {}",
                        count, id
                    ),
                )
                .with_operator(id),
            );
        }

        tracing::debug!(
            "Holdings: {} of {} records counted, {} operators hold certifications",
            holdings.counted_records,
            records.len(),
            holdings.by_operator.len()
        );
        holdings
    }

    /// Certifications held by an operator; empty when they hold none.
    pub fn held_by(&self, operator_id: &str) -> &BTreeSet<NormalizedKey> {
        self.by_operator.get(operator_id).unwrap_or(&NO_HOLDINGS)
    }

    /// Display name of a certification key.
    pub fn display_name(&self, key: &NormalizedKey) -> String {
        self.display
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    /// Every certification key held by anyone.
    pub fn certifications(&self) -> impl Iterator<Item = &NormalizedKey> {
        self.display.keys()
    }

    /// Operators holding at least one certification.
    pub fn holder_count(&self) -> usize {
        self.by_operator.len()
    }
}
