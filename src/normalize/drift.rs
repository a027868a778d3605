//! Naming drift diagnostics.
//!
//! Divisions export the same certification under different spellings
//! (`BACKGROUND CHECK` vs `Background Check`, trailing spaces). This module
//! reports those spellings and the near-duplicates the alias table does not
//! cover yet. Nothing here affects compliance.

use super::aliases::AliasTable;
use super::names::NormalizedKey;
use super::similarity::similarity_ratio;
use crate::diagnostics::{Finding, FindingKind};
use crate::ingest::{CertificationRecord, Operator};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Result of checking one raw spelling against the alias table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameCheck {
    pub is_canonical: bool,
    pub canonical: String,
    pub has_leading_space: bool,
    pub has_trailing_space: bool,
    pub has_case_issues: bool,
}

impl NameCheck {
    /// Suggested fix, if the spelling is not canonical.
    pub fn recommendation(&self) -> Option<String> {
        (!self.is_canonical).then(|| format!("Update to '{}'", self.canonical))
    }
}

/// Check a raw certification spelling.
pub fn validate_name(name: &str, aliases: &AliasTable) -> NameCheck {
    let canonical = aliases.canonicalize(name);
    let is_canonical = name == canonical;
    let trimmed = name.trim();
    let canonical_trimmed = canonical.trim();

    NameCheck {
        is_canonical,
        has_leading_space: name.trim_start() != name,
        has_trailing_space: name.trim_end() != name,
        has_case_issues: trimmed != canonical_trimmed
            && trimmed.to_lowercase() == canonical_trimmed.to_lowercase(),
        canonical,
    }
}

/// One observed spelling of a certification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantUsage {
    pub spelling: String,
    pub records: usize,
    pub divisions: Vec<String>,
    pub check: NameCheck,
}

/// All spellings sharing one aggregation key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantGroup {
    pub key: NormalizedKey,
    pub display_name: String,
    pub variants: Vec<VariantUsage>,
}

impl VariantGroup {
    /// More than one spelling is in use.
    pub fn is_inconsistent(&self) -> bool {
        self.variants.len() > 1
    }
}

/// Two distinct certifications whose names are suspiciously close.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearDuplicate {
    pub left: String,
    pub right: String,
    pub ratio: f64,
}

/// Naming drift across the certification export.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DriftReport {
    pub groups: Vec<VariantGroup>,
    pub near_duplicates: Vec<NearDuplicate>,
}

impl DriftReport {
    /// Groups with more than one spelling.
    pub fn inconsistent(&self) -> impl Iterator<Item = &VariantGroup> {
        self.groups.iter().filter(|g| g.is_inconsistent())
    }

    /// Findings for inconsistent groups and near-duplicates.
    pub fn findings(&self) -> Vec<Finding> {
        let mut findings: Vec<Finding> = self
            .inconsistent()
            .map(|group| {
                let spellings: Vec<String> = group
                    .variants
                    .iter()
                    .map(|v| format!("'{}'", v.spelling))
                    .collect();
                Finding::new(
                    FindingKind::NamingDrift,
                    format!(
                        "{} is spelled {} ways: {}",
                        group.display_name,
                        group.variants.len(),
                        spellings.join(", ")
                    ),
                )
                .with_subject(group.display_name.clone())
            })
            .collect();

        findings.extend(self.near_duplicates.iter().map(|pair| {
            Finding::new(
                FindingKind::NamingDrift,
                format!(
                    "'{}' and '{}' look like the same certification ({:.0}% similar)",
                    pair.left,
                    pair.right,
                    pair.ratio * 100.0
                ),
            )
            .with_subject(pair.left.clone())
        }));
        findings
    }
}

/// Collect naming drift over all certification records.
///
/// Divisions come from the owning operator; records without a known owner
/// still count toward spellings.
pub fn naming_drift(
    records: &[CertificationRecord],
    operators: &[Operator],
    aliases: &AliasTable,
    threshold: f64,
) -> DriftReport {
    let division_of: HashMap<&str, &str> = operators
        .iter()
        .map(|op| (op.id.as_str(), op.division_id.as_str()))
        .collect();

    #[derive(Default)]
    struct Usage {
        records: usize,
        divisions: BTreeSet<String>,
    }

    let mut by_key: BTreeMap<NormalizedKey, BTreeMap<String, Usage>> = BTreeMap::new();
    for record in records {
        let key = aliases.key(&record.cert_name);
        if key.is_empty() {
            continue;
        }
        let usage = by_key
            .entry(key)
            .or_default()
            .entry(record.cert_name.clone())
            .or_default();
        usage.records += 1;
        if let Some(division) = record
            .operator_id
            .as_deref()
            .and_then(|id| division_of.get(id))
        {
            usage.divisions.insert((*division).to_string());
        }
    }

    let groups: Vec<VariantGroup> = by_key
        .into_iter()
        .map(|(key, spellings)| {
            let counts: BTreeMap<String, usize> = spellings
                .iter()
                .map(|(s, u)| (s.trim().to_string(), u.records))
                .fold(BTreeMap::new(), |mut acc, (s, n)| {
                    *acc.entry(s).or_default() += n;
                    acc
                });
            let display_name = aliases.display_name(&key, &counts);
            let variants = spellings
                .into_iter()
                .map(|(spelling, usage)| VariantUsage {
                    check: validate_name(&spelling, aliases),
                    spelling,
                    records: usage.records,
                    divisions: usage.divisions.into_iter().collect(),
                })
                .collect();
            VariantGroup {
                key,
                display_name,
                variants,
            }
        })
        .collect();

    let mut near_duplicates = Vec::new();
    for (i, left) in groups.iter().enumerate() {
        for right in &groups[i + 1..] {
            let ratio = similarity_ratio(left.key.as_str(), right.key.as_str());
            if ratio >= threshold {
                near_duplicates.push(NearDuplicate {
                    left: left.display_name.clone(),
                    right: right.display_name.clone(),
                    ratio,
                });
            }
        }
    }

    tracing::debug!(
        "Naming drift: {} certifications, {} inconsistent, {} near-duplicates",
        groups.len(),
        groups.iter().filter(|g| g.is_inconsistent()).count(),
        near_duplicates.len()
    );

    DriftReport {
        groups,
        near_duplicates,
    }
}
