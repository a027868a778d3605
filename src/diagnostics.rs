//! Data-quality findings.
//!
//! Anomalies in the input snapshots never abort a run. Every component
//! records them as [`Finding`]s which travel with its results and end up,
//! sorted and summarized, in the analysis report.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Severity level for findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational, nothing to fix in the data.
    Info,
    /// The data is inconsistent and part of it was skipped or guessed.
    Warning,
    /// The data contradicts itself in a way that makes results ambiguous.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// The kind of anomaly a finding reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FindingKind {
    /// A raw record lacks an identifying field and was skipped.
    MissingField,
    /// An event timestamp could not be parsed.
    UnparseableTimestamp,
    /// A lifecycle step has no numeric order.
    MissingOrder,
    /// One order value maps to several status names in a division.
    DuplicateOrder,
    /// An operator's current status is not a step of their division.
    UnknownStatus,
    /// An event status id resolves to no known status type.
    UnresolvedEventStatus,
    /// A certification record points at no known operator.
    OrphanCertification,
    /// Events reference an operator that is not in the snapshot.
    OrphanEvent,
    /// A step population is below the minimum sample size.
    InsufficientSample,
    /// Certification names drift between spellings.
    NamingDrift,
    /// Identical status-change events were collapsed.
    DuplicateEvent,
}

impl FindingKind {
    /// Stable identifier used in reports and summaries.
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingKind::MissingField => "missing-field",
            FindingKind::UnparseableTimestamp => "unparseable-timestamp",
            FindingKind::MissingOrder => "missing-order",
            FindingKind::DuplicateOrder => "duplicate-order",
            FindingKind::UnknownStatus => "unknown-status",
            FindingKind::UnresolvedEventStatus => "unresolved-event-status",
            FindingKind::OrphanCertification => "orphan-certification",
            FindingKind::OrphanEvent => "orphan-event",
            FindingKind::InsufficientSample => "insufficient-sample",
            FindingKind::NamingDrift => "naming-drift",
            FindingKind::DuplicateEvent => "duplicate-event",
        }
    }

    /// Severity used when a finding of this kind is created.
    pub fn default_severity(&self) -> Severity {
        match self {
            FindingKind::DuplicateOrder => Severity::Error,
            FindingKind::InsufficientSample
            | FindingKind::NamingDrift
            | FindingKind::DuplicateEvent => Severity::Info,
            _ => Severity::Warning,
        }
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single data-quality finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub kind: FindingKind,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub division: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    /// Free-form subject: a file, a certification name, an event id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

impl Finding {
    /// Create a finding with the kind's default severity.
    pub fn new(kind: FindingKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.default_severity(),
            message: message.into(),
            division: None,
            status: None,
            operator: None,
            subject: None,
        }
    }

    pub fn with_division(mut self, division: impl Into<String>) -> Self {
        self.division = Some(division.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = Some(operator.into());
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Override the default severity.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    fn sort_key(&self) -> impl Ord + '_ {
        (
            std::cmp::Reverse(self.severity),
            self.kind,
            self.division.as_deref(),
            self.status.as_deref(),
            self.operator.as_deref(),
            self.subject.as_deref(),
            self.message.as_str(),
        )
    }
}

/// Sort findings deterministically: most severe first, then by kind and
/// location.
pub fn sort_findings(findings: &mut [Finding]) {
    findings.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
}

/// Counts of findings by severity and kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FindingSummary {
    pub total: usize,
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
    pub by_kind: BTreeMap<String, usize>,
}

impl FindingSummary {
    /// Whether any finding is an error.
    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }
}

/// Summarize a list of findings.
pub fn summarize(findings: &[Finding]) -> FindingSummary {
    let mut summary = FindingSummary {
        total: findings.len(),
        ..Default::default()
    };
    for finding in findings {
        match finding.severity {
            Severity::Error => summary.errors += 1,
            Severity::Warning => summary.warnings += 1,
            Severity::Info => summary.info += 1,
        }
        *summary
            .by_kind
            .entry(finding.kind.as_str().to_string())
            .or_default() += 1;
    }
    summary
}
