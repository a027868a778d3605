//! Loading a complete snapshot.

use super::adapter::{Adapted, RecordAdapter};
use super::records::{CertificationRecord, CoarseStatus, Operator, StatusChangeEvent, StatusType};
use super::source::read_records;
use crate::config::DataSources;
use crate::diagnostics::Finding;
use crate::error::Result;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Raw records of the five snapshot sources, before adaptation.
#[derive(Debug, Clone, Default)]
pub struct RawSnapshot {
    pub operators: Vec<Value>,
    pub certifications: Vec<Value>,
    pub status_types: Vec<Value>,
    pub coarse_statuses: Vec<Value>,
    pub events: Vec<Value>,
}

/// Typed snapshot of one analysis run's inputs.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub operators: Vec<Operator>,
    pub certifications: Vec<CertificationRecord>,
    pub status_types: Vec<StatusType>,
    pub coarse_statuses: Vec<CoarseStatus>,
    pub events: Vec<StatusChangeEvent>,
    /// Records skipped during adaptation.
    pub findings: Vec<Finding>,
}

/// Resolved file locations of the five sources.
#[derive(Debug, Clone, PartialEq)]
pub struct SourcePaths {
    pub operators: PathBuf,
    pub certifications: PathBuf,
    pub status_types: PathBuf,
    pub coarse_statuses: PathBuf,
    pub events: PathBuf,
}

impl SourcePaths {
    /// Resolve `sources` against `base_dir`. Absolute paths are kept.
    pub fn resolve(sources: &DataSources, base_dir: &Path) -> Self {
        let dir = base_dir.join(&sources.dir);
        Self {
            operators: dir.join(&sources.operators),
            certifications: dir.join(&sources.certifications),
            status_types: dir.join(&sources.status_types),
            coarse_statuses: dir.join(&sources.pizza_statuses),
            events: dir.join(&sources.status_tracker),
        }
    }
}

impl RawSnapshot {
    /// Read every source file.
    pub fn read(paths: &SourcePaths) -> Result<Self> {
        Ok(Self {
            operators: read_records(&paths.operators)?,
            certifications: read_records(&paths.certifications)?,
            status_types: read_records(&paths.status_types)?,
            coarse_statuses: read_records(&paths.coarse_statuses)?,
            events: read_records(&paths.events)?,
        })
    }
}

impl Dataset {
    /// Read and adapt all sources described by `sources`.
    pub fn load(sources: &DataSources, base_dir: &Path) -> Result<Self> {
        let paths = SourcePaths::resolve(sources, base_dir);
        tracing::debug!("Loading snapshots from {}", base_dir.join(&sources.dir).display());
        let raw = RawSnapshot::read(&paths)?;
        let dataset = Self::adapt(&raw, &RecordAdapter::v1());
        tracing::info!(
            "Loaded {} operators, {} certification records, {} status types, {} events",
            dataset.operators.len(),
            dataset.certifications.len(),
            dataset.status_types.len(),
            dataset.events.len()
        );
        Ok(dataset)
    }

    /// Adapt raw records, collecting every adapter finding.
    pub fn adapt(raw: &RawSnapshot, adapter: &RecordAdapter) -> Self {
        fn take<T>(adapted: Adapted<T>, findings: &mut Vec<Finding>) -> Vec<T> {
            findings.extend(adapted.findings);
            adapted.records
        }

        let mut findings = Vec::new();
        let operators = take(adapter.operators(&raw.operators, "operators"), &mut findings);
        let certifications = take(
            adapter.certifications(&raw.certifications, "certifications"),
            &mut findings,
        );
        let status_types = take(
            adapter.status_types(&raw.status_types, "status types"),
            &mut findings,
        );
        let coarse_statuses = take(
            adapter.coarse_statuses(&raw.coarse_statuses, "coarse statuses"),
            &mut findings,
        );
        let events = take(adapter.events(&raw.events, "status tracker"), &mut findings);

        Self {
            operators,
            certifications,
            status_types,
            coarse_statuses,
            events,
            findings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::FindingKind;
    use crate::error::OpcertError;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn resolve_joins_dir_and_files() {
        let paths = SourcePaths::resolve(&DataSources::default(), Path::new("/proj"));
        assert_eq!(paths.operators, PathBuf::from("/proj/data/pay_Operators.json"));
        assert_eq!(
            paths.coarse_statuses,
            PathBuf::from("/proj/data/pay_PizzaStatuses.txt")
        );
    }

    #[test]
    fn adapt_collects_findings_from_all_sources() {
        let raw = RawSnapshot {
            operators: vec![json!({"ID": 1})],
            events: vec![json!({"StatusID": 2})],
            ..Default::default()
        };
        let dataset = Dataset::adapt(&raw, &RecordAdapter::v1());

        assert!(dataset.operators.is_empty());
        assert_eq!(dataset.findings.len(), 2);
        assert!(dataset
            .findings
            .iter()
            .all(|f| f.kind == FindingKind::MissingField));
    }

    #[test]
    fn load_reads_mixed_formats() {
        let temp = TempDir::new().unwrap();
        let data = temp.path().join("data");
        fs::create_dir_all(&data).unwrap();
        fs::write(
            data.join("pay_Operators.json"),
            r#"{"operators": [{"ID": 1, "DivisionID": "2 - IL", "CurrentStatus": "Active"}]}"#,
        )
        .unwrap();
        fs::write(data.join("pay_Certifications.json"), "[]").unwrap();
        fs::write(
            data.join("pay_StatusTypes.txt"),
            "Id|DivisionID|Status|OrderID|PizzaStatusID\n--|--|--|--|--\n1|2 - IL|Active|1|1\n",
        )
        .unwrap();
        fs::write(data.join("pay_PizzaStatuses.txt"), "ID|IsOperator\n1|True\n").unwrap();
        fs::write(data.join("pay_StatusTracker.json"), "[]").unwrap();

        let dataset = Dataset::load(&DataSources::default(), temp.path()).unwrap();
        assert_eq!(dataset.operators.len(), 1);
        assert_eq!(dataset.status_types.len(), 1);
        assert!(dataset.coarse_statuses[0].is_operator);
        assert!(dataset.findings.is_empty());
    }

    #[test]
    fn load_fails_on_missing_source() {
        let temp = TempDir::new().unwrap();
        let result = Dataset::load(&DataSources::default(), temp.path());
        assert!(matches!(result, Err(OpcertError::DataSourceNotFound { .. })));
    }
}
