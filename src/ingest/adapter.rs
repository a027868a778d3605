//! Raw record adaptation.
//!
//! Each export spells its keys differently (`ID`, `Id`, `OperatorID`...).
//! A [`FieldMap`] lists, per internal field, the raw spellings accepted for
//! one schema version. [`RecordAdapter`] applies it once at load time so
//! nothing downstream ever guesses at key names.

use super::coerce::{coerce_bool, coerce_string, parse_order, parse_timestamp, raw_string};
use super::records::{CertificationRecord, CoarseStatus, Operator, StatusChangeEvent, StatusType};
use crate::diagnostics::{Finding, FindingKind};
use serde_json::{Map, Value};

/// Version of the raw field mapping understood by [`FieldMap::v1`].
pub const SCHEMA_VERSION: &str = "v1";

/// Accepted raw key spellings, in lookup order.
pub type Keys = &'static [&'static str];

/// Mapping from internal fields to raw key spellings.
#[derive(Debug, Clone)]
pub struct FieldMap {
    pub version: &'static str,

    pub operator_id: Keys,
    pub operator_first_name: Keys,
    pub operator_last_name: Keys,
    pub operator_division: Keys,
    pub operator_status: Keys,
    pub operator_email: Keys,

    pub cert_operator_id: Keys,
    pub cert_name: Keys,
    pub cert_approved: Keys,
    pub cert_deleted: Keys,
    pub cert_issued: Keys,
    pub cert_expires: Keys,

    pub status_id: Keys,
    pub status_division: Keys,
    pub status_name: Keys,
    pub status_order: Keys,
    pub status_coarse_id: Keys,
    pub status_deleted: Keys,
    pub status_fleet: Keys,
    pub status_provider: Keys,
    pub status_cert_gate: Keys,

    pub coarse_id: Keys,
    pub coarse_is_operator: Keys,

    pub event_operator_id: Keys,
    pub event_status_id: Keys,
    pub event_timestamp: Keys,
    pub event_division: Keys,
    pub event_recorded_by: Keys,
}

impl FieldMap {
    /// Key spellings of the `pay_*` exports.
    pub const fn v1() -> Self {
        Self {
            version: SCHEMA_VERSION,

            operator_id: &["ID", "Id", "id", "OperatorID"],
            operator_first_name: &["FirstName", "firstName", "first_name"],
            operator_last_name: &["LastName", "lastName", "last_name"],
            operator_division: &["DivisionID", "DivisionId", "divisionId", "Division"],
            operator_status: &["CurrentStatus", "StatusName", "currentStatusName", "Status"],
            operator_email: &["Email", "email"],

            cert_operator_id: &["OperatorID", "OperatorId", "operatorId", "ID"],
            cert_name: &["Cert", "CertName", "certName", "Name"],
            cert_approved: &["isApproved", "IsApproved", "approved"],
            cert_deleted: &["IsDeleted", "isDeleted", "deleted"],
            cert_issued: &["CompletionDate", "IssueDate", "issueDate"],
            cert_expires: &["Date", "ExpireDate", "ExpirationDate", "expireDate"],

            status_id: &["Id", "ID", "id"],
            status_division: &["DivisionID", "DivisionId", "divisionId"],
            status_name: &["Status", "StatusName", "statusName"],
            status_order: &["OrderID", "OrderId", "orderId"],
            status_coarse_id: &["PizzaStatusID", "PizzaStatusId", "coarseStatusId"],
            status_deleted: &["isDeleted", "IsDeleted", "IsDelete"],
            status_fleet: &["Fleet", "isFleet"],
            status_provider: &["Providers", "isProvider"],
            status_cert_gate: &["CertFlag", "certGateFlag"],

            coarse_id: &["ID", "Id", "id"],
            coarse_is_operator: &["IsOperator", "isOperator"],

            event_operator_id: &["OperatorID", "OperatorId", "operatorId"],
            event_status_id: &["StatusID", "StatusId", "statusId"],
            event_timestamp: &["Date", "Timestamp", "timestamp"],
            event_division: &["DivisionID", "DivisionId", "divisionId"],
            event_recorded_by: &["RecordBy", "recordedBy"],
        }
    }
}

impl Default for FieldMap {
    fn default() -> Self {
        Self::v1()
    }
}

/// Records adapted from one source plus the findings raised on the way.
#[derive(Debug, Clone)]
pub struct Adapted<T> {
    pub records: Vec<T>,
    pub findings: Vec<Finding>,
}

impl<T> Default for Adapted<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            findings: Vec::new(),
        }
    }
}

/// Converts raw JSON objects into typed records.
#[derive(Debug, Clone, Default)]
pub struct RecordAdapter {
    fields: FieldMap,
}

fn lookup<'a>(object: &'a Map<String, Value>, keys: Keys) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| object.get(*k))
        .find(|v| !v.is_null())
}

fn text(object: &Map<String, Value>, keys: Keys) -> Option<String> {
    lookup(object, keys).and_then(coerce_string)
}

fn flag(object: &Map<String, Value>, keys: Keys) -> bool {
    lookup(object, keys).is_some_and(coerce_bool)
}

fn timestamp(object: &Map<String, Value>, keys: Keys) -> Option<chrono::NaiveDateTime> {
    text(object, keys).and_then(|s| parse_timestamp(&s))
}

fn missing(source: &str, index: usize, field: &str) -> Finding {
    Finding::new(
        FindingKind::MissingField,
        format!("{} record #{} has no {}; skipped", source, index + 1, field),
    )
    .with_subject(source.to_string())
}

impl RecordAdapter {
    /// Adapter for the given field map.
    pub fn new(fields: FieldMap) -> Self {
        Self { fields }
    }

    /// Adapter for the current schema version.
    pub fn v1() -> Self {
        Self::new(FieldMap::v1())
    }

    /// Schema version this adapter reads.
    pub fn version(&self) -> &'static str {
        self.fields.version
    }

    fn each<T>(
        &self,
        raw: &[Value],
        source: &str,
        mut convert: impl FnMut(&Map<String, Value>) -> Result<T, &'static str>,
    ) -> Adapted<T> {
        let mut adapted = Adapted::default();
        for (index, value) in raw.iter().enumerate() {
            let Some(object) = value.as_object() else {
                adapted.findings.push(missing(source, index, "object body"));
                continue;
            };
            match convert(object) {
                Ok(record) => adapted.records.push(record),
                Err(field) => adapted.findings.push(missing(source, index, field)),
            }
        }
        if !adapted.findings.is_empty() {
            tracing::debug!(
                "{}: skipped {} of {} records",
                source,
                adapted.findings.len(),
                raw.len()
            );
        }
        adapted
    }

    /// Adapt operator snapshots. Id, division and status are mandatory.
    pub fn operators(&self, raw: &[Value], source: &str) -> Adapted<Operator> {
        let f = &self.fields;
        self.each(raw, source, |o| {
            Ok(Operator {
                id: text(o, f.operator_id).ok_or("operator id")?,
                first_name: text(o, f.operator_first_name).unwrap_or_default(),
                last_name: text(o, f.operator_last_name).unwrap_or_default(),
                division_id: text(o, f.operator_division).ok_or("division")?,
                current_status: text(o, f.operator_status).ok_or("current status")?,
                email: text(o, f.operator_email),
            })
        })
    }

    /// Adapt certification records. Only the certification name is
    /// mandatory; lost operator linkage is judged later against the
    /// operator snapshot.
    pub fn certifications(&self, raw: &[Value], source: &str) -> Adapted<CertificationRecord> {
        let f = &self.fields;
        self.each(raw, source, |o| {
            Ok(CertificationRecord {
                operator_id: text(o, f.cert_operator_id),
                cert_name: lookup(o, f.cert_name)
                    .and_then(raw_string)
                    .ok_or("certification name")?,
                approved: flag(o, f.cert_approved),
                deleted: flag(o, f.cert_deleted),
                issued_at: timestamp(o, f.cert_issued),
                expires_at: timestamp(o, f.cert_expires),
            })
        })
    }

    /// Adapt status-type definitions. Division and status name are mandatory.
    pub fn status_types(&self, raw: &[Value], source: &str) -> Adapted<StatusType> {
        let f = &self.fields;
        self.each(raw, source, |o| {
            Ok(StatusType {
                id: text(o, f.status_id),
                division_id: text(o, f.status_division).ok_or("division")?,
                status_name: text(o, f.status_name).ok_or("status name")?,
                order: lookup(o, f.status_order).and_then(parse_order),
                coarse_status_id: text(o, f.status_coarse_id),
                is_deleted: flag(o, f.status_deleted),
                is_fleet: flag(o, f.status_fleet),
                is_provider: flag(o, f.status_provider),
                cert_gate: flag(o, f.status_cert_gate),
            })
        })
    }

    /// Adapt coarse status definitions.
    pub fn coarse_statuses(&self, raw: &[Value], source: &str) -> Adapted<CoarseStatus> {
        let f = &self.fields;
        self.each(raw, source, |o| {
            Ok(CoarseStatus {
                id: text(o, f.coarse_id).ok_or("coarse status id")?,
                is_operator: flag(o, f.coarse_is_operator),
            })
        })
    }

    /// Adapt status-change events. Operator and status ids are mandatory;
    /// an unparseable timestamp is kept raw and judged by the journey
    /// builder.
    pub fn events(&self, raw: &[Value], source: &str) -> Adapted<StatusChangeEvent> {
        let f = &self.fields;
        self.each(raw, source, |o| {
            let timestamp_raw = text(o, f.event_timestamp).unwrap_or_default();
            Ok(StatusChangeEvent {
                operator_id: text(o, f.event_operator_id).ok_or("operator id")?,
                status_id: text(o, f.event_status_id).ok_or("status id")?,
                timestamp: parse_timestamp(&timestamp_raw),
                timestamp_raw,
                division_id: text(o, f.event_division),
                recorded_by: text(o, f.event_recorded_by),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn version_is_v1() {
        assert_eq!(RecordAdapter::v1().version(), "v1");
        assert_eq!(FieldMap::default().version, SCHEMA_VERSION);
    }

    #[test]
    fn operators_accept_alternate_spellings() {
        let raw = vec![
            json!({"ID": 12, "FirstName": "Ada", "LastName": "L", "DivisionID": "2 - IL", "CurrentStatus": "Onboarding "}),
            json!({"Id": "13", "DivisionID": "3 - TX", "StatusName": "Active", "Email": "x@y.z"}),
        ];
        let adapted = RecordAdapter::v1().operators(&raw, "operators");

        assert!(adapted.findings.is_empty());
        assert_eq!(adapted.records[0].id, "12");
        assert_eq!(adapted.records[0].current_status, "Onboarding");
        assert_eq!(adapted.records[1].id, "13");
        assert_eq!(adapted.records[1].email.as_deref(), Some("x@y.z"));
    }

    #[test]
    fn operator_without_division_is_skipped_with_finding() {
        let raw = vec![json!({"ID": 1, "CurrentStatus": "Active"})];
        let adapted = RecordAdapter::v1().operators(&raw, "operators");

        assert!(adapted.records.is_empty());
        assert_eq!(adapted.findings.len(), 1);
        assert_eq!(adapted.findings[0].kind, FindingKind::MissingField);
        assert!(adapted.findings[0].message.contains("division"));
    }

    #[test]
    fn non_object_record_is_skipped() {
        let raw = vec![json!("oops"), json!(3)];
        let adapted = RecordAdapter::v1().coarse_statuses(&raw, "pizza");
        assert!(adapted.records.is_empty());
        assert_eq!(adapted.findings.len(), 2);
    }

    #[test]
    fn certifications_coerce_flags_and_dates() {
        let raw = vec![json!({
            "OperatorID": 5,
            "Cert": "DOT Driver Questionnaire ",
            "isApproved": "1",
            "IsDeleted": false,
            "CompletionDate": "2024-01-02 10:00:00.000",
            "Date": "2025-01-02"
        })];
        let adapted = RecordAdapter::v1().certifications(&raw, "certs");
        let cert = &adapted.records[0];

        assert_eq!(cert.operator_id.as_deref(), Some("5"));
        assert_eq!(cert.cert_name, "DOT Driver Questionnaire ");
        assert!(cert.approved);
        assert!(!cert.deleted);
        assert!(cert.issued_at.is_some());
        assert!(cert.expires_at.is_some());
    }

    #[test]
    fn certification_without_linkage_is_kept() {
        let raw = vec![json!({"Cert": "Background Check", "isApproved": true})];
        let adapted = RecordAdapter::v1().certifications(&raw, "certs");
        assert_eq!(adapted.records.len(), 1);
        assert!(adapted.records[0].operator_id.is_none());
    }

    #[test]
    fn missing_approval_means_not_approved() {
        let raw = vec![json!({"OperatorID": 1, "Cert": "Background Check"})];
        let adapted = RecordAdapter::v1().certifications(&raw, "certs");
        assert!(!adapted.records[0].approved);
    }

    #[test]
    fn status_types_read_flags_and_order() {
        let raw = vec![json!({
            "Id": 40, "DivisionID": "2 - IL", "Status": "Onboarding", "OrderID": "3",
            "PizzaStatusID": 1, "isDeleted": "false", "Fleet": "0", "Providers": null,
            "CertFlag": "True"
        })];
        let adapted = RecordAdapter::v1().status_types(&raw, "status types");
        let st = &adapted.records[0];

        assert_eq!(st.id.as_deref(), Some("40"));
        assert_eq!(st.order, Some(3));
        assert_eq!(st.coarse_status_id.as_deref(), Some("1"));
        assert!(!st.is_deleted && !st.is_fleet && !st.is_provider);
        assert!(st.cert_gate);
    }

    #[test]
    fn status_type_order_may_be_missing() {
        let raw = vec![json!({"DivisionID": "2 - IL", "Status": "Hold", "OrderID": "n/a"})];
        let adapted = RecordAdapter::v1().status_types(&raw, "status types");
        assert_eq!(adapted.records[0].order, None);
    }

    #[test]
    fn events_keep_raw_timestamp() {
        let raw = vec![
            json!({"OperatorID": 1, "StatusID": 40, "Date": "2024-01-01 00:00:00", "DivisionID": "2 - IL"}),
            json!({"OperatorID": 1, "StatusID": 41, "Date": "garbage"}),
        ];
        let adapted = RecordAdapter::v1().events(&raw, "events");

        assert_eq!(adapted.records.len(), 2);
        assert!(adapted.records[0].timestamp.is_some());
        assert_eq!(adapted.records[1].timestamp_raw, "garbage");
        assert!(adapted.records[1].timestamp.is_none());
    }

    #[test]
    fn event_without_status_is_skipped() {
        let raw = vec![json!({"OperatorID": 1, "Date": "2024-01-01"})];
        let adapted = RecordAdapter::v1().events(&raw, "events");
        assert!(adapted.records.is_empty());
        assert!(adapted.findings[0].message.contains("status id"));
    }
}
