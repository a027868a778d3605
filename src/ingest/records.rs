//! Typed input records.
//!
//! These are the only shapes the analysis core sees. They are produced by
//! [`RecordAdapter`](super::adapter::RecordAdapter) and are never mutated
//! after loading.

use crate::config::ExpirationPolicy;
use chrono::NaiveDateTime;
use serde::Serialize;

/// An operator snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Operator {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub division_id: String,
    /// Current lifecycle status name, trimmed.
    pub current_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Operator {
    /// "First Last", falling back to the id when both names are blank.
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let name = name.trim();
        if name.is_empty() {
            self.id.clone()
        } else {
            name.to_string()
        }
    }
}

/// A certification record as exported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CertificationRecord {
    /// Owning operator; `None` when the export lost the linkage.
    pub operator_id: Option<String>,
    /// Raw certification name with its original whitespace.
    pub cert_name: String,
    pub approved: bool,
    pub deleted: bool,
    pub issued_at: Option<NaiveDateTime>,
    pub expires_at: Option<NaiveDateTime>,
}

impl CertificationRecord {
    /// Approved and not deleted.
    pub fn counts_toward_compliance(&self) -> bool {
        self.approved && !self.deleted
    }

    /// Whether the record is still valid at `as_of` under `policy`.
    pub fn is_current(&self, policy: ExpirationPolicy, as_of: NaiveDateTime) -> bool {
        match (policy, self.expires_at) {
            (ExpirationPolicy::Ignore, _) => true,
            (ExpirationPolicy::Explicit, None) => true,
            (ExpirationPolicy::Require, None) => false,
            (_, Some(expires)) => expires >= as_of,
        }
    }
}

/// A lifecycle status definition ("status type").
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusType {
    pub id: Option<String>,
    pub division_id: String,
    pub status_name: String,
    pub order: Option<u32>,
    pub coarse_status_id: Option<String>,
    pub is_deleted: bool,
    pub is_fleet: bool,
    pub is_provider: bool,
    /// Whether entering this status requires a certification gate.
    pub cert_gate: bool,
}

/// A coarse status grouping ("pizza status").
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoarseStatus {
    pub id: String,
    pub is_operator: bool,
}

/// A status-change event from the status tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusChangeEvent {
    pub operator_id: String,
    pub status_id: String,
    /// Timestamp as exported, kept for duplicate detection and reporting.
    pub timestamp_raw: String,
    /// Parsed timestamp; `None` when `timestamp_raw` is not a known layout.
    pub timestamp: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub division_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recorded_by: Option<String>,
}
