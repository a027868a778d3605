//! Input adaptation.
//!
//! Turns exported snapshot files into typed records:
//!
//! - [`source`] reads JSON and pipe-delimited files into raw records
//! - [`coerce`] interprets loose booleans, numbers and timestamps
//! - [`adapter`] maps raw key spellings onto the typed [`records`]
//! - [`dataset`] loads all five sources of a run

pub mod adapter;
pub mod coerce;
pub mod dataset;
pub mod records;
pub mod source;

pub use adapter::{Adapted, FieldMap, RecordAdapter, SCHEMA_VERSION};
pub use coerce::{coerce_bool, parse_order, parse_timestamp};
pub use dataset::{Dataset, RawSnapshot, SourcePaths};
pub use records::{CertificationRecord, CoarseStatus, Operator, StatusChangeEvent, StatusType};
pub use source::{parse_pipe_table, read_records, PipeTable};
