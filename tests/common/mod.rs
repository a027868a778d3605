//! Deterministic synthetic snapshots shared by integration tests.
//!
//! Three divisions, each with Applicant(1) -> Onboarding(2) -> Active(3):
//!
//! - 10 applicants holding nothing
//! - 5 onboarding operators holding a background check; 4 of them also
//!   hold a drug test
//! - 12 active operators: all hold a background check, 10 a drug test,
//!   6 CPR and 2 first aid
//!
//! Division `3 - TX` spells one background check `BACKGROUND CHECK`.
//!
//! Every holding is exported as a current record, an exact duplicate of it
//! and five expired renewals. On top of that every operator carries
//! rejected and deleted records for the whole catalogue, none of which
//! count. That makes 4,707 certification records.
//!
//! Status history, with the reference date 2024-03-01:
//!
//! - active: Applicant 01-01, Onboarding 01-11, Active 02-01; the first
//!   eight also repeat the Onboarding event verbatim
//! - onboarding 0 and 1: sent back once (Applicant 01-05, Onboarding
//!   01-20, Applicant 01-25, Onboarding 02-01)
//! - other onboarding: Applicant 01-15, Onboarding 02-01
//! - applicants 0..8: Applicant 02-10; applicants 8 and 9 have no history
//!
//! Two more events belong to an operator missing from the snapshot, for
//! 200 events in total.
#![allow(dead_code)]

use opcert::ingest::RawSnapshot;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

pub const DIVISIONS: [&str; 3] = ["1 - NY", "2 - IL", "3 - TX"];
pub const STATUSES: [&str; 3] = ["Applicant", "Onboarding", "Active"];

pub const APPLICANTS: usize = 10;
pub const ONBOARDING: usize = 5;
pub const ACTIVE: usize = 12;

/// Applicants with a status history; the rest have none.
pub const APPLICANTS_WITH_HISTORY: usize = 8;

/// Every certification name that appears in the export.
pub const CATALOGUE: [&str; 12] = [
    "Background Check",
    "Drug Test",
    "CPR",
    "First Aid",
    "Defensive Driving",
    "Hazmat Endorsement",
    "Medical Card",
    "Forklift Training",
    "Vehicle Inspection",
    "Safety Orientation",
    "Service Agreement",
    "Insurance Certificate",
];

pub const CERTIFICATION_RECORDS: usize = 4_707;
pub const COUNTED_RECORDS: usize = 234;
pub const EVENTS: usize = 200;

/// Operator id used by events whose operator is not in the snapshot.
pub const UNKNOWN_OPERATOR: &str = "9999";

pub fn operator_id(division: usize, index: usize) -> String {
    format!("{}{:03}", division + 1, index)
}

fn status_id(division: usize, order: usize) -> String {
    format!("{}", (division + 1) * 10 + order)
}

fn record(operator: &str, name: &str, approved: bool, deleted: bool) -> Value {
    json!({
        "OperatorID": operator,
        "Cert": name,
        "isApproved": approved,
        "IsDeleted": deleted,
    })
}

fn dated(operator: &str, name: &str, issued: i32) -> Value {
    json!({
        "OperatorID": operator,
        "Cert": name,
        "isApproved": true,
        "IsDeleted": false,
        "CompletionDate": format!("{}-06-01 00:00:00", issued),
        "ExpirationDate": format!("{}-06-01 00:00:00", issued + 1),
    })
}

/// A valid holding: the current record twice plus five lapsed renewals.
fn hold(raw: &mut RawSnapshot, operator: &str, name: &str) {
    let current = json!({
        "OperatorID": operator,
        "Cert": name,
        "isApproved": true,
        "IsDeleted": false,
        "CompletionDate": "2023-06-01 00:00:00",
        "ExpirationDate": "2025-06-01 00:00:00",
    });
    raw.certifications.push(current.clone());
    raw.certifications.push(current);
    for issued in 2018..2023 {
        raw.certifications.push(dated(operator, name, issued));
    }
}

/// Rejected and deleted submissions that never count.
fn noise(raw: &mut RawSnapshot, operator: &str) {
    for name in CATALOGUE {
        raw.certifications.push(record(operator, name, false, false));
        raw.certifications.push(record(operator, name, false, false));
        raw.certifications.push(record(operator, name, true, true));
        raw.certifications.push(record(operator, name, false, true));
    }
}

fn event(raw: &mut RawSnapshot, operator: &str, division: usize, order: usize, date: &str) {
    raw.events.push(json!({
        "OperatorID": operator,
        "StatusID": status_id(division, order),
        "Date": format!("{} 00:00:00", date),
        "DivisionID": DIVISIONS[division],
    }));
}

pub fn raw_snapshot() -> RawSnapshot {
    let mut raw = RawSnapshot {
        coarse_statuses: vec![json!({"ID": 1, "IsOperator": 1})],
        ..Default::default()
    };

    for (d, division) in DIVISIONS.iter().enumerate() {
        for (i, status) in STATUSES.iter().enumerate() {
            raw.status_types.push(json!({
                "Id": status_id(d, i + 1),
                "DivisionID": division,
                "Status": status,
                "OrderID": i + 1,
                "PizzaStatusID": 1,
                "isDeleted": 0,
            }));
        }

        let mut index = 0;
        let mut next = |status: &str, raw: &mut RawSnapshot| {
            let id = operator_id(d, index);
            index += 1;
            raw.operators.push(json!({
                "ID": id,
                "FirstName": "Op",
                "LastName": id,
                "DivisionID": division,
                "CurrentStatus": status,
            }));
            noise(raw, &id);
            id
        };

        for n in 0..APPLICANTS {
            let id = next("Applicant", &mut raw);
            if n < APPLICANTS_WITH_HISTORY {
                event(&mut raw, &id, d, 1, "2024-02-10");
            }
        }

        for n in 0..ONBOARDING {
            let id = next("Onboarding", &mut raw);
            hold(&mut raw, &id, "Background Check");
            if n < 4 {
                hold(&mut raw, &id, "Drug Test");
            }

            if n < 2 {
                event(&mut raw, &id, d, 1, "2024-01-05");
                event(&mut raw, &id, d, 2, "2024-01-20");
                event(&mut raw, &id, d, 1, "2024-01-25");
                event(&mut raw, &id, d, 2, "2024-02-01");
            } else {
                event(&mut raw, &id, d, 1, "2024-01-15");
                event(&mut raw, &id, d, 2, "2024-02-01");
            }
        }

        for n in 0..ACTIVE {
            let id = next("Active", &mut raw);
            let bc = if d == 2 && n == 0 {
                "BACKGROUND CHECK"
            } else {
                "Background Check"
            };
            hold(&mut raw, &id, bc);
            if n < 10 {
                hold(&mut raw, &id, "Drug Test");
            }
            if n < 6 {
                hold(&mut raw, &id, "CPR");
            }
            if n < 2 {
                hold(&mut raw, &id, "First Aid");
            }

            event(&mut raw, &id, d, 1, "2024-01-01");
            event(&mut raw, &id, d, 2, "2024-01-11");
            event(&mut raw, &id, d, 3, "2024-02-01");
            if n < 8 {
                event(&mut raw, &id, d, 2, "2024-01-11");
            }
        }
    }

    event(&mut raw, UNKNOWN_OPERATOR, 0, 1, "2024-01-03");
    event(&mut raw, UNKNOWN_OPERATOR, 0, 2, "2024-01-09");

    raw
}

fn write_json(path: &Path, records: &[Value]) {
    fs::write(path, serde_json::to_string_pretty(records).unwrap()).unwrap();
}

/// Write the snapshot into `<root>/data` under the default file names.
pub fn write_project(root: &Path) {
    let raw = raw_snapshot();
    let data = root.join("data");
    fs::create_dir_all(&data).unwrap();
    write_json(&data.join("pay_Operators.json"), &raw.operators);
    write_json(&data.join("pay_Certifications.json"), &raw.certifications);
    write_json(&data.join("pay_StatusTypes.txt"), &raw.status_types);
    write_json(&data.join("pay_PizzaStatuses.txt"), &raw.coarse_statuses);
    write_json(&data.join("pay_StatusTracker.json"), &raw.events);

    let config = root.join(".opcert");
    fs::create_dir_all(&config).unwrap();
    fs::write(config.join("config.yml"), "data:\n  as_of: \"2024-03-01\"\n").unwrap();
}
