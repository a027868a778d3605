//! Small on-disk project shared by command tests.
//!
//! Division `2 - IL` runs Applicant(1) -> Onboarding(2) -> Active(3).
//! Four operators are Active and all hold a background check; one of the
//! two Onboarding operators lacks it.

use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub const CONFIG: &str = r#"data:
  as_of: "2024-06-01"
aliases:
  Background Check: [BACKGROUND CHECK, Background Chk]
"#;

const STATUS_TYPES: &str = "\
Id | DivisionID | Status | OrderID | PizzaStatusID | isDeleted | Fleet | Providers | CertFlag
---|---|---|---|---|---|---|---|---
1 | 2 - IL | Applicant | 1 | 1 | 0 | 0 | 0 | 0
2 | 2 - IL | Onboarding | 2 | 1 | 0 | 0 | 0 | 1
3 | 2 - IL | Active | 3 | 1 | 0 | 0 | 0 | 0
4 | 2 - IL | Truck Ready | 4 | 2 | 0 | 1 | 0 | 0
";

const PIZZA_STATUSES: &str = "\
ID | IsOperator
---|---
1 | 1
2 | 0
";

const OPERATORS: &str = r#"[
  {"ID": 101, "FirstName": "Ada", "LastName": "Lovelace", "DivisionID": "2 - IL", "CurrentStatus": "Applicant"},
  {"ID": 201, "FirstName": "Grace", "LastName": "Hopper", "DivisionID": "2 - IL", "CurrentStatus": "Onboarding"},
  {"ID": 202, "FirstName": "Alan", "LastName": "Turing", "DivisionID": "2 - IL", "CurrentStatus": "Onboarding"},
  {"ID": 301, "FirstName": "Edsger", "LastName": "Dijkstra", "DivisionID": "2 - IL", "CurrentStatus": "Active"},
  {"ID": 302, "FirstName": "Barbara", "LastName": "Liskov", "DivisionID": "2 - IL", "CurrentStatus": "Active"},
  {"ID": 303, "FirstName": "Donald", "LastName": "Knuth", "DivisionID": "2 - IL", "CurrentStatus": "Active"},
  {"ID": 304, "FirstName": "Frances", "LastName": "Allen", "DivisionID": "2 - IL", "CurrentStatus": "Active"}
]"#;

const CERTIFICATIONS: &str = r#"{"certifications": [
  {"OperatorID": 301, "Cert": "BACKGROUND CHECK ", "isApproved": true},
  {"OperatorID": 301, "Cert": "Defensive Driving", "isApproved": true},
  {"OperatorID": 302, "Cert": "Background Check", "isApproved": true},
  {"OperatorID": 303, "Cert": "Background Check", "isApproved": true},
  {"OperatorID": 303, "Cert": "Defensive Driving", "isApproved": "1"},
  {"OperatorID": 304, "Cert": "Background Check", "isApproved": "true"},
  {"OperatorID": 304, "Cert": "Defensive Driving", "isApproved": true},
  {"OperatorID": 201, "Cert": "Service Agreement", "isApproved": true},
  {"OperatorID": 201, "Cert": "Background Check", "isApproved": true},
  {"OperatorID": 202, "Cert": "Service Agreement", "isApproved": true},
  {"OperatorID": 202, "Cert": "Background Check", "isApproved": false},
  {"OperatorID": 999, "Cert": "Background Check", "isApproved": true}
]}"#;

const STATUS_TRACKER: &str = r#"[
  {"OperatorID": 301, "StatusID": 1, "Date": "2024-01-01 00:00:00", "DivisionID": "2 - IL"},
  {"OperatorID": 301, "StatusID": 2, "Date": "2024-01-15 00:00:00", "DivisionID": "2 - IL"},
  {"OperatorID": 301, "StatusID": 3, "Date": "2024-02-01 00:00:00", "DivisionID": "2 - IL"},
  {"OperatorID": 201, "StatusID": 1, "Date": "2024-03-01 00:00:00", "DivisionID": "2 - IL"},
  {"OperatorID": 201, "StatusID": 2, "Date": "2024-04-01T00:00:00", "DivisionID": "2 - IL"},
  {"OperatorID": 999, "StatusID": 1, "Date": "2024-01-01", "DivisionID": "2 - IL"}
]"#;

/// Write the snapshot files into `<root>/data`.
pub fn write_data(root: &Path) {
    let data = root.join("data");
    fs::create_dir_all(&data).unwrap();
    fs::write(data.join("pay_StatusTypes.txt"), STATUS_TYPES).unwrap();
    fs::write(data.join("pay_PizzaStatuses.txt"), PIZZA_STATUSES).unwrap();
    fs::write(data.join("pay_Operators.json"), OPERATORS).unwrap();
    fs::write(data.join("pay_Certifications.json"), CERTIFICATIONS).unwrap();
    fs::write(data.join("pay_StatusTracker.json"), STATUS_TRACKER).unwrap();
}

/// Write `.opcert/config.yml`.
pub fn write_config(root: &Path, content: &str) {
    let dir = root.join(".opcert");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("config.yml"), content).unwrap();
}

/// A project with config and data.
pub fn project() -> TempDir {
    let temp = TempDir::new().unwrap();
    write_config(temp.path(), CONFIG);
    write_data(temp.path());
    temp
}
