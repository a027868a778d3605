//! Certification name normalization.
//!
//! Certification identity is the normalized name, never the raw string.
//! Exact normalized matches (through the alias table) are the only thing
//! compliance ever uses; fuzzy similarity is reported, not trusted.
//!
//! # Example
//!
//! ```
//! use opcert::normalize::{matches, normalize, AliasTable};
//! use std::collections::BTreeMap;
//!
//! assert!(matches("CTAA PASSENGER ASSISTANCE", "CTAA Passenger Assistance"));
//! assert_eq!(normalize("  Defensive   Driving ").as_str(), "defensive driving");
//!
//! let mut aliases = BTreeMap::new();
//! aliases.insert("Social Security Card".to_string(), vec!["SSN Card".to_string()]);
//! let table = AliasTable::from_config(&aliases).unwrap();
//! assert_eq!(table.canonicalize("ssn card"), "Social Security Card");
//! ```

pub mod aliases;
pub mod drift;
pub mod names;
pub mod similarity;

pub use aliases::{starter_aliases, AliasTable};
pub use drift::{
    naming_drift, validate_name, DriftReport, NameCheck, NearDuplicate, VariantGroup, VariantUsage,
};
pub use names::{matches, normalize, NormalizedKey};
pub use similarity::{best_match, levenshtein, similarity_ratio, FuzzyMatch, DEFAULT_FUZZY_THRESHOLD};
