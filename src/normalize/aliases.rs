//! Certification alias table.
//!
//! Built once per run from the `aliases` config section
//! (`canonical name -> [known variants]`) and passed by reference to every
//! component that aggregates certifications.

use super::names::{normalize, NormalizedKey};
use crate::error::{OpcertError, Result};
use std::collections::{BTreeMap, BTreeSet};

/// Lookup from normalized spellings to configured canonical names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AliasTable {
    by_key: BTreeMap<NormalizedKey, String>,
    canonicals: BTreeSet<String>,
}

impl AliasTable {
    /// An empty table: every name is its own canonical form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the table from config.
    ///
    /// # Errors
    ///
    /// `ConfigValidationError` for an empty canonical name, an empty
    /// variant, or a spelling that would map to two different canonicals.
    pub fn from_config(aliases: &BTreeMap<String, Vec<String>>) -> Result<Self> {
        let mut table = Self::new();

        for (canonical, variants) in aliases {
            if canonical.trim().is_empty() {
                return Err(OpcertError::ConfigValidationError {
                    message: "aliases: canonical certification name must not be empty".into(),
                });
            }

            for spelling in std::iter::once(canonical).chain(variants.iter()) {
                let key = normalize(spelling);
                if key.is_empty() {
                    return Err(OpcertError::ConfigValidationError {
                        message: format!("aliases: empty variant listed for '{}'", canonical),
                    });
                }
                match table.by_key.get(&key) {
                    Some(existing) if existing != canonical => {
                        return Err(OpcertError::ConfigValidationError {
                            message: format!(
                                "aliases: '{}' maps to both '{}' and '{}'",
                                spelling, existing, canonical
                            ),
                        });
                    }
                    Some(_) => {}
                    None => {
                        table.by_key.insert(key, canonical.clone());
                    }
                }
            }
            table.canonicals.insert(canonical.clone());
        }

        tracing::debug!(
            "Alias table: {} canonical names, {} spellings",
            table.canonicals.len(),
            table.by_key.len()
        );
        Ok(table)
    }

    /// Canonical display name for `name`, or the trimmed input when no
    /// alias matches.
    pub fn canonicalize(&self, name: &str) -> String {
        match self.by_key.get(&normalize(name)) {
            Some(canonical) => canonical.clone(),
            None => name.trim().to_string(),
        }
    }

    /// Aggregation key for `name`: the normalized canonical name when an
    /// alias matches, else the normalized input.
    pub fn key(&self, name: &str) -> NormalizedKey {
        let key = normalize(name);
        match self.by_key.get(&key) {
            Some(canonical) => normalize(canonical),
            None => key,
        }
    }

    /// Configured canonical name for an aggregation key.
    pub fn canonical_for_key(&self, key: &NormalizedKey) -> Option<&str> {
        self.by_key.get(key).map(String::as_str)
    }

    /// Whether `name` is exactly one of the configured canonical names.
    pub fn is_canonical(&self, name: &str) -> bool {
        self.canonicals.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.canonicals.is_empty()
    }

    pub fn len(&self) -> usize {
        self.canonicals.len()
    }

    /// Display name for an aggregation key: the configured canonical name,
    /// else the most frequent observed spelling (ties go to the
    /// lexicographically smaller one), else the key itself.
    pub fn display_name(&self, key: &NormalizedKey, spellings: &BTreeMap<String, usize>) -> String {
        if let Some(canonical) = self.canonical_for_key(key) {
            return canonical.to_string();
        }
        spellings
            .iter()
            .max_by(|(sa, ca), (sb, cb)| ca.cmp(cb).then_with(|| sb.cmp(sa)))
            .map(|(spelling, _)| spelling.clone())
            .unwrap_or_else(|| key.to_string())
    }
}

/// Alias table written by `opcert init`: the certification spellings known
/// to drift between divisions.
pub fn starter_aliases() -> BTreeMap<String, Vec<String>> {
    [
        ("Background Check", &["BACKGROUND CHECK"][..]),
        ("CTAA Passenger Assistance", &["CTAA PASSENGER ASSISTANCE"][..]),
        ("Defensive Driving", &["Defensive Driving "][..]),
        ("DOT Driver Questionnaire ", &["DOT Driver Questionnaire"][..]),
        (
            "DOT Pre-Contracting Drug/Alc Screen ",
            &["DOT Pre-Contracting Drug/Alc Screen"][..],
        ),
        ("Driver's License_BACKSIDE", &["Driver's License_BACKSIDE "][..]),
        ("Service Agreement", &["SERVICE AGREEMENT"][..]),
        ("Social Security Card", &["SOCIAL SECURITY CARD"][..]),
    ]
    .into_iter()
    .map(|(canonical, variants)| {
        (
            canonical.to_string(),
            variants.iter().map(|v| v.to_string()).collect(),
        )
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> AliasTable {
        AliasTable::from_config(&starter_aliases()).unwrap()
    }

    #[test]
    fn canonicalize_known_variant() {
        let t = table();
        assert_eq!(t.canonicalize("BACKGROUND CHECK"), "Background Check");
        assert_eq!(t.canonicalize("  social   security card"), "Social Security Card");
    }

    #[test]
    fn canonicalize_keeps_configured_trailing_space() {
        let t = table();
        assert_eq!(
            t.canonicalize("DOT Driver Questionnaire"),
            "DOT Driver Questionnaire "
        );
    }

    #[test]
    fn canonicalize_unknown_returns_trimmed_input() {
        let t = table();
        assert_eq!(t.canonicalize("  Forklift License "), "Forklift License");
    }

    #[test]
    fn key_uses_canonical_identity() {
        let t = table();
        assert_eq!(t.key("CTAA PASSENGER ASSISTANCE").as_str(), "ctaa passenger assistance");
        assert_eq!(t.key("Forklift  License").as_str(), "forklift license");
    }

    #[test]
    fn key_folds_configured_synonyms() {
        let mut aliases = BTreeMap::new();
        aliases.insert(
            "Background Check".to_string(),
            vec!["BG Check".to_string()],
        );
        let t = AliasTable::from_config(&aliases).unwrap();
        assert_eq!(t.key("bg check"), t.key("Background Check"));
        assert_eq!(t.canonicalize("BG CHECK"), "Background Check");
    }

    #[test]
    fn is_canonical_is_exact() {
        let t = table();
        assert!(t.is_canonical("Background Check"));
        assert!(!t.is_canonical("BACKGROUND CHECK"));
        assert!(t.is_canonical("DOT Driver Questionnaire "));
        assert!(!t.is_canonical("DOT Driver Questionnaire"));
    }

    #[test]
    fn conflicting_variant_is_rejected() {
        let mut aliases = BTreeMap::new();
        aliases.insert("A".to_string(), vec!["shared".to_string()]);
        aliases.insert("B".to_string(), vec!["SHARED".to_string()]);
        let err = AliasTable::from_config(&aliases).unwrap_err();
        assert!(err.to_string().contains("maps to both"));
    }

    #[test]
    fn empty_canonical_is_rejected() {
        let mut aliases = BTreeMap::new();
        aliases.insert("  ".to_string(), vec!["x".to_string()]);
        assert!(AliasTable::from_config(&aliases).is_err());
    }

    #[test]
    fn empty_table_is_identity() {
        let t = AliasTable::new();
        assert!(t.is_empty());
        assert_eq!(t.canonicalize(" X "), "X");
        assert_eq!(t.key("X").as_str(), "x");
    }

    #[test]
    fn display_name_prefers_canonical_then_most_frequent() {
        let t = table();
        let mut spellings = BTreeMap::new();
        spellings.insert("BACKGROUND CHECK".to_string(), 9);
        assert_eq!(
            t.display_name(&normalize("background check"), &spellings),
            "Background Check"
        );

        let mut spellings = BTreeMap::new();
        spellings.insert("Forklift license".to_string(), 2);
        spellings.insert("Forklift License".to_string(), 2);
        spellings.insert("FORKLIFT LICENSE".to_string(), 1);
        assert_eq!(
            t.display_name(&normalize("forklift license"), &spellings),
            "Forklift License"
        );
    }

    #[test]
    fn starter_table_has_eight_certifications() {
        assert_eq!(table().len(), 8);
    }
}
