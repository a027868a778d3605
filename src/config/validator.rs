//! Configuration validation rules.
//!
//! A run never starts with an inconsistent configuration:
//! - every ratio lies in `[0, 1]`
//! - band thresholds are ordered (`common <= required`, `high <= critical`)
//! - the minimum sample size is at least one
//! - the alias table maps each variant to exactly one canonical name
//! - `data.as_of`, when present, is a parseable timestamp

use crate::config::schema::AnalysisConfig;
use crate::error::{OpcertError, Result};
use crate::ingest::coerce::parse_timestamp;
use crate::normalize::AliasTable;

/// Validation error with context.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Dotted path of the offending key
    pub field: String,
    /// Human-readable error message
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Validate a configuration and return all errors.
///
/// All problems are collected so they can be fixed in one pass.
pub fn validate_config(config: &AnalysisConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let t = &config.thresholds;

    for (field, value) in [
        ("thresholds.required", t.required),
        ("thresholds.common", t.common),
        ("thresholds.bottleneck_high", t.bottleneck_high),
        ("thresholds.bottleneck_critical", t.bottleneck_critical),
        ("thresholds.division_bottleneck", t.division_bottleneck),
    ] {
        if !(0.0..=1.0).contains(&value) {
            errors.push(ValidationError::new(
                field,
                format!("{} must be within [0, 1], got {}", field, value),
            ));
        }
    }

    if !(t.fuzzy_match > 0.0 && t.fuzzy_match <= 1.0) {
        errors.push(ValidationError::new(
            "thresholds.fuzzy_match",
            format!(
                "thresholds.fuzzy_match must be within (0, 1], got {}",
                t.fuzzy_match
            ),
        ));
    }

    if t.common > t.required {
        errors.push(ValidationError::new(
            "thresholds.common",
            format!(
                "thresholds.common ({}) must not exceed thresholds.required ({})",
                t.common, t.required
            ),
        ));
    }

    if t.bottleneck_high > t.bottleneck_critical {
        errors.push(ValidationError::new(
            "thresholds.bottleneck_high",
            format!(
                "thresholds.bottleneck_high ({}) must not exceed thresholds.bottleneck_critical ({})",
                t.bottleneck_high, t.bottleneck_critical
            ),
        ));
    }

    if t.min_sample_size == 0 {
        errors.push(ValidationError::new(
            "thresholds.min_sample_size",
            "thresholds.min_sample_size must be at least 1",
        ));
    }

    if config.health.concerning_above > config.health.critical_above {
        errors.push(ValidationError::new(
            "health.concerning_above",
            format!(
                "health.concerning_above ({}) must not exceed health.critical_above ({})",
                config.health.concerning_above, config.health.critical_above
            ),
        ));
    }

    let r = &config.recommendations;
    for (field, value) in [
        ("recommendations.early_stage_high", r.early_stage_high),
        ("recommendations.early_stage_critical", r.early_stage_critical),
        ("recommendations.compliance_share", r.compliance_share),
    ] {
        if !(0.0..=1.0).contains(&value) {
            errors.push(ValidationError::new(
                field,
                format!("{} must be within [0, 1], got {}", field, value),
            ));
        }
    }

    if r.early_stage_high > r.early_stage_critical {
        errors.push(ValidationError::new(
            "recommendations.early_stage_high",
            format!(
                "recommendations.early_stage_high ({}) must not exceed recommendations.early_stage_critical ({})",
                r.early_stage_high, r.early_stage_critical
            ),
        ));
    }

    for prefix in config
        .divisions
        .include
        .iter()
        .chain(config.divisions.exclude.iter())
    {
        if prefix.trim().is_empty() {
            errors.push(ValidationError::new(
                "divisions",
                "division prefixes must not be empty",
            ));
        }
    }

    if let Err(OpcertError::ConfigValidationError { message }) =
        AliasTable::from_config(&config.aliases)
    {
        errors.push(ValidationError::new("aliases", message));
    }

    if let Some(as_of) = &config.data.as_of {
        if parse_timestamp(as_of).is_none() {
            errors.push(ValidationError::new(
                "data.as_of",
                format!("data.as_of is not a recognised timestamp: '{}'", as_of),
            ));
        }
    }

    errors
}

/// Validate a configuration, returning the first batch of errors as a
/// single [`OpcertError::ConfigValidationError`].
pub fn validate(config: &AnalysisConfig) -> Result<()> {
    let errors = validate_config(config);
    if errors.is_empty() {
        return Ok(());
    }

    let message = errors
        .iter()
        .map(|e| e.message.clone())
        .collect::<Vec<_>>()
        .join("; ");
    Err(OpcertError::ConfigValidationError { message })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_from(yaml: &str) -> AnalysisConfig {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn default_config_is_valid() {
        assert!(validate(&AnalysisConfig::default()).is_ok());
    }

    #[test]
    fn ratio_out_of_range_is_rejected() {
        let config = config_from("thresholds:\n  required: 1.5\n");
        let errors = validate_config(&config);
        assert!(errors.iter().any(|e| e.field == "thresholds.required"));
    }

    #[test]
    fn common_above_required_is_rejected() {
        let config = config_from("thresholds:\n  required: 0.6\n  common: 0.7\n");
        let errors = validate_config(&config);
        assert!(errors.iter().any(|e| e.field == "thresholds.common"));
    }

    #[test]
    fn inverted_bottleneck_bands_are_rejected() {
        let config = config_from("thresholds:\n  bottleneck_high: 0.6\n");
        let errors = validate_config(&config);
        assert!(errors.iter().any(|e| e.field == "thresholds.bottleneck_high"));
    }

    #[test]
    fn zero_sample_size_is_rejected() {
        let config = config_from("thresholds:\n  min_sample_size: 0\n");
        assert!(validate(&config).is_err());
    }

    #[test]
    fn zero_fuzzy_threshold_is_rejected() {
        let config = config_from("thresholds:\n  fuzzy_match: 0.0\n");
        let errors = validate_config(&config);
        assert!(errors.iter().any(|e| e.field == "thresholds.fuzzy_match"));
    }

    #[test]
    fn inverted_health_bands_are_rejected() {
        let config = config_from("health:\n  concerning_above: 12\n");
        let errors = validate_config(&config);
        assert!(errors.iter().any(|e| e.field == "health.concerning_above"));
    }

    #[test]
    fn inverted_early_stage_shares_are_rejected() {
        let config = config_from("recommendations:\n  early_stage_high: 0.5\n");
        let errors = validate_config(&config);
        assert!(errors
            .iter()
            .any(|e| e.field == "recommendations.early_stage_high"));
    }

    #[test]
    fn conflicting_aliases_are_rejected() {
        let config = config_from(
            "aliases:\n  Background Check: [BG Check]\n  Background Screening: ['bg  check']\n",
        );
        let errors = validate_config(&config);
        assert!(errors.iter().any(|e| e.field == "aliases"));
    }

    #[test]
    fn unparseable_as_of_is_rejected() {
        let config = config_from("data:\n  as_of: yesterday\n");
        let errors = validate_config(&config);
        assert!(errors.iter().any(|e| e.field == "data.as_of"));
    }

    #[test]
    fn validate_joins_messages() {
        let config = config_from("thresholds:\n  required: 2.0\n  min_sample_size: 0\n");
        match validate(&config) {
            Err(OpcertError::ConfigValidationError { message }) => {
                assert!(message.contains("thresholds.required"));
                assert!(message.contains("min_sample_size"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
