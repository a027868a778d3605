//! Adoption classification bands.

use crate::config::Thresholds;
use serde::Serialize;
use std::fmt;

/// How strongly a certification is associated with a lifecycle step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    /// Held by at least the required share of a large enough population.
    Required,
    /// Would be required, but the population is below the minimum sample.
    Provisional,
    /// Held by at least the common share.
    Common,
    Optional,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Required => "REQUIRED",
            Classification::Provisional => "PROVISIONAL",
            Classification::Common => "COMMON",
            Classification::Optional => "OPTIONAL",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify an unrounded adoption fraction.
///
/// Bands are inclusive at their lower bound. A step with fewer operators
/// than `min_sample_size` never yields `Required`.
pub fn classify(adoption: f64, population: usize, thresholds: &Thresholds) -> Classification {
    if adoption >= thresholds.required {
        if population < thresholds.min_sample_size {
            Classification::Provisional
        } else {
            Classification::Required
        }
    } else if adoption >= thresholds.common {
        Classification::Common
    } else {
        Classification::Optional
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_are_inclusive_below() {
        let t = Thresholds::default();
        assert_eq!(classify(0.80, 10, &t), Classification::Required);
        assert_eq!(classify(0.7999, 10, &t), Classification::Common);
        assert_eq!(classify(0.50, 10, &t), Classification::Common);
        assert_eq!(classify(0.4999, 10, &t), Classification::Optional);
        assert_eq!(classify(0.0, 10, &t), Classification::Optional);
    }

    #[test]
    fn near_boundary_is_not_rounded_up() {
        let t = Thresholds::default();
        assert_eq!(classify(0.79996, 100_000, &t), Classification::Common);
    }

    #[test]
    fn eight_of_ten_is_required() {
        let t = Thresholds::default();
        assert_eq!(classify(8.0 / 10.0, 10, &t), Classification::Required);
    }

    #[test]
    fn small_population_is_provisional() {
        let t = Thresholds::default();
        assert_eq!(classify(1.0, 1, &t), Classification::Provisional);
        assert_eq!(classify(1.0, 2, &t), Classification::Provisional);
        assert_eq!(classify(1.0, 3, &t), Classification::Required);
        assert_eq!(classify(0.5, 2, &t), Classification::Common);
    }

    #[test]
    fn display_is_uppercase() {
        assert_eq!(Classification::Required.to_string(), "REQUIRED");
        assert_eq!(
            serde_json::to_string(&Classification::Provisional).unwrap(),
            "\"PROVISIONAL\""
        );
    }
}
