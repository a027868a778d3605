//! Lifecycle bottlenecks.
//!
//! Pure threshold classification over the current operator snapshot:
//! statuses and division steps holding a disproportionate share of
//! operators, the spread of divisions across their lifecycle, and steps
//! nobody currently occupies.

use crate::config::{HealthBands, Thresholds};
use crate::lifecycle::{DivisionJourneyStats, LifecycleSchema, StageDurationStats};
use crate::requirements::OperatorIndex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// How severe a concentration is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BottleneckSeverity {
    High,
    Critical,
}

impl fmt::Display for BottleneckSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BottleneckSeverity::High => write!(f, "HIGH"),
            BottleneckSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// A status holding a large share of all operators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusConcentration {
    pub status: String,
    pub operators: usize,
    pub total: usize,
    pub ratio: f64,
    pub severity: BottleneckSeverity,
}

/// A status holding a large share of one division's operators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DivisionConcentration {
    pub division: String,
    pub status: String,
    pub operators: usize,
    pub division_total: usize,
    pub ratio: f64,
    pub severity: BottleneckSeverity,
}

/// Advisory health band of a division's lifecycle spread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthBand {
    Healthy,
    Concerning,
    Critical,
}

impl fmt::Display for HealthBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthBand::Healthy => write!(f, "healthy"),
            HealthBand::Concerning => write!(f, "concerning"),
            HealthBand::Critical => write!(f, "critical"),
        }
    }
}

/// Spread of a division's operators across lifecycle orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DivisionHealth {
    pub division: String,
    /// Operators whose current status has a numeric order.
    pub operators: usize,
    pub min_order: u32,
    pub max_order: u32,
    pub spread: u32,
    pub band: HealthBand,
}

/// A step between a division's lowest and highest occupied steps that
/// nobody currently occupies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmptyStep {
    pub division: String,
    pub status: String,
    pub order: u32,
}

/// Everything the bottleneck analysis reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BottleneckReport {
    pub statuses: Vec<StatusConcentration>,
    pub divisions: Vec<DivisionConcentration>,
    pub health: Vec<DivisionHealth>,
    pub durations: Vec<StageDurationStats>,
    pub division_journeys: Vec<DivisionJourneyStats>,
    pub empty_steps: Vec<EmptyStep>,
}

fn severity(ratio: f64, thresholds: &Thresholds) -> Option<BottleneckSeverity> {
    if ratio >= thresholds.bottleneck_critical {
        Some(BottleneckSeverity::Critical)
    } else if ratio >= thresholds.bottleneck_high {
        Some(BottleneckSeverity::High)
    } else {
        None
    }
}

fn by_ratio<T>(ratio: impl Fn(&T) -> f64) -> impl Fn(&T, &T) -> std::cmp::Ordering {
    move |a, b| ratio(b).total_cmp(&ratio(a))
}

/// Statuses (across all divisions) at or above the high threshold.
pub fn status_concentration(
    operators: &OperatorIndex,
    thresholds: &Thresholds,
) -> Vec<StatusConcentration> {
    let total = operators.len();
    if total == 0 {
        return Vec::new();
    }

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for (step, members) in operators.steps() {
        *counts.entry(step.status.as_str()).or_default() += members.len();
    }

    let mut flagged: Vec<StatusConcentration> = counts
        .into_iter()
        .filter_map(|(status, count)| {
            let ratio = count as f64 / total as f64;
            severity(ratio, thresholds).map(|severity| StatusConcentration {
                status: status.to_string(),
                operators: count,
                total,
                ratio,
                severity,
            })
        })
        .collect();
    flagged.sort_by(by_ratio(|c: &StatusConcentration| c.ratio));
    flagged
}

/// Division steps whose share of the division is at or above the
/// division threshold.
pub fn division_concentration(
    operators: &OperatorIndex,
    thresholds: &Thresholds,
) -> Vec<DivisionConcentration> {
    let mut division_totals: BTreeMap<&str, usize> = BTreeMap::new();
    for (step, members) in operators.steps() {
        *division_totals.entry(step.division.as_str()).or_default() += members.len();
    }

    let mut flagged: Vec<DivisionConcentration> = operators
        .steps()
        .filter_map(|(step, members)| {
            let division_total = division_totals
                .get(step.division.as_str())
                .copied()
                .unwrap_or(0);
            if division_total == 0 {
                return None;
            }
            let ratio = members.len() as f64 / division_total as f64;
            (ratio >= thresholds.division_bottleneck).then(|| DivisionConcentration {
                division: step.division.clone(),
                status: step.status.clone(),
                operators: members.len(),
                division_total,
                ratio,
                severity: BottleneckSeverity::High,
            })
        })
        .collect();
    flagged.sort_by(by_ratio(|c: &DivisionConcentration| c.ratio));
    flagged
}

/// Classify a lifecycle spread.
pub fn health_band(spread: u32, bands: &HealthBands) -> HealthBand {
    if spread > bands.critical_above {
        HealthBand::Critical
    } else if spread > bands.concerning_above {
        HealthBand::Concerning
    } else {
        HealthBand::Healthy
    }
}

/// Collect the explicit lifecycle orders occupied in each division.
fn occupied_orders<'a>(
    operators: &'a OperatorIndex,
    schema: &LifecycleSchema,
) -> BTreeMap<&'a str, Vec<(u32, usize)>> {
    let mut occupied: BTreeMap<&str, Vec<(u32, usize)>> = BTreeMap::new();
    for (step, members) in operators.steps() {
        let order = schema
            .step(&step.division, &step.status)
            .and_then(|s| s.order);
        if let Some(order) = order {
            occupied
                .entry(step.division.as_str())
                .or_default()
                .push((order, members.len()));
        }
    }
    occupied
}

/// Spread between the lowest and highest occupied order per division.
///
/// Operators whose status has no numeric order do not count.
pub fn division_health(
    operators: &OperatorIndex,
    schema: &LifecycleSchema,
    bands: &HealthBands,
) -> Vec<DivisionHealth> {
    occupied_orders(operators, schema)
        .into_iter()
        .filter_map(|(division, orders)| {
            let min_order = orders.iter().map(|(o, _)| *o).min()?;
            let max_order = orders.iter().map(|(o, _)| *o).max()?;
            let spread = max_order - min_order;
            Some(DivisionHealth {
                division: division.to_string(),
                operators: orders.iter().map(|(_, n)| n).sum(),
                min_order,
                max_order,
                spread,
                band: health_band(spread, bands),
            })
        })
        .collect()
}

/// Steps strictly between a division's lowest and highest occupied
/// orders that hold no operators.
pub fn empty_steps(operators: &OperatorIndex, schema: &LifecycleSchema) -> Vec<EmptyStep> {
    let occupied = occupied_orders(operators, schema);
    let mut empty = Vec::new();

    for (division, orders) in &occupied {
        let (Some(min), Some(max)) = (
            orders.iter().map(|(o, _)| *o).min(),
            orders.iter().map(|(o, _)| *o).max(),
        ) else {
            continue;
        };
        for step in schema.steps(division) {
            let Some(order) = step.order else { continue };
            if order > min && order < max && !orders.iter().any(|(o, _)| *o == order) {
                empty.push(EmptyStep {
                    division: division.to_string(),
                    status: step.status_name.clone(),
                    order,
                });
            }
        }
    }
    empty
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{CoarseStatus, Operator, StatusType};
    use crate::lifecycle::{build_lifecycle_steps, DivisionFilter};

    fn operators(counts: &[(&str, &str, usize)]) -> OperatorIndex {
        let mut ops = Vec::new();
        for (division, status, count) in counts {
            for _ in 0..*count {
                ops.push(Operator {
                    id: ops.len().to_string(),
                    first_name: String::new(),
                    last_name: String::new(),
                    division_id: division.to_string(),
                    current_status: status.to_string(),
                    email: None,
                });
            }
        }
        OperatorIndex::from_operators(&ops)
    }

    fn schema(division: &str, steps: &[(&str, Option<u32>)]) -> LifecycleSchema {
        let types: Vec<StatusType> = steps
            .iter()
            .enumerate()
            .map(|(i, (name, order))| StatusType {
                id: Some(i.to_string()),
                division_id: division.to_string(),
                status_name: name.to_string(),
                order: *order,
                coarse_status_id: Some("1".to_string()),
                is_deleted: false,
                is_fleet: false,
                is_provider: false,
                cert_gate: false,
            })
            .collect();
        let coarse = vec![CoarseStatus {
            id: "1".to_string(),
            is_operator: true,
        }];
        build_lifecycle_steps(&types, &coarse, &DivisionFilter::all())
    }

    #[test]
    fn exactly_half_is_critical() {
        let index = operators(&[("2 - IL", "A", 5), ("2 - IL", "B", 5)]);
        let flagged = status_concentration(&index, &Thresholds::default());
        assert_eq!(flagged.len(), 2);
        assert!(flagged
            .iter()
            .all(|c| c.severity == BottleneckSeverity::Critical));
    }

    #[test]
    fn just_under_half_is_high() {
        let index = operators(&[("2 - IL", "A", 499), ("2 - IL", "B", 501)]);
        let flagged = status_concentration(&index, &Thresholds::default());

        let a = flagged.iter().find(|c| c.status == "A").unwrap();
        assert_eq!(a.ratio, 0.499);
        assert_eq!(a.severity, BottleneckSeverity::High);
        assert_eq!(flagged[0].status, "B");
        assert_eq!(flagged[0].severity, BottleneckSeverity::Critical);
    }

    #[test]
    fn small_share_is_not_reported() {
        let index = operators(&[("2 - IL", "A", 1), ("2 - IL", "B", 9)]);
        let flagged = status_concentration(&index, &Thresholds::default());
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].status, "B");
    }

    #[test]
    fn status_concentration_is_global_across_divisions() {
        let index = operators(&[("2 - IL", "A", 2), ("3 - TX", "A", 2), ("3 - TX", "B", 4)]);
        let flagged = status_concentration(&index, &Thresholds::default());
        let a = flagged.iter().find(|c| c.status == "A").unwrap();
        assert_eq!(a.operators, 4);
        assert_eq!(a.total, 8);
    }

    #[test]
    fn empty_snapshot_has_no_bottlenecks() {
        let index = OperatorIndex::default();
        assert!(status_concentration(&index, &Thresholds::default()).is_empty());
        assert!(division_concentration(&index, &Thresholds::default()).is_empty());
    }

    #[test]
    fn division_concentration_uses_division_share() {
        let index = operators(&[
            ("2 - IL", "A", 4),
            ("2 - IL", "B", 6),
            ("3 - TX", "A", 1),
            ("3 - TX", "C", 9),
        ]);
        let flagged = division_concentration(&index, &Thresholds::default());

        let keys: Vec<(&str, &str)> = flagged
            .iter()
            .map(|c| (c.division.as_str(), c.status.as_str()))
            .collect();
        assert_eq!(keys, vec![("3 - TX", "C"), ("2 - IL", "B"), ("2 - IL", "A")]);
    }

    #[test]
    fn health_bands() {
        let bands = HealthBands::default();
        assert_eq!(health_band(0, &bands), HealthBand::Healthy);
        assert_eq!(health_band(5, &bands), HealthBand::Healthy);
        assert_eq!(health_band(6, &bands), HealthBand::Concerning);
        assert_eq!(health_band(10, &bands), HealthBand::Concerning);
        assert_eq!(health_band(11, &bands), HealthBand::Critical);
    }

    #[test]
    fn division_health_spread() {
        let schema = schema(
            "2 - IL",
            &[("A", Some(1)), ("B", Some(4)), ("C", Some(13)), ("Hold", None)],
        );
        let index = operators(&[
            ("2 - IL", "A", 1),
            ("2 - IL", "C", 2),
            ("2 - IL", "Hold", 3),
            ("2 - IL", "Unknown", 1),
        ]);
        let health = division_health(&index, &schema, &HealthBands::default());

        assert_eq!(health.len(), 1);
        assert_eq!(health[0].operators, 3);
        assert_eq!(health[0].spread, 12);
        assert_eq!(health[0].band, HealthBand::Critical);
    }

    #[test]
    fn empty_steps_between_occupied_orders() {
        let schema = schema(
            "2 - IL",
            &[("A", Some(1)), ("B", Some(2)), ("C", Some(3)), ("D", Some(4)), ("E", Some(5))],
        );
        let index = operators(&[("2 - IL", "A", 1), ("2 - IL", "D", 1)]);
        let empty = empty_steps(&index, &schema);

        let names: Vec<&str> = empty.iter().map(|e| e.status.as_str()).collect();
        assert_eq!(names, vec!["B", "C"]);
    }
}
