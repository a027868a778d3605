//! Prioritised recommendations.
//!
//! Turns the bottleneck and gap findings into a short list of issues, each
//! with the action a lifecycle owner should take. Rules run in a fixed
//! order and the result is stably sorted by priority, so equal-priority
//! items keep the order they were produced in.

use crate::analysis::bottleneck::{BottleneckReport, BottleneckSeverity, HealthBand};
use crate::analysis::gaps::GapSummary;
use crate::config::{RecommendationRules, Thresholds};
use crate::lifecycle::LifecycleSchema;
use crate::requirements::OperatorIndex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// How soon a recommendation should be acted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    Medium,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Critical => write!(f, "CRITICAL"),
            Priority::High => write!(f, "HIGH"),
            Priority::Medium => write!(f, "MEDIUM"),
        }
    }
}

/// What kind of problem a recommendation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    VolumeBottleneck,
    EarlyStage,
    ProcessGap,
    DivisionIssue,
    ComplianceGap,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Category::VolumeBottleneck => "Volume bottleneck",
            Category::EarlyStage => "Early stage",
            Category::ProcessGap => "Process gap",
            Category::DivisionIssue => "Division issue",
            Category::ComplianceGap => "Compliance gap",
        };
        f.write_str(label)
    }
}

/// One prioritised issue and what to do about it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub priority: Priority,
    pub category: Category,
    pub issue: String,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub division: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Recommendation {
    fn new(
        priority: Priority,
        category: Category,
        issue: String,
        action: impl Into<String>,
    ) -> Self {
        Self {
            priority,
            category,
            issue,
            action: action.into(),
            division: None,
            status: None,
        }
    }

    fn in_division(mut self, division: &str) -> Self {
        self.division = Some(division.to_string());
        self
    }

    fn at_status(mut self, status: &str) -> Self {
        self.status = Some(status.to_string());
        self
    }
}

/// Everything the recommendation rules look at.
#[derive(Debug, Clone, Copy)]
pub struct RecommendationInputs<'a> {
    pub operators: &'a OperatorIndex,
    pub schema: &'a LifecycleSchema,
    pub bottlenecks: &'a BottleneckReport,
    pub gap_summary: &'a GapSummary,
    pub thresholds: &'a Thresholds,
    pub rules: &'a RecommendationRules,
}

fn percent(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

/// Explicit lifecycle order of every operator that has one, per division.
fn orders_by_division(
    operators: &OperatorIndex,
    schema: &LifecycleSchema,
) -> BTreeMap<String, Vec<(u32, usize)>> {
    let mut orders: BTreeMap<String, Vec<(u32, usize)>> = BTreeMap::new();
    for (step, members) in operators.steps() {
        if let Some(order) = schema
            .step(&step.division, &step.status)
            .and_then(|s| s.order)
        {
            orders
                .entry(step.division.clone())
                .or_default()
                .push((order, members.len()));
        }
    }
    orders
}

fn volume(inputs: &RecommendationInputs<'_>, out: &mut Vec<Recommendation>) {
    for concentration in &inputs.bottlenecks.statuses {
        let (priority, action) = match concentration.severity {
            BottleneckSeverity::Critical => (
                Priority::Critical,
                format!(
                    "Run a root cause review of '{}' and assign dedicated staff to move operators through it",
                    concentration.status
                ),
            ),
            BottleneckSeverity::High => (
                Priority::High,
                format!(
                    "Review the requirements of '{}' and track operators there weekly",
                    concentration.status
                ),
            ),
        };
        let issue = format!(
            "{} operators ({}) are at '{}'",
            concentration.operators,
            percent(concentration.ratio),
            concentration.status
        );
        out.push(
            Recommendation::new(priority, Category::VolumeBottleneck, issue, action)
                .at_status(&concentration.status),
        );
    }
}

fn early_stage(
    inputs: &RecommendationInputs<'_>,
    orders: &BTreeMap<String, Vec<(u32, usize)>>,
    out: &mut Vec<Recommendation>,
) {
    let total = inputs.operators.len();
    if total == 0 {
        return;
    }
    let rules = inputs.rules;
    let early: usize = orders
        .values()
        .flatten()
        .filter(|(order, _)| *order < rules.early_stage_below)
        .map(|(_, n)| n)
        .sum();
    let share = early as f64 / total as f64;

    let (priority, action) = if share > rules.early_stage_critical {
        (
            Priority::Critical,
            "Audit onboarding and credentialing, then fast-track operators who already hold their documents",
        )
    } else if share > rules.early_stage_high {
        (
            Priority::High,
            "Track early-stage operators weekly and escalate anyone waiting more than two weeks",
        )
    } else {
        return;
    };
    let issue = format!(
        "{} operators ({}) are in lifecycle steps below order {}",
        early,
        percent(share),
        rules.early_stage_below
    );
    out.push(Recommendation::new(
        priority,
        Category::EarlyStage,
        issue,
        action,
    ));
}

fn process_gaps(inputs: &RecommendationInputs<'_>, out: &mut Vec<Recommendation>) {
    let mut by_division: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for step in &inputs.bottlenecks.empty_steps {
        by_division
            .entry(step.division.as_str())
            .or_default()
            .push(step.status.as_str());
    }
    for (division, statuses) in by_division {
        let issue = format!(
            "{}: {} steps inside the occupied range hold no operators ({})",
            division,
            statuses.len(),
            statuses.join(", ")
        );
        out.push(
            Recommendation::new(
                Priority::High,
                Category::ProcessGap,
                issue,
                "Check whether operators skip these steps or whether the steps are retired",
            )
            .in_division(division),
        );
    }
}

fn divisions(
    inputs: &RecommendationInputs<'_>,
    orders: &BTreeMap<String, Vec<(u32, usize)>>,
    out: &mut Vec<Recommendation>,
) {
    for health in &inputs.bottlenecks.health {
        let Some(occupied) = orders.get(&health.division) else {
            continue;
        };
        let counted: usize = occupied.iter().map(|(_, n)| n).sum();
        if counted == 0 {
            continue;
        }
        let average = occupied
            .iter()
            .map(|(order, n)| f64::from(*order) * *n as f64)
            .sum::<f64>()
            / counted as f64;

        if average < inputs.rules.stalled_average_below {
            let issue = format!(
                "{}: {} operators are stuck early (average order {:.1})",
                health.division, counted, average
            );
            out.push(
                Recommendation::new(
                    Priority::High,
                    Category::DivisionIssue,
                    issue,
                    "Compare the division's early steps with better-performing divisions",
                )
                .in_division(&health.division),
            );
        } else if health.band == HealthBand::Critical {
            let issue = format!(
                "{}: operators are spread across {} steps",
                health.division, health.spread
            );
            out.push(
                Recommendation::new(
                    Priority::Medium,
                    Category::DivisionIssue,
                    issue,
                    "Check that every office applies the same lifecycle procedure",
                )
                .in_division(&health.division),
            );
        }
    }
}

fn compliance(inputs: &RecommendationInputs<'_>, out: &mut Vec<Recommendation>) {
    for (status, tally) in &inputs.gap_summary.by_status {
        if tally.operators == 0 {
            continue;
        }
        let most = tally
            .missing
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)));
        let Some((cert, count)) = most else { continue };
        let share = *count as f64 / tally.operators as f64;
        if share < inputs.rules.compliance_share {
            continue;
        }
        let issue = format!(
            "{} of {} operators at '{}' are missing '{}'",
            count, tally.operators, status, cert
        );
        let action = format!(
            "Schedule '{}' for operators at '{}' before they can advance",
            cert, status
        );
        out.push(
            Recommendation::new(Priority::High, Category::ComplianceGap, issue, action)
                .at_status(status),
        );
    }

    let small = inputs.gap_summary.total.insufficient_sample;
    if small > 0 {
        let issue = format!(
            "{} operators are measured against steps with fewer than {} operators",
            small, inputs.thresholds.min_sample_size
        );
        out.push(Recommendation::new(
            Priority::Medium,
            Category::ComplianceGap,
            issue,
            "Confirm their requirements by hand or lower thresholds.min_sample_size",
        ));
    }
}

/// Produce the prioritised recommendations, most urgent first.
pub fn recommend(inputs: &RecommendationInputs<'_>) -> Vec<Recommendation> {
    let orders = orders_by_division(inputs.operators, inputs.schema);
    let mut out = Vec::new();

    volume(inputs, &mut out);
    early_stage(inputs, &orders, &mut out);
    process_gaps(inputs, &mut out);
    divisions(inputs, &orders, &mut out);
    compliance(inputs, &mut out);

    out.sort_by_key(|r| r.priority);
    out
}
