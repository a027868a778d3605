//! Bottlenecks command implementation.
//!
//! The `opcert bottlenecks` command shows where operators accumulate:
//! status concentration, per-division concentration, lifecycle spread,
//! slow stages and empty steps, followed by the prioritised
//! recommendations drawn from them.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::analysis::{BottleneckReport, Recommendation};
use crate::cli::args::BottlenecksArgs;
use crate::error::Result;
use crate::ui::{OpcertTheme, Table, UserInterface};

use super::context::{AnalysisContext, GlobalOptions};
use super::dispatcher::{Command, CommandResult};
use super::display;

/// Slowest stages listed outside verbose mode.
const SLOWEST_STAGES: usize = 5;

/// JSON shape: the bottleneck report plus its recommendations.
#[derive(Serialize)]
struct BottlenecksJson<'a> {
    #[serde(flatten)]
    bottlenecks: &'a BottleneckReport,
    recommendations: &'a [Recommendation],
}

/// The bottlenecks command implementation.
pub struct BottlenecksCommand {
    project_root: PathBuf,
    options: GlobalOptions,
    args: BottlenecksArgs,
}

impl BottlenecksCommand {
    /// Create a new bottlenecks command.
    pub fn new(project_root: &Path, options: GlobalOptions, args: BottlenecksArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            options,
            args,
        }
    }

    fn show_concentration(ui: &mut dyn UserInterface, theme: &OpcertTheme, b: &BottleneckReport) {
        ui.show_header("Status concentration");
        if b.statuses.is_empty() {
            ui.success("No status holds a bottleneck share of operators");
        } else {
            let mut table =
                Table::new(vec!["Status", "Operators", "Share", "Severity"]).numeric(&[1, 2]);
            for s in &b.statuses {
                table.add_row(vec![
                    s.status.clone(),
                    format!("{}/{}", s.operators, s.total),
                    display::percent(s.ratio),
                    theme.bottleneck(s.severity).apply_to(s.severity).to_string(),
                ]);
            }
            ui.show_table(&table);
        }

        if !b.divisions.is_empty() {
            ui.show_header("Division concentration");
            let mut table = Table::new(vec!["Division", "Status", "Operators", "Share", "Severity"])
                .numeric(&[2, 3]);
            for d in &b.divisions {
                table.add_row(vec![
                    d.division.clone(),
                    d.status.clone(),
                    format!("{}/{}", d.operators, d.division_total),
                    display::percent(d.ratio),
                    theme.bottleneck(d.severity).apply_to(d.severity).to_string(),
                ]);
            }
            ui.show_table(&table);
        }
    }

    fn show_health(ui: &mut dyn UserInterface, theme: &OpcertTheme, b: &BottleneckReport) {
        if b.health.is_empty() {
            return;
        }
        ui.show_header("Lifecycle spread");
        let mut table = Table::new(vec!["Division", "Operators", "Orders", "Spread", "Health"])
            .numeric(&[1, 3]);
        for h in &b.health {
            table.add_row(vec![
                h.division.clone(),
                h.operators.to_string(),
                format!("{}-{}", h.min_order, h.max_order),
                h.spread.to_string(),
                theme.health(h.band).apply_to(h.band).to_string(),
            ]);
        }
        ui.show_table(&table);
    }

    fn show_durations(ui: &mut dyn UserInterface, b: &BottleneckReport) {
        if b.durations.is_empty() {
            return;
        }
        let limit = if ui.output_mode().shows_detail() {
            b.durations.len()
        } else {
            SLOWEST_STAGES
        };
        ui.show_header("Slowest stages");
        let mut table =
            Table::new(vec!["Status", "Operators", "Avg days", "Max days"]).numeric(&[1, 2, 3]);
        for stat in b.durations.iter().take(limit) {
            table.add_row(vec![
                stat.status.clone(),
                stat.operators.to_string(),
                display::days(stat.avg_days),
                stat.max_days.to_string(),
            ]);
        }
        ui.show_table(&table);

        if let Some(slowest) = b.division_journeys.first() {
            ui.message(&format!(
                "Longest average journey: {} ({} days)",
                slowest.division,
                display::days(slowest.avg_total_days)
            ));
        }
    }

    fn show_empty_steps(ui: &mut dyn UserInterface, b: &BottleneckReport) {
        if b.empty_steps.is_empty() {
            return;
        }
        ui.show_header("Empty lifecycle steps");
        let mut table = Table::new(vec!["Division", "Order", "Status"]).numeric(&[1]);
        for step in &b.empty_steps {
            table.add_row(vec![
                step.division.clone(),
                step.order.to_string(),
                step.status.clone(),
            ]);
        }
        ui.show_table(&table);
        ui.show_hint("Nobody sits between occupied steps; the step may be skipped or obsolete");
    }

    fn show_recommendations(
        ui: &mut dyn UserInterface,
        theme: &OpcertTheme,
        recommendations: &[Recommendation],
    ) {
        ui.show_header("Recommendations");
        if recommendations.is_empty() {
            ui.success("Nothing needs attention");
            return;
        }
        let mut table = Table::new(vec!["#", "Priority", "Category", "Issue"]).numeric(&[0]);
        for (i, rec) in recommendations.iter().enumerate() {
            table.add_row(vec![
                (i + 1).to_string(),
                theme.priority(rec.priority).apply_to(rec.priority).to_string(),
                rec.category.to_string(),
                rec.issue.clone(),
            ]);
        }
        ui.show_table(&table);
        for (i, rec) in recommendations.iter().enumerate() {
            ui.message(&format!("{}. {}", i + 1, rec.action));
        }
    }
}

impl Command for BottlenecksCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(ctx) = AnalysisContext::load_or_report(&self.project_root, &self.options, ui)?
        else {
            return Ok(CommandResult::failure(2));
        };
        let b = &ctx.report.bottlenecks;
        let recommendations = &ctx.report.recommendations;

        if self.args.json {
            let json = BottlenecksJson {
                bottlenecks: b,
                recommendations,
            };
            display::emit_json(ui, &json)?;
            return Ok(CommandResult::success());
        }

        let theme = display::theme_for(ui);
        Self::show_concentration(ui, &theme, b);
        Self::show_health(ui, &theme, b);
        Self::show_durations(ui, b);
        Self::show_empty_steps(ui, b);
        Self::show_recommendations(ui, &theme, recommendations);

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::fixtures;
    use crate::ui::MockUI;

    fn run(args: BottlenecksArgs) -> MockUI {
        let temp = fixtures::project();
        let cmd = BottlenecksCommand::new(temp.path(), GlobalOptions::default(), args);
        let mut ui = MockUI::new();
        let result = cmd.execute(&mut ui).unwrap();
        assert!(result.success);
        ui
    }

    #[test]
    fn shows_status_concentration() {
        let ui = run(BottlenecksArgs::default());

        assert!(ui.table_contains("4/7"));
        assert!(ui.table_contains("57.1%"));
        assert!(ui.table_contains("CRITICAL"));
        assert!(ui.table_contains("2/7"));
        assert!(ui.table_contains("HIGH"));
    }

    #[test]
    fn shows_health_and_durations() {
        let ui = run(BottlenecksArgs::default());

        assert!(ui.table_contains("1-3"));
        assert!(ui.table_contains("healthy"));
        assert!(ui.has_message("Longest average journey: 2 - IL (122.0 days)"));
        assert!(!ui.headers().iter().any(|h| h == "Empty lifecycle steps"));
    }

    #[test]
    fn json_report() {
        let ui = run(BottlenecksArgs { json: true });
        let report: serde_json::Value = serde_json::from_str(&ui.data_output()).unwrap();
        assert_eq!(report["statuses"][0]["status"], "Active");
        assert_eq!(report["statuses"][0]["severity"], "critical");
        assert_eq!(report["health"][0]["band"], "healthy");
        assert_eq!(report["recommendations"].as_array().unwrap().len(), 6);
        assert_eq!(report["recommendations"][0]["priority"], "critical");
    }

    #[test]
    fn lists_recommendations_by_priority() {
        let ui = run(BottlenecksArgs::default());

        assert!(ui.headers().iter().any(|h| h == "Recommendations"));
        let table = ui.tables().last().unwrap();
        let priorities: Vec<&str> = table
            .lines()
            .filter_map(|line| line.split('│').nth(2).map(str::trim))
            .filter(|p| ["CRITICAL", "HIGH", "MEDIUM"].contains(p))
            .collect();
        assert_eq!(
            priorities,
            ["CRITICAL", "CRITICAL", "HIGH", "HIGH", "HIGH", "MEDIUM"]
        );
        assert!(ui.table_contains("4 operators (57.1%) are at 'Active'"));
        assert!(ui.table_contains("2 - IL: 7 operators are stuck early (average order 2.4)"));
        assert!(ui.table_contains("1 of 2 operators at 'Onboarding' are missing 'Background Check'"));
        assert!(ui.has_message("6. Confirm their requirements by hand"));
    }
}
