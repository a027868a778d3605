//! Journeys command implementation.
//!
//! The `opcert journeys` command shows how long operators spend in each
//! lifecycle status.

use std::path::{Path, PathBuf};

use crate::analysis::AnalysisReport;
use crate::cli::args::JourneysArgs;
use crate::error::Result;
use crate::lifecycle::OperatorJourney;
use crate::ui::{Table, UserInterface};

use super::context::{AnalysisContext, GlobalOptions};
use super::dispatcher::{Command, CommandResult};
use super::display;

/// The journeys command implementation.
pub struct JourneysCommand {
    project_root: PathBuf,
    options: GlobalOptions,
    args: JourneysArgs,
}

impl JourneysCommand {
    /// Create a new journeys command.
    pub fn new(project_root: &Path, options: GlobalOptions, args: JourneysArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            options,
            args,
        }
    }

    fn show_journey(ui: &mut dyn UserInterface, journey: &OperatorJourney) {
        ui.show_header(&format!(
            "Operator {} ({})",
            journey.operator_id,
            journey.division_id.as_deref().unwrap_or("unknown division")
        ));

        let mut table = Table::new(vec!["Status", "Entered", "Exited", "Days"]).numeric(&[3]);
        for stage in &journey.stages {
            let exited = if stage.current {
                "current".to_string()
            } else {
                display::date(stage.exited_at)
            };
            table.add_row(vec![
                stage.status.clone(),
                display::date(stage.entered_at),
                exited,
                stage.days.to_string(),
            ]);
        }
        ui.show_table(&table);
        ui.message(&format!("Total: {} days", journey.total_days));
    }

    fn show_overview(ui: &mut dyn UserInterface, report: &AnalysisReport) {
        ui.show_header("Operator journeys");
        let mut table =
            Table::new(vec!["Operator", "Division", "Current", "Stages", "Days"]).numeric(&[3, 4]);
        for journey in &report.journeys {
            table.add_row(vec![
                journey.operator_id.clone(),
                journey.division_id.clone().unwrap_or_else(|| "-".to_string()),
                journey
                    .current_status
                    .clone()
                    .unwrap_or_else(|| "-".to_string()),
                journey.stages.len().to_string(),
                journey.total_days.to_string(),
            ]);
        }
        ui.show_table(&table);

        let durations = &report.bottlenecks.durations;
        if !durations.is_empty() {
            ui.show_header("Time in status");
            let mut table = Table::new(vec!["Status", "Operators", "Avg days", "Min", "Max"])
                .numeric(&[1, 2, 3, 4]);
            for stat in durations {
                table.add_row(vec![
                    stat.status.clone(),
                    stat.operators.to_string(),
                    display::days(stat.avg_days),
                    stat.min_days.to_string(),
                    stat.max_days.to_string(),
                ]);
            }
            ui.show_table(&table);
        }

        ui.message(&format!(
            "Average journey: {} days",
            display::days(report.summary.average_journey_days)
        ));
    }
}

impl Command for JourneysCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(ctx) = AnalysisContext::load_or_report(&self.project_root, &self.options, ui)?
        else {
            return Ok(CommandResult::failure(2));
        };
        let report = &ctx.report;

        if let Some(id) = &self.args.operator {
            let Some(journey) = report.journey(id) else {
                ui.error(&format!("Operator '{}' not found", id));
                return Ok(CommandResult::failure(1));
            };
            if self.args.json {
                display::emit_json(ui, journey)?;
            } else if journey.stages.is_empty() {
                ui.warning(&format!("No status history for operator '{}'", id));
            } else {
                Self::show_journey(ui, journey);
            }
            return Ok(CommandResult::success());
        }

        if self.args.json {
            display::emit_json(ui, &report.journeys)?;
            return Ok(CommandResult::success());
        }

        if report.journeys.iter().all(|j| j.stages.is_empty()) {
            ui.warning("No status history found");
            return Ok(CommandResult::success());
        }

        Self::show_overview(ui, report);
        Ok(CommandResult::success())
    }
}
