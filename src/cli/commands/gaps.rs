//! Gaps command implementation.
//!
//! The `opcert gaps` command lists operators missing certifications for
//! their next lifecycle step, or details a single operator.

use std::path::{Path, PathBuf};

use crate::analysis::{AnalysisReport, CertRef, ComplianceGap, GapTally, RequirementBasis};
use crate::cli::args::GapsArgs;
use crate::error::Result;
use crate::ui::{Table, UserInterface};

use super::context::{AnalysisContext, GlobalOptions};
use super::dispatcher::{Command, CommandResult};
use super::display;

/// The gaps command implementation.
pub struct GapsCommand {
    project_root: PathBuf,
    options: GlobalOptions,
    args: GapsArgs,
}

fn names(certs: &[CertRef]) -> String {
    if certs.is_empty() {
        return "-".to_string();
    }
    certs
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn basis_note(basis: &RequirementBasis) -> Option<String> {
    match basis {
        RequirementBasis::Computed => None,
        RequirementBasis::NoTarget => {
            Some("Status is not part of the division's lifecycle".to_string())
        }
        RequirementBasis::NoData => Some("Nobody is currently at the target step".to_string()),
        RequirementBasis::InsufficientSample { population } => Some(format!(
            "Only {} operators at the target step; requirements not inferred",
            population
        )),
    }
}

impl GapsCommand {
    /// Create a new gaps command.
    pub fn new(project_root: &Path, options: GlobalOptions, args: GapsArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            options,
            args,
        }
    }

    fn show_operator(
        ui: &mut dyn UserInterface,
        report: &AnalysisReport,
        id: &str,
    ) -> CommandResult {
        let Some(gap) = report.gap(id) else {
            ui.error(&format!("Operator '{}' not found", id));
            return CommandResult::failure(1);
        };

        ui.show_header(&format!("{} ({})", gap.operator_name, gap.operator_id));
        let mut table = Table::new(vec!["Field", "Value"]);
        let rows = [
            ("Division", gap.division.clone()),
            ("Current status", gap.current_status.clone()),
            ("Next status", gap.next_status.clone()),
            ("Required", names(&gap.required)),
            ("Satisfied", names(&gap.satisfied)),
            ("Missing", names(&gap.missing)),
            ("Progress", format!("{}%", gap.progress_percent)),
        ];
        for (field, value) in rows {
            table.add_row(vec![field.to_string(), value]);
        }
        ui.show_table(&table);

        if let Some(note) = basis_note(&gap.basis) {
            ui.warning(&note);
        }
        for hint in &gap.naming_hints {
            ui.show_hint(&format!(
                "'{}' is held and looks like missing '{}' ({})",
                hint.held,
                hint.missing,
                display::percent(hint.ratio)
            ));
        }
        if gap.is_ready() {
            ui.success("Holds every certification required for the next step");
        }
        CommandResult::success()
    }

    fn show_tally(ui: &mut dyn UserInterface, by_status: &[(&String, &GapTally)]) {
        let mut table = Table::new(vec![
            "Status",
            "Operators",
            "Compliant",
            "With gaps",
            "No requirement",
            "Small sample",
            "Unknown status",
            "Most missing",
        ])
        .numeric(&[1, 2, 3, 4, 5, 6]);
        for (status, tally) in by_status {
            let most = tally
                .missing
                .iter()
                .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
                .map(|(name, count)| format!("{} ({})", name, count))
                .unwrap_or_else(|| "-".to_string());
            table.add_row(vec![
                status.to_string(),
                tally.operators.to_string(),
                tally.compliant.to_string(),
                tally.non_compliant.to_string(),
                tally.no_requirement.to_string(),
                tally.insufficient_sample.to_string(),
                tally.unknown_status.to_string(),
                most,
            ]);
        }
        ui.show_table(&table);
    }
}

impl Command for GapsCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(ctx) = AnalysisContext::load_or_report(&self.project_root, &self.options, ui)?
        else {
            return Ok(CommandResult::failure(2));
        };
        let report = &ctx.report;

        if let Some(id) = &self.args.operator {
            if self.args.json {
                return match report.gap(id) {
                    Some(gap) => {
                        display::emit_json(ui, gap)?;
                        Ok(CommandResult::success())
                    }
                    None => {
                        ui.error(&format!("Operator '{}' not found", id));
                        Ok(CommandResult::failure(1))
                    }
                };
            }
            return Ok(Self::show_operator(ui, report, id));
        }

        let filter = display::division_filter(self.args.division.as_deref());
        let selected: Vec<&ComplianceGap> = report
            .gaps
            .iter()
            .filter(|g| filter.allows(&g.division))
            .filter(|g| self.args.all || g.has_gap())
            .collect();

        if self.args.json {
            display::emit_json(ui, &selected)?;
            return Ok(CommandResult::success());
        }

        if selected.is_empty() {
            ui.success("No operator is missing a required certification");
            return Ok(CommandResult::success());
        }

        ui.show_header("Compliance gaps");
        let mut table = Table::new(vec![
            "Operator", "Name", "Division", "Status", "Next", "Missing", "Progress",
        ])
        .numeric(&[6]);
        for gap in &selected {
            table.add_row(vec![
                gap.operator_id.clone(),
                gap.operator_name.clone(),
                gap.division.clone(),
                gap.current_status.clone(),
                gap.next_status.clone(),
                names(&gap.missing),
                format!("{}%", gap.progress_percent),
            ]);
        }
        ui.show_table(&table);

        let by_status: Vec<(&String, &GapTally)> = report
            .gap_summary
            .by_status
            .iter()
            .filter(|(_, tally)| tally.operators > 0)
            .collect();
        if !by_status.is_empty() {
            ui.show_header("By current status");
            Self::show_tally(ui, &by_status);
        }

        let with_gaps = selected.iter().filter(|g| g.has_gap()).count();
        ui.message(&format!("{} operators with gaps", with_gaps));
        ui.show_hint("Run 'opcert gaps --operator <id>' for details");

        Ok(CommandResult::success())
    }
}
