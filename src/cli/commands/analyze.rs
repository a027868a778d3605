//! Analyze command implementation.
//!
//! The `opcert analyze` command runs the full pipeline and writes the JSON
//! report.

use std::fs;
use std::path::{Path, PathBuf};

use crate::analysis::AnalysisReport;
use crate::cli::args::AnalyzeArgs;
use crate::diagnostics::Severity;
use crate::error::Result;
use crate::ui::{Table, UserInterface};

use super::context::{AnalysisContext, GlobalOptions};
use super::dispatcher::{Command, CommandResult};
use super::display;

/// The analyze command implementation.
pub struct AnalyzeCommand {
    project_root: PathBuf,
    options: GlobalOptions,
    args: AnalyzeArgs,
}

impl AnalyzeCommand {
    /// Create a new analyze command.
    pub fn new(project_root: &Path, options: GlobalOptions, args: AnalyzeArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            options,
            args,
        }
    }

    /// Report path: `--output`, else `report.output` under the project root.
    fn output_path(&self, configured: &Path) -> PathBuf {
        match &self.args.output {
            Some(path) => path.clone(),
            None => self.project_root.join(configured),
        }
    }

    fn write_report(path: &Path, report: &AnalysisReport) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(report)?;
        fs::write(path, json)?;
        tracing::info!("Wrote report to {}", path.display());
        Ok(())
    }

    fn show_summary(ui: &mut dyn UserInterface, report: &AnalysisReport) {
        let s = &report.summary;
        ui.show_header(&format!(
            "Analysis as of {}",
            report.as_of.format("%Y-%m-%d %H:%M")
        ));

        let mut table = Table::new(vec!["Metric", "Value"]).numeric(&[1]);
        let rows = [
            ("Operators", s.operators.to_string()),
            ("Certification records", s.certification_records.to_string()),
            ("Records counted", s.counted_records.to_string()),
            ("Status events", s.events.to_string()),
            ("Divisions", s.divisions.to_string()),
            ("Lifecycle steps", s.steps.to_string()),
            ("Requirement entries", s.requirement_entries.to_string()),
            ("Operators with gaps", s.operators_with_gaps.to_string()),
            ("Operators ready", s.operators_ready.to_string()),
            ("Average journey (days)", display::days(s.average_journey_days)),
        ];
        for (metric, value) in rows {
            table.add_row(vec![metric.to_string(), value]);
        }
        ui.show_table(&table);

        let b = &report.bottlenecks;
        if !b.statuses.is_empty() {
            let worst = &b.statuses[0];
            ui.message(&format!(
                "Largest concentration: {} holds {} of operators ({})",
                worst.status,
                display::percent(worst.ratio),
                worst.severity
            ));
        }

        ui.message("");
        display::show_findings(ui, &report.findings, &report.finding_summary);
    }
}

impl Command for AnalyzeCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(ctx) = AnalysisContext::load_or_report(&self.project_root, &self.options, ui)?
        else {
            return Ok(CommandResult::failure(2));
        };

        let path = self.output_path(&ctx.loaded.config.report.output);
        Self::write_report(&path, &ctx.report)?;

        if self.args.json {
            display::emit_json(ui, &ctx.report)?;
            return Ok(CommandResult::success());
        }

        Self::show_summary(ui, &ctx.report);
        if display::any_at_least(&ctx.report.findings, Severity::Error) {
            ui.show_hint(
                "Error findings point at inconsistent lifecycle data; \
                 results for those divisions may be unreliable",
            );
        }
        ui.success(&format!("Report written to {}", path.display()));
        ui.show_hint("Run 'opcert gaps' to see who is missing what");

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::fixtures;
    use crate::ui::MockUI;

    fn run(root: &Path, args: AnalyzeArgs) -> (CommandResult, MockUI) {
        let cmd = AnalyzeCommand::new(root, GlobalOptions::default(), args);
        let mut ui = MockUI::new();
        let result = cmd.execute(&mut ui).unwrap();
        (result, ui)
    }

    #[test]
    fn writes_report_to_configured_path() {
        let temp = fixtures::project();
        let (result, ui) = run(temp.path(), AnalyzeArgs::default());

        assert!(result.success);
        let path = temp.path().join("generated/opcert_report.json");
        assert!(path.exists());
        assert!(ui.has_success("Report written"));
        assert!(ui.table_contains("Operators with gaps"));

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(written["summary"]["operators"], 7);
        assert_eq!(written["as_of"], "2024-06-01T00:00:00");
    }

    #[test]
    fn output_flag_overrides_path() {
        let temp = fixtures::project();
        let out = temp.path().join("out/report.json");
        let (result, _) = run(
            temp.path(),
            AnalyzeArgs {
                output: Some(out.clone()),
                json: false,
            },
        );

        assert!(result.success);
        assert!(out.exists());
    }

    #[test]
    fn json_flag_prints_report() {
        let temp = fixtures::project();
        let (_, ui) = run(
            temp.path(),
            AnalyzeArgs {
                output: None,
                json: true,
            },
        );

        let printed: serde_json::Value = serde_json::from_str(&ui.data_output()).unwrap();
        assert_eq!(printed["summary"]["operators_with_gaps"], 1);
        assert!(ui.tables().is_empty());
    }

    #[test]
    fn reports_findings() {
        let temp = fixtures::project();
        let (_, ui) = run(temp.path(), AnalyzeArgs::default());
        assert!(ui.has_warning("data-quality findings"));
    }
}
