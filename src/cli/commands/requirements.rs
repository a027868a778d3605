//! Requirements command implementation.
//!
//! The `opcert requirements` command shows, per lifecycle step, how many
//! operators hold each certification and how it is classified.

use std::path::{Path, PathBuf};

use crate::cli::args::RequirementsArgs;
use crate::error::Result;
use crate::requirements::{Classification, SampleStatus, StepRequirements};
use crate::ui::{Table, UserInterface};

use super::context::{AnalysisContext, GlobalOptions};
use super::dispatcher::{Command, CommandResult};
use super::display;

/// The requirements command implementation.
pub struct RequirementsCommand {
    project_root: PathBuf,
    options: GlobalOptions,
    args: RequirementsArgs,
}

impl RequirementsCommand {
    /// Create a new requirements command.
    pub fn new(project_root: &Path, options: GlobalOptions, args: RequirementsArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            options,
            args,
        }
    }

    fn show_step(ui: &mut dyn UserInterface, entry: &StepRequirements) {
        let order = entry
            .order
            .map(|o| format!("order {}", o))
            .unwrap_or_else(|| "unordered".to_string());
        let gate = if entry.cert_gate { " [cert gate]" } else { "" };
        ui.show_header(&format!(
            "{} ({}, {} operators){}",
            entry.step, order, entry.population, gate
        ));
        if entry.sample == SampleStatus::Insufficient {
            ui.warning("Too few operators to infer REQUIRED certifications");
        }

        let verbose = ui.output_mode().shows_detail();
        let theme = display::theme_for(ui);
        let mut table = Table::new(vec!["Certification", "Holders", "Adoption", "Classification"])
            .numeric(&[1, 2]);
        let mut hidden = 0usize;
        for cert in &entry.certifications {
            if cert.classification == Classification::Optional && !verbose {
                hidden += 1;
                continue;
            }
            table.add_row(vec![
                cert.name.clone(),
                format!("{}/{}", cert.holders, cert.population),
                format!("{:.1}%", cert.percentage()),
                theme
                    .classification(cert.classification)
                    .apply_to(cert.classification.as_str())
                    .to_string(),
            ]);
        }

        if table.is_empty() {
            ui.message("No certification reaches the COMMON threshold");
        } else {
            ui.show_table(&table);
        }
        if hidden > 0 {
            ui.message(&format!("{} optional certifications hidden", hidden));
        }
    }
}

impl Command for RequirementsCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(ctx) = AnalysisContext::load_or_report(&self.project_root, &self.options, ui)?
        else {
            return Ok(CommandResult::failure(2));
        };

        let filter = display::division_filter(self.args.division.as_deref());
        let mut entries: Vec<&StepRequirements> = ctx
            .report
            .requirements
            .iter()
            .filter(|entry| filter.allows(&entry.step.division))
            .collect();
        entries.sort_by(|a, b| {
            a.step
                .division
                .cmp(&b.step.division)
                .then_with(|| a.order.unwrap_or(u32::MAX).cmp(&b.order.unwrap_or(u32::MAX)))
                .then_with(|| a.step.status.cmp(&b.step.status))
        });

        if self.args.json {
            display::emit_json(ui, &entries)?;
            return Ok(CommandResult::success());
        }

        if entries.is_empty() {
            ui.warning("No occupied lifecycle steps match");
            return Ok(CommandResult::success());
        }

        for entry in entries {
            Self::show_step(ui, entry);
        }
        if !ui.output_mode().shows_detail() {
            ui.show_hint("Run with --verbose to include OPTIONAL certifications");
        }

        Ok(CommandResult::success())
    }
}
