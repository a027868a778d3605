//! Names command implementation.
//!
//! The `opcert names` command reports certification naming drift: one
//! certification spelled several ways, and distinct names that look alike.

use std::path::{Path, PathBuf};

use crate::cli::args::NamesArgs;
use crate::error::Result;
use crate::normalize::{NameCheck, VariantGroup};
use crate::ui::{Table, UserInterface};

use super::context::{AnalysisContext, GlobalOptions};
use super::dispatcher::{Command, CommandResult};
use super::display;

/// The names command implementation.
pub struct NamesCommand {
    project_root: PathBuf,
    options: GlobalOptions,
    args: NamesArgs,
}

/// Short description of what is wrong with a spelling.
fn issues(check: &NameCheck) -> String {
    let mut issues = Vec::new();
    if check.has_leading_space {
        issues.push("leading space");
    }
    if check.has_trailing_space {
        issues.push("trailing space");
    }
    if check.has_case_issues {
        issues.push("case");
    }
    if issues.is_empty() && !check.is_canonical {
        issues.push("alias");
    }
    if issues.is_empty() {
        "-".to_string()
    } else {
        issues.join(", ")
    }
}

impl NamesCommand {
    /// Create a new names command.
    pub fn new(project_root: &Path, options: GlobalOptions, args: NamesArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            options,
            args,
        }
    }

    fn show_groups(ui: &mut dyn UserInterface, groups: &[&VariantGroup]) {
        let verbose = ui.output_mode().shows_detail();
        let mut headers = vec!["Certification", "Spelling", "Records", "Issues"];
        if verbose {
            headers.push("Divisions");
            headers.push("Recommendation");
        }
        let mut table = Table::new(headers).numeric(&[2]);

        for group in groups {
            for (i, variant) in group.variants.iter().enumerate() {
                let name = if i == 0 {
                    group.display_name.clone()
                } else {
                    String::new()
                };
                let mut row = vec![
                    name,
                    format!("'{}'", variant.spelling),
                    variant.records.to_string(),
                    issues(&variant.check),
                ];
                if verbose {
                    row.push(variant.divisions.join(", "));
                    row.push(
                        variant
                            .check
                            .recommendation()
                            .unwrap_or_else(|| "-".to_string()),
                    );
                }
                table.add_row(row);
            }
        }
        ui.show_table(&table);
    }
}

impl Command for NamesCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(ctx) = AnalysisContext::load_or_report(&self.project_root, &self.options, ui)?
        else {
            return Ok(CommandResult::failure(2));
        };
        let naming = &ctx.report.naming;

        if self.args.json {
            display::emit_json(ui, naming)?;
            return Ok(CommandResult::success());
        }

        let groups: Vec<&VariantGroup> = if self.args.all {
            naming.groups.iter().collect()
        } else {
            naming.inconsistent().collect()
        };

        ui.show_header("Certification spellings");
        if groups.is_empty() {
            ui.success("Every certification is spelled one way");
        } else {
            Self::show_groups(ui, &groups);
            if !self.args.all {
                ui.warning(&format!(
                    "{} certifications are spelled more than one way",
                    groups.len()
                ));
            }
        }

        if !naming.near_duplicates.is_empty() {
            ui.show_header("Possible duplicates");
            let mut table = Table::new(vec!["Name", "Looks like", "Similarity"]).numeric(&[2]);
            for pair in &naming.near_duplicates {
                table.add_row(vec![
                    pair.left.clone(),
                    pair.right.clone(),
                    display::percent(pair.ratio),
                ]);
            }
            ui.show_table(&table);
            ui.show_hint("Add an alias under 'aliases' in .opcert/config.yml to merge them");
        }

        if !ui.output_mode().shows_detail() && !groups.is_empty() {
            ui.show_hint("Run with --verbose for recommended spellings");
        }

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::fixtures;
    use crate::ui::{MockUI, OutputMode};

    fn run(args: NamesArgs, mode: OutputMode) -> MockUI {
        let temp = fixtures::project();
        let cmd = NamesCommand::new(temp.path(), GlobalOptions::default(), args);
        let mut ui = MockUI::with_mode(mode);
        let result = cmd.execute(&mut ui).unwrap();
        assert!(result.success);
        ui
    }

    #[test]
    fn reports_inconsistent_spellings() {
        let ui = run(NamesArgs::default(), OutputMode::Normal);

        assert!(ui.table_contains("'BACKGROUND CHECK '"));
        assert!(ui.table_contains("trailing space, case"));
        assert!(!ui.table_contains("Defensive Driving"));
        assert!(ui.has_warning("1 certifications are spelled more than one way"));
    }

    #[test]
    fn all_flag_lists_consistent_names() {
        let ui = run(
            NamesArgs {
                all: true,
                json: false,
            },
            OutputMode::Normal,
        );
        assert!(ui.table_contains("Defensive Driving"));
        assert!(ui.table_contains("Service Agreement"));
    }

    #[test]
    fn verbose_recommends_canonical_spelling() {
        let ui = run(NamesArgs::default(), OutputMode::Verbose);
        assert!(ui.table_contains("Update to 'Background Check'"));
        assert!(ui.table_contains("2 - IL"));
    }

    #[test]
    fn issues_describe_spelling_problems() {
        let check = NameCheck {
            is_canonical: false,
            canonical: "CPR".to_string(),
            has_leading_space: true,
            has_trailing_space: false,
            has_case_issues: false,
        };
        assert_eq!(issues(&check), "leading space");

        let aliased = NameCheck {
            has_leading_space: false,
            ..check
        };
        assert_eq!(issues(&aliased), "alias");
    }
}
