//! Shared display helpers.
//!
//! Formatting used by more than one command: percentages, dates, finding
//! summaries and JSON output.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::diagnostics::{Finding, FindingSummary, Severity};
use crate::error::Result;
use crate::lifecycle::DivisionFilter;
use crate::ui::{should_use_colors, OpcertTheme, Table, UserInterface};

/// Theme for table cells: colored only on a color-capable terminal.
pub fn theme_for(ui: &dyn UserInterface) -> OpcertTheme {
    if ui.is_interactive() && should_use_colors() {
        OpcertTheme::new()
    } else {
        OpcertTheme::plain()
    }
}

/// A fraction as a percentage with one decimal.
pub fn percent(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

/// Average days with one decimal.
pub fn days(value: f64) -> String {
    format!("{:.1}", value)
}

/// A timestamp as a date, `-` when unknown.
pub fn date(value: Option<NaiveDateTime>) -> String {
    value
        .map(|v| v.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Filter for an optional `--division` prefix.
pub fn division_filter(prefix: Option<&str>) -> DivisionFilter {
    match prefix {
        Some(p) => DivisionFilter::new(vec![p.to_string()], Vec::new()),
        None => DivisionFilter::all(),
    }
}

/// Print `value` as pretty JSON.
pub fn emit_json<T: Serialize + ?Sized>(ui: &mut dyn UserInterface, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    ui.data(&json);
    Ok(())
}

/// One-line finding summary, plus the finding table in verbose mode.
pub fn show_findings(
    ui: &mut dyn UserInterface,
    findings: &[Finding],
    summary: &FindingSummary,
) {
    if summary.total == 0 {
        ui.success("No data-quality findings");
        return;
    }

    let line = format!(
        "{} data-quality findings ({} errors, {} warnings, {} info)",
        summary.total, summary.errors, summary.warnings, summary.info
    );
    if summary.has_errors() || summary.warnings > 0 {
        ui.warning(&line);
    } else {
        ui.message(&line);
    }

    if !ui.output_mode().shows_detail() {
        ui.show_hint("Run with --verbose to list them");
        return;
    }

    let theme = theme_for(ui);
    let mut table = Table::new(vec!["Severity", "Kind", "Where", "Message"]);
    for finding in findings {
        let location: Vec<&str> = [
            finding.division.as_deref(),
            finding.status.as_deref(),
            finding.operator.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect();
        table.add_row(vec![
            theme
                .severity(finding.severity)
                .apply_to(finding.severity.to_string())
                .to_string(),
            finding.kind.as_str().to_string(),
            location.join(" / "),
            finding.message.clone(),
        ]);
    }
    ui.show_table(&table);
}

/// Whether any finding is at least `severity`.
pub fn any_at_least(findings: &[Finding], severity: Severity) -> bool {
    findings.iter().any(|f| f.severity >= severity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{summarize, FindingKind};
    use crate::ui::{MockUI, OutputMode};
    use chrono::NaiveDate;

    #[test]
    fn formats_numbers_and_dates() {
        assert_eq!(percent(0.8), "80.0%");
        assert_eq!(percent(2.0 / 3.0), "66.7%");
        assert_eq!(days(12.26), "12.3");
        assert_eq!(date(None), "-");
        let at = NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(13, 0, 0);
        assert_eq!(date(at), "2024-02-29");
    }

    #[test]
    fn division_prefix_filter() {
        let filter = division_filter(Some("2"));
        assert!(filter.allows("2 - IL"));
        assert!(!filter.allows("3 - TX"));
        assert!(division_filter(None).allows("3 - TX"));
    }

    #[test]
    fn findings_table_only_in_verbose() {
        let findings = vec![Finding::new(FindingKind::MissingOrder, "no order")
            .with_division("2 - IL")
            .with_status("Hold")];
        let summary = summarize(&findings);

        let mut ui = MockUI::new();
        show_findings(&mut ui, &findings, &summary);
        assert!(ui.has_warning("1 data-quality findings"));
        assert!(ui.tables().is_empty());

        let mut ui = MockUI::with_mode(OutputMode::Verbose);
        show_findings(&mut ui, &findings, &summary);
        assert!(ui.table_contains("missing-order"));
        assert!(ui.table_contains("2 - IL / Hold"));
    }

    #[test]
    fn no_findings_is_a_success() {
        let mut ui = MockUI::new();
        show_findings(&mut ui, &[], &FindingSummary::default());
        assert!(ui.has_success("No data-quality findings"));
    }

    #[test]
    fn emits_pretty_json() {
        let mut ui = MockUI::new();
        emit_json(&mut ui, &vec![1, 2]).unwrap();
        assert_eq!(ui.data_output(), "[\n  1,\n  2\n]");
    }

    #[test]
    fn severity_threshold() {
        let findings = vec![Finding::new(FindingKind::NamingDrift, "x")];
        assert!(any_at_least(&findings, Severity::Info));
        assert!(!any_at_least(&findings, Severity::Warning));
    }
}
