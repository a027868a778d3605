//! Visual theme and styling.

use crate::analysis::{BottleneckSeverity, HealthBand, Priority};
use crate::diagnostics::Severity;
use crate::requirements::Classification;
use console::Style;

/// Styles used for terminal output.
#[derive(Debug, Clone)]
pub struct OpcertTheme {
    /// Success messages and healthy values (green).
    pub success: Style,
    /// Warnings and concerning values (orange).
    pub warning: Style,
    /// Errors and critical values (red bold).
    pub error: Style,
    /// Informational elements (cyan).
    pub info: Style,
    /// Secondary text.
    pub dim: Style,
    /// Important text (bold).
    pub highlight: Style,
    /// Headers (cyan bold).
    pub header: Style,
    /// Box-drawing borders.
    pub border: Style,
    /// Contextual hints (cyan dim).
    pub hint: Style,
}

impl Default for OpcertTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl OpcertTheme {
    /// Create the default colored theme.
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().color256(208),
            error: Style::new().red().bold(),
            info: Style::new().cyan(),
            dim: Style::new().dim(),
            highlight: Style::new().bold(),
            header: Style::new().bold().cyan(),
            border: Style::new().dim(),
            hint: Style::new().cyan().dim(),
        }
    }

    /// Create a theme without colors (for non-TTY or --no-color).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            info: Style::new(),
            dim: Style::new(),
            highlight: Style::new(),
            header: Style::new(),
            border: Style::new(),
            hint: Style::new(),
        }
    }

    pub fn format_success(&self, msg: &str) -> String {
        format!("{}", self.success.apply_to(format!("✓ {}", msg)))
    }

    pub fn format_warning(&self, msg: &str) -> String {
        format!("{}", self.warning.apply_to(format!("⚠ {}", msg)))
    }

    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(format!("✗ {}", msg)))
    }

    /// Format a header banner.
    pub fn format_header(&self, title: &str) -> String {
        format!(
            "{} {}",
            self.header.apply_to("◆"),
            self.highlight.apply_to(title)
        )
    }

    /// Style for a finding severity.
    pub fn severity(&self, severity: Severity) -> &Style {
        match severity {
            Severity::Error => &self.error,
            Severity::Warning => &self.warning,
            Severity::Info => &self.dim,
        }
    }

    /// Style for a requirement classification.
    pub fn classification(&self, classification: Classification) -> &Style {
        match classification {
            Classification::Required => &self.highlight,
            Classification::Provisional => &self.warning,
            Classification::Common => &self.info,
            Classification::Optional => &self.dim,
        }
    }

    /// Style for a bottleneck severity.
    pub fn bottleneck(&self, severity: BottleneckSeverity) -> &Style {
        match severity {
            BottleneckSeverity::Critical => &self.error,
            BottleneckSeverity::High => &self.warning,
        }
    }

    /// Style for a recommendation priority.
    pub fn priority(&self, priority: Priority) -> &Style {
        match priority {
            Priority::Critical => &self.error,
            Priority::High => &self.warning,
            Priority::Medium => &self.info,
        }
    }

    /// Style for a division health band.
    pub fn health(&self, band: HealthBand) -> &Style {
        match band {
            HealthBand::Healthy => &self.success,
            HealthBand::Concerning => &self.warning,
            HealthBand::Critical => &self.error,
        }
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors() -> bool {
    // https://no-color.org/
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    console::Term::stdout().is_term()
}
