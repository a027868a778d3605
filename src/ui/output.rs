//! Output verbosity.

use std::str::FromStr;

/// Output verbosity mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Show detail tables and informational findings.
    Verbose,
    /// Show summaries and tables.
    #[default]
    Normal,
    /// Show results and errors only.
    Quiet,
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "verbose" => Ok(Self::Verbose),
            "normal" => Ok(Self::Normal),
            "quiet" => Ok(Self::Quiet),
            _ => Err(format!("unknown output mode: {}", s)),
        }
    }
}

impl OutputMode {
    /// Pick the mode from the global `--verbose` / `--quiet` flags.
    /// `--quiet` wins when both are given.
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        if quiet {
            Self::Quiet
        } else if verbose {
            Self::Verbose
        } else {
            Self::Normal
        }
    }

    /// Whether detail output (per-operator rows, info findings) is shown.
    pub fn shows_detail(&self) -> bool {
        matches!(self, Self::Verbose)
    }

    /// Whether status messages, headers and hints are shown.
    pub fn shows_status(&self) -> bool {
        !matches!(self, Self::Quiet)
    }
}
