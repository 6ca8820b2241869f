//! Compiler options shared by the semantic passes.

use crate::report::ReportOptions;
use serde::Deserialize;

/// Options controlling diagnostics and constant folding.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilerOptions {
    /// Warnings above this level are not reported (0-4).
    pub warning_level: u8,
    pub warnings_as_errors: bool,
    /// Warning codes that are never reported.
    pub no_warn: Vec<i32>,
    /// Stop analysis after the first error.
    pub fatal_errors: bool,
    /// Test mode: stop analysis once this error code is reported.
    pub expected_error: Option<i32>,
    /// Overflow-checking context for constant folding outside of
    /// `checked(...)`/`unchecked(...)`.
    pub checked: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        CompilerOptions {
            warning_level: 4,
            warnings_as_errors: false,
            no_warn: Vec::new(),
            fatal_errors: false,
            expected_error: None,
            checked: true,
        }
    }
}

impl CompilerOptions {
    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            warning_level: self.warning_level.min(4),
            warnings_as_errors: self.warnings_as_errors,
            suppressed_warnings: self.no_warn.iter().copied().collect(),
            fatal: self.fatal_errors,
            expected_error: self.expected_error,
        }
    }
}
