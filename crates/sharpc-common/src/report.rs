//! Central error and warning accumulator.
//!
//! Every user-facing diagnostic goes through [`Report`]. Reporting never
//! aborts; callers check [`Report::is_halted`] between units of work when a
//! test harness asked to stop at the first (or an expected) error.

use crate::diagnostics::{Diagnostic, DiagnosticCategory, RelatedSymbol};
use crate::location::{Location, LocationTable};
use rustc_hash::FxHashSet;
use tracing::{debug, trace};

/// Reporter configuration.
#[derive(Clone, Debug)]
pub struct ReportOptions {
    /// Warnings above this level are dropped (0-4).
    pub warning_level: u8,
    pub warnings_as_errors: bool,
    pub suppressed_warnings: FxHashSet<i32>,
    /// Halt after the first error.
    pub fatal: bool,
    /// Halt once this code has been reported.
    pub expected_error: Option<i32>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        ReportOptions {
            warning_level: 4,
            warnings_as_errors: false,
            suppressed_warnings: FxHashSet::default(),
            fatal: false,
            expected_error: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct Report {
    pub options: ReportOptions,
    diagnostics: Vec<Diagnostic>,
    errors: usize,
    warnings: usize,
    /// Related symbols waiting for the next diagnostic.
    pending_related: Vec<RelatedSymbol>,
    halted: bool,
    expected_error_seen: bool,
}

impl Report {
    pub fn new(options: ReportOptions) -> Self {
        Report {
            options,
            ..Default::default()
        }
    }

    /// Attach a related symbol to the next reported diagnostic.
    ///
    /// The same (location, symbol) pair is only recorded once.
    pub fn symbol_related_to_previous_error(
        &mut self,
        location: Location,
        symbol: impl Into<String>,
    ) {
        let related = RelatedSymbol {
            location,
            symbol: symbol.into(),
        };
        if !self.pending_related.contains(&related) {
            self.pending_related.push(related);
        }
    }

    pub fn error(&mut self, code: i32, location: Location, message: impl Into<String>) {
        let diagnostic = Diagnostic::error(code, location, message.into());
        self.push(diagnostic);
    }

    pub fn warning(&mut self, code: i32, level: u8, location: Location, message: impl Into<String>) {
        if level > self.options.warning_level
            || self.options.suppressed_warnings.contains(&code)
        {
            trace!(code, level, "warning suppressed");
            self.pending_related.clear();
            return;
        }
        let mut diagnostic = Diagnostic::warning(code, location, message.into());
        if self.options.warnings_as_errors {
            diagnostic.category = DiagnosticCategory::Error;
        }
        self.push(diagnostic);
    }

    fn push(&mut self, mut diagnostic: Diagnostic) {
        diagnostic.related_symbols = std::mem::take(&mut self.pending_related);
        debug!(
            code = diagnostic.code,
            category = diagnostic.category.label(),
            message = %diagnostic.message_text,
            "diagnostic"
        );
        if diagnostic.is_error() {
            self.errors += 1;
            if self.options.fatal {
                self.halted = true;
            }
            if self.options.expected_error == Some(diagnostic.code) {
                self.expected_error_seen = true;
                self.halted = true;
            }
        } else {
            self.warnings += 1;
        }
        self.diagnostics.push(diagnostic);
    }

    pub const fn error_count(&self) -> usize {
        self.errors
    }

    pub const fn warning_count(&self) -> usize {
        self.warnings
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Codes of every reported diagnostic, in report order.
    pub fn codes(&self) -> Vec<i32> {
        self.diagnostics.iter().map(|d| d.code).collect()
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    pub const fn is_halted(&self) -> bool {
        self.halted
    }

    pub const fn expected_error_seen(&self) -> bool {
        self.expected_error_seen
    }

    pub fn render_all(&self, locations: &LocationTable) -> Vec<String> {
        self.diagnostics
            .iter()
            .map(|d| d.render(locations))
            .collect()
    }

    pub fn reset(&mut self) {
        self.diagnostics.clear();
        self.pending_related.clear();
        self.errors = 0;
        self.warnings = 0;
        self.halted = false;
        self.expected_error_seen = false;
    }
}

#[cfg(test)]
#[path = "../tests/report_tests.rs"]
mod report_tests;
