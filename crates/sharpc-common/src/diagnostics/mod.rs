//! Diagnostic types and message lookup.
//!
//! Message templates and codes live in `data.rs`. Templates use `{0}`, `{1}`
//! placeholders filled in by [`format_message`].

use crate::location::{Location, LocationTable};
use serde::Serialize;

mod data;
pub use data::{DIAGNOSTIC_MESSAGES, diagnostic_codes, diagnostic_messages};

// =============================================================================
// Diagnostic Types
// =============================================================================

/// Diagnostic category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DiagnosticCategory {
    Warning = 0,
    Error = 1,
}

impl DiagnosticCategory {
    pub const fn label(self) -> &'static str {
        match self {
            DiagnosticCategory::Warning => "warning",
            DiagnosticCategory::Error => "error",
        }
    }
}

/// A symbol printed after the primary message to point at a related declaration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RelatedSymbol {
    pub location: Location,
    pub symbol: String,
}

/// A reported error or warning.
#[derive(Clone, Debug, Serialize)]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    /// Internal code. Negative codes are sharpc-specific and displayed shifted by 8000.
    pub code: i32,
    pub location: Location,
    pub message_text: String,
    /// Related symbols (e.g., the two candidates of an ambiguity)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related_symbols: Vec<RelatedSymbol>,
}

impl Diagnostic {
    #[must_use]
    pub fn error(code: i32, location: Location, message: String) -> Self {
        Self {
            category: DiagnosticCategory::Error,
            code,
            location,
            message_text: message,
            related_symbols: Vec::new(),
        }
    }

    #[must_use]
    pub fn warning(code: i32, location: Location, message: String) -> Self {
        Self {
            category: DiagnosticCategory::Warning,
            ..Self::error(code, location, message)
        }
    }

    pub const fn is_error(&self) -> bool {
        matches!(self.category, DiagnosticCategory::Error)
    }

    /// The code as shown to users.
    pub const fn display_code(&self) -> i32 {
        display_code(self.code)
    }

    /// Render as `file(line) error CSxxxx: message`, followed by one line per
    /// related symbol.
    pub fn render(&self, locations: &LocationTable) -> String {
        let mut out = String::new();
        if let Some(prefix) = locations.describe(self.location) {
            out.push_str(&prefix);
            out.push(' ');
        }
        out.push_str(&format!(
            "{} CS{:04}: {}",
            self.category.label(),
            self.display_code(),
            self.message_text
        ));
        for related in &self.related_symbols {
            out.push('\n');
            if let Some(prefix) = locations.describe(related.location) {
                out.push_str(&prefix);
                out.push_str(": ");
            }
            out.push_str(&format!(
                "'{}' (name of symbol related to previous error)",
                related.symbol
            ));
        }
        out
    }
}

/// Map an internal code to the code shown to users.
pub const fn display_code(code: i32) -> i32 {
    if code < 0 { code + 8000 } else { code }
}

/// Format a diagnostic message by replacing {0}, {1}, etc. with arguments.
#[must_use]
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

/// A diagnostic message definition with code, category, and message template.
#[derive(Clone, Copy, Debug)]
pub struct DiagnosticMessage {
    pub code: i32,
    pub category: DiagnosticCategory,
    pub message: &'static str,
}

/// Look up a diagnostic message definition by code.
#[must_use]
pub fn get_diagnostic_message(code: i32) -> Option<&'static DiagnosticMessage> {
    DIAGNOSTIC_MESSAGES.iter().find(|m| m.code == code)
}

/// Get the message template for a diagnostic code.
#[must_use]
pub fn get_message_template(code: i32) -> Option<&'static str> {
    get_diagnostic_message(code).map(|m| m.message)
}
