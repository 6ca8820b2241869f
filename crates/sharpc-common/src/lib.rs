//! Common types and utilities for the sharpc C# semantic layer.
//!
//! This crate provides foundational types used across all sharpc crates:
//! - Diagnostics and the central `Report` accumulator
//! - Packed source locations (`Location`, `LocationTable`)
//! - Compiler options (`CompilerOptions`)
//! - The internal-error type for invariant violations

// Diagnostic types, codes and message templates
pub mod diagnostics;
pub use diagnostics::{
    Diagnostic, DiagnosticCategory, RelatedSymbol, diagnostic_codes, diagnostic_messages,
    format_message,
};

// Error/warning accumulation
pub mod report;
pub use report::{Report, ReportOptions};

// Source file table and packed (file, row) tokens
pub mod location;
pub use location::{Location, LocationTable, SourceFile};

// Options shared by every pass
pub mod options;
pub use options::CompilerOptions;

// Internal compiler errors
pub mod error;
pub use error::InternalError;
