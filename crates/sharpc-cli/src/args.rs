use clap::Parser;
use sharpc_common::CompilerOptions;
use std::path::PathBuf;

/// CLI arguments for the sharpc binary.
#[derive(Parser, Debug)]
#[command(
    name = "sharpc",
    version,
    about = "Name resolution, constant evaluation and implementation checks for C# declarations"
)]
pub struct CliArgs {
    /// Declaration manifest (JSON).
    pub manifest: PathBuf,

    // ==================== Diagnostics ====================
    /// Report all warnings as errors.
    #[arg(long = "warnaserror")]
    pub warnings_as_errors: bool,

    /// Warning level (0-4).
    #[arg(long = "warn", value_name = "N", value_parser = clap::value_parser!(u8).range(0..=4))]
    pub warning_level: Option<u8>,

    /// Warning codes to suppress, e.g. `0105,0436`.
    #[arg(long = "nowarn", value_delimiter = ',', value_name = "CODES")]
    pub no_warn: Vec<i32>,

    /// Stop analysis after the first error.
    #[arg(long)]
    pub fatal: bool,

    /// Stop analysis once this error code is reported.
    #[arg(long = "expect-error", value_name = "CODE")]
    pub expected_error: Option<i32>,

    // ==================== Constants ====================
    /// Fold constant expressions without overflow checking.
    #[arg(long)]
    pub unchecked: bool,

    // ==================== Output ====================
    /// Print resolved constants and synthesized proxies as JSON.
    #[arg(long)]
    pub dump: bool,
}

impl CliArgs {
    /// Overlay command-line flags on the manifest's options.
    pub fn apply(&self, options: &mut CompilerOptions) {
        if self.warnings_as_errors {
            options.warnings_as_errors = true;
        }
        if let Some(level) = self.warning_level {
            options.warning_level = level;
        }
        options.no_warn.extend(self.no_warn.iter().copied());
        if self.fatal {
            options.fatal_errors = true;
        }
        if self.expected_error.is_some() {
            options.expected_error = self.expected_error;
        }
        if self.unchecked {
            options.checked = false;
        }
    }
}
