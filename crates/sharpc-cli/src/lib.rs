//! Command-line driver for the sharpc C# semantic layer.
//!
//! - `args` - command-line flags
//! - `manifest` - JSON declaration manifest read in place of parsed source
//! - `driver` - runs binding, constant resolution and implementation checks
//! - `tracing_config` - `SHARPC_LOG` subscriber setup

pub mod args;
pub mod driver;
pub mod manifest;
pub mod tracing_config;
