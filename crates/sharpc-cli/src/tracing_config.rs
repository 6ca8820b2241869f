//! Tracing setup for the `sharpc` binary.
//!
//! `SHARPC_LOG` (or `RUST_LOG`) enables the subscriber and sets the filter;
//! `SHARPC_LOG_FORMAT` picks the output:
//!
//! - `text` (default): flat `tracing-subscriber` lines
//! - `tree`: indented span hierarchy via `tracing-tree`
//! - `json`: one JSON object per event
//!
//! ```bash
//! SHARPC_LOG=debug SHARPC_LOG_FORMAT=tree sharpc app.json
//! SHARPC_LOG="sharpc_binder=trace,sharpc_checker=debug" sharpc app.json
//! ```
//!
//! Output goes to stderr; rendered diagnostics own stdout.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Tree,
    Json,
}

impl LogFormat {
    pub fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    fn from_env() -> Self {
        Self::parse(&std::env::var("SHARPC_LOG_FORMAT").unwrap_or_default())
    }
}

/// `SHARPC_LOG` wins over `RUST_LOG`.
fn build_filter() -> EnvFilter {
    match std::env::var("SHARPC_LOG") {
        Ok(value) => EnvFilter::builder().parse_lossy(value),
        Err(_) => EnvFilter::from_default_env(),
    }
}

/// Install the global subscriber. A no-op unless `SHARPC_LOG` or
/// `RUST_LOG` is set.
pub fn init_tracing() {
    if std::env::var_os("SHARPC_LOG").is_none() && std::env::var_os("RUST_LOG").is_none() {
        return;
    }

    let filter = build_filter();
    match LogFormat::from_env() {
        LogFormat::Tree => {
            let tree_layer = tracing_tree::HierarchicalLayer::default()
                .with_indent_amount(2)
                .with_indent_lines(true)
                .with_targets(true);
            Registry::default().with(filter).with(tree_layer).init();
        }
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);
            Registry::default().with(filter).with(json_layer).init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
