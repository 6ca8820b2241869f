#![allow(clippy::print_stderr)]

use clap::Parser;
use sharpc_cli::args::CliArgs;
use sharpc_cli::driver::{self, EXIT_FAILURE};
use sharpc_common::InternalError;

fn main() {
    // Zero cost unless SHARPC_LOG or RUST_LOG is set.
    sharpc_cli::tracing_config::init_tracing();

    let args = CliArgs::parse();
    let outcome = match driver::run(&args) {
        Ok(outcome) => outcome,
        Err(err) => {
            match err.downcast_ref::<InternalError>() {
                Some(internal) => eprintln!("internal compiler error: {internal}"),
                None => eprintln!("error: {err:#}"),
            }
            std::process::exit(EXIT_FAILURE);
        }
    };

    for line in &outcome.diagnostics {
        println!("{line}");
    }
    if args.dump {
        match serde_json::to_string_pretty(&outcome.dump) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                eprintln!("error: failed to serialize dump: {err}");
                std::process::exit(EXIT_FAILURE);
            }
        }
    }
    println!("{}", outcome.summary);
    std::process::exit(outcome.exit_code());
}
