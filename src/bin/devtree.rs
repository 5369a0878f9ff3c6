// src/bin/devtree.rs

use clap::Parser;
use colored::*;
use devtree::cli::{Cli, dispatcher, handlers::commons};

/// The main entry point of the `devtree` application.
/// It sets up logging, parses arguments, dispatches to the correct handler,
/// and performs centralized error handling.
fn main() {
    env_logger::init();

    if let Err(e) = dispatcher::dispatch(Cli::parse().args) {
        // Handler argument errors (including `--help`) are rendered by clap itself.
        if let Some(clap_err) = e.downcast_ref::<clap::Error>() {
            clap_err.exit();
        }

        // Ambiguous and unmatched filters get guidance instead of a bare error.
        if !commons::report_resolution_error(&e) {
            eprintln!("\n{}: {:#}", "Error".red().bold(), e);
        }
        std::process::exit(1);
    }
}
