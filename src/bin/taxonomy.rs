//! Taxonomy CLI Binary
//!
//! Command-line interface for inspecting and maintaining a token taxonomy artifact tree.

use clap::Parser;
use std::process;
use taxonomy::logging::init_logging;
use taxonomy::tooling::cli::{load_config, Cli, CliContext};

fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = init_logging(Some(&config.logging)) {
        eprintln!("Error initializing logging: {}", e);
        process::exit(1);
    }

    let context = match CliContext::new(&cli.workspace, config) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error loading taxonomy: {}", e);
            process::exit(1);
        }
    };

    match context.execute(&cli.command) {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
