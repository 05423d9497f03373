//! Integration tests for the taxonomy repository

mod cli_commands;
mod loader_scenarios;
mod service_mutations;
mod support;
