//! Tooling & Integration Layer
//!
//! Command-line inspection and maintenance of an artifact tree.

pub mod cli;

pub use cli::{Cli, CliContext, Commands};
