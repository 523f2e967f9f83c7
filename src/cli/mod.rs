//! CLI module for the plan summarizer.
//!
//! This module provides the command-line interface for summarizing
//! plans and managing the analysis configuration.

mod commands;
mod output;

pub use commands::{Cli, Commands, ConfigCommands, OutputFormat};
pub use output::{OutputFormatter, SummaryOptions};
