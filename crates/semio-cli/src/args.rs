//! Command-line argument definitions for the semio CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select the schema, where the generated code
//! goes, the configuration file and logging verbosity.

use clap::Parser;

/// Command-line arguments for the semio schema compiler
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input schema file
    #[arg(help = "Path to the input schema")]
    pub input: String,

    /// Output file, or directory for the per-level layout
    #[arg(short, long, default_value = "model.rs")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Validate the schema without writing any output
    #[arg(long)]
    pub check: bool,
}
