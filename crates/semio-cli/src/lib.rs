//! CLI logic for the semio schema compiler.
//!
//! Reads a schema, compiles it with the configured settings and publishes
//! the generated Rust source, or only validates the schema with `--check`.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::{fs, path::Path};

use log::info;

use semio::{SchemaCompiler, SemioError, publish};

/// Run the semio CLI application
///
/// # Errors
///
/// Returns `SemioError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Schema errors
/// - Internal emission errors
pub fn run(args: &Args) -> Result<(), SemioError> {
    info!(
        input_path = args.input,
        output_path = args.output,
        check = args.check;
        "Processing schema"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let source = fs::read_to_string(&args.input)?;

    let mut compiler = SchemaCompiler::new(app_config)?;
    if args.check {
        let resolved = compiler.check(&source)?;
        info!(levels = resolved.levels().len(); "Schema is valid");
        return Ok(());
    }

    let artifact = compiler.compile(&source)?;
    publish(&artifact, Path::new(&args.output))?;

    info!(output = args.output, units = artifact.units().len(); "Generated code written");

    Ok(())
}
