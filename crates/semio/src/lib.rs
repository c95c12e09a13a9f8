//! Semio - compiles abstraction level schemas into a typed Rust object model.
//!
//! A schema declares abstraction levels (Masterplan, Apartmentplan, ...) that
//! inherit from one another, the parameter types and object types each level
//! owns, and the properties of those object types. [`SchemaCompiler`] loads,
//! resolves and emits a schema; [`publish`] writes the result to disk.

pub mod config;

mod emit;
mod error;
mod publish;

pub use semio_core::{identifier, resolved, schema};
pub use semio_parser::error::ErrorKind;

pub use emit::{Artifact, EmitError, GeneratedUnit, SINGLE_FILE_NAME};
pub use error::SemioError;
pub use publish::publish;

use std::fmt;

use log::{debug, info, trace, warn};

use config::AppConfig;
use resolved::ResolvedSchema;
use schema::Schema;

/// Where a compile run currently stands.
///
/// A run moves `Idle → Loading → Loaded → Resolving → Resolved → Emitting →
/// Done`. Any failing stage moves it to `Failed`. A new run may start once
/// the previous one finished, failed or stopped after resolving.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompileState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Resolving,
    Resolved,
    Emitting,
    Done,
    Failed,
}

impl CompileState {
    fn can_move_to(self, next: CompileState) -> bool {
        use CompileState::*;

        matches!(
            (self, next),
            (Idle | Resolved | Done | Failed, Loading)
                | (Loading, Loaded)
                | (Loaded, Resolving)
                | (Resolving, Resolved)
                | (Resolved, Emitting)
                | (Emitting, Done)
                | (Loading | Resolving | Emitting, Failed)
        )
    }
}

impl fmt::Display for CompileState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Loaded => "loaded",
            Self::Resolving => "resolving",
            Self::Resolved => "resolved",
            Self::Emitting => "emitting",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Drives one schema through loading, resolution and emission.
///
/// Each stage can be run on its own, which is how the CLI implements
/// `--check`, or all at once with [`SchemaCompiler::compile`].
///
/// # Examples
///
/// ```rust
/// use semio::{CompileState, SchemaCompiler, config::AppConfig};
///
/// let source = "\
/// AbstractionLevel Site
///     Object Plot
///         Number Area
/// ";
///
/// let mut compiler = SchemaCompiler::new(AppConfig::default()).expect("valid config");
/// let artifact = compiler.compile(source).expect("schema compiles");
///
/// assert_eq!(compiler.state(), CompileState::Done);
/// assert!(artifact.units()[0].contents().contains("pub struct Plot {"));
/// ```
#[derive(Debug)]
pub struct SchemaCompiler {
    config: AppConfig,
    state: CompileState,
    /// Source of the current run, attached to schema errors.
    source: String,
}

impl SchemaCompiler {
    /// Create a compiler for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SemioError::Config`] when the configuration holds a value
    /// the emitter cannot use.
    pub fn new(config: AppConfig) -> Result<Self, SemioError> {
        config.validate().map_err(SemioError::Config)?;
        Ok(Self {
            config,
            state: CompileState::Idle,
            source: String::new(),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn state(&self) -> CompileState {
        self.state
    }

    /// Parse `source` into an unresolved schema and check each declaration
    /// on its own.
    ///
    /// # Errors
    ///
    /// Returns [`SemioError::Schema`] with every diagnostic found.
    pub fn load(&mut self, source: &str) -> Result<Schema, SemioError> {
        self.transition(CompileState::Loading)?;
        info!(bytes = source.len(); "Loading schema");
        source.clone_into(&mut self.source);

        match semio_parser::load(source) {
            Ok(schema) => {
                debug!(levels = schema.levels.len(); "Schema loaded");
                self.transition(CompileState::Loaded)?;
                Ok(schema)
            }
            Err(err) => self.fail(SemioError::new_schema_error(err, source)),
        }
    }

    /// Resolve level and object inheritance of a loaded schema.
    ///
    /// # Errors
    ///
    /// Returns [`SemioError::Schema`] for cycles, collisions and unknown
    /// type references.
    pub fn resolve(&mut self, schema: &Schema) -> Result<ResolvedSchema, SemioError> {
        self.transition(CompileState::Resolving)?;
        info!("Resolving schema");

        let resolve_config = self.config.schema().resolve_config();
        match semio_parser::resolve(schema, &resolve_config) {
            Ok(resolved) => {
                debug!(levels = resolved.levels().len(); "Schema resolved");
                trace!(resolved:?; "Resolved schema");
                self.transition(CompileState::Resolved)?;
                Ok(resolved)
            }
            Err(err) => {
                let err = SemioError::new_schema_error(err, self.source.clone());
                self.fail(err)
            }
        }
    }

    /// Render a resolved schema into staged source units.
    ///
    /// # Errors
    ///
    /// Returns [`SemioError::Internal`] when the resolved model is
    /// inconsistent. Nothing is staged in that case.
    pub fn emit(&mut self, schema: &ResolvedSchema) -> Result<Artifact, SemioError> {
        self.transition(CompileState::Emitting)?;

        match emit::emit(schema, self.config.emit()) {
            Ok(artifact) => {
                info!(units = artifact.units().len(); "Schema compiled");
                self.transition(CompileState::Done)?;
                Ok(artifact)
            }
            Err(err) => self.fail(err.into()),
        }
    }

    /// Load, resolve and emit `source`.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing stage.
    pub fn compile(&mut self, source: &str) -> Result<Artifact, SemioError> {
        let schema = self.load(source)?;
        let resolved = self.resolve(&schema)?;
        self.emit(&resolved)
    }

    /// Load and resolve `source` without emitting anything.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing stage.
    pub fn check(&mut self, source: &str) -> Result<ResolvedSchema, SemioError> {
        let schema = self.load(source)?;
        self.resolve(&schema)
    }

    fn transition(&mut self, next: CompileState) -> Result<(), SemioError> {
        if !self.state.can_move_to(next) {
            return Err(SemioError::Internal(format!(
                "compile run cannot move from {} to {next}",
                self.state
            )));
        }
        debug!(from:% = self.state, to:% = next; "Compile state changed");
        self.state = next;
        Ok(())
    }

    fn fail<T>(&mut self, err: SemioError) -> Result<T, SemioError> {
        warn!(stage:% = self.state, err:% = err; "Compile run failed");
        self.state = CompileState::Failed;
        Err(err)
    }
}
