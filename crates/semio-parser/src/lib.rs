//! # Semio Parser
//!
//! Loader and inheritance resolver for semio schemas. This crate turns schema
//! text into a [`ResolvedSchema`]: every abstraction level with its ancestor
//! chain and collections, every object type with its flattened properties.
//!
//! ## Usage
//!
//! ```
//! # use semio_parser::{parse, ResolveConfig, error::ParseError};
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = "\
//! AbstractionLevel Masterplan
//!     Object BuildingVolume
//!         ClosedCurve Parcel
//! ";
//!
//!     let schema = parse(source, &ResolveConfig::default())?;
//!     assert_eq!(schema.levels().len(), 1);
//!     Ok(())
//! }
//! ```

pub mod error;
mod lexer;
mod loader;
mod parser;
mod parser_types;
mod resolver;
mod tokens;

pub(crate) use semio_core::span;

pub use resolver::ResolveConfig;
pub use semio_core::span::{Span, Spanned};

use log::debug;

use semio_core::{resolved::ResolvedSchema, schema::Schema};

use error::ParseError;

/// Load schema text into an unresolved [`Schema`].
///
/// Runs the lexer, the parser and local validation. Lexer errors are
/// reported together; the parser stops at the first syntax error; loading
/// reports every problem it finds.
pub fn load(source: &str) -> Result<Schema, ParseError> {
    let tokens = lexer::tokenize(source)?;
    debug!(tokens = tokens.len(); "Tokenized schema");

    let file = parser::build_schema(&tokens)?;
    loader::load(&file)
}

/// Resolve the inheritance of a loaded schema.
pub fn resolve(schema: &Schema, config: &ResolveConfig) -> Result<ResolvedSchema, ParseError> {
    resolver::resolve(schema, config)
}

/// Load and resolve schema text in one step.
pub fn parse(source: &str, config: &ResolveConfig) -> Result<ResolvedSchema, ParseError> {
    let schema = load(source)?;
    resolve(&schema, config)
}
