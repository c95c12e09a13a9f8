//! Core types for semio schemas.
//!
//! This crate holds the data model shared by the parser and the code
//! emitter: interned identifiers, source spans, the unresolved
//! [`schema`] produced by loading and the [`resolved`] model produced by
//! inheritance resolution.

pub mod identifier;
pub mod naming;
pub mod primitive;
pub mod resolved;
pub mod schema;
pub mod span;
