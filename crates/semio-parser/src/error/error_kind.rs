//! Error categories shared by all phases.

use std::fmt;

/// The category of a schema error.
///
/// Every [`ErrorCode`](crate::error::ErrorCode) maps to exactly one kind.
/// All kinds are detected while loading or resolving, before any code is
/// emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed schema text or a locally invalid declaration.
    Definition,
    /// Two entities that must be distinct share a name.
    NameCollision,
    /// A level or object type inherits from itself.
    Cycle,
    /// A name does not refer to a visible declaration.
    UnknownTypeReference,
    /// A flag set member value is missing, repeated or not a single bit.
    InvalidFlagValue,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Definition => "DefinitionError",
            ErrorKind::NameCollision => "NameCollisionError",
            ErrorKind::Cycle => "CycleError",
            ErrorKind::UnknownTypeReference => "UnknownTypeReferenceError",
            ErrorKind::InvalidFlagValue => "InvalidFlagValueError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
