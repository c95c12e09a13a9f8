//! Error codes for the semio diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Lexer errors
//! - `E1xx` - Parser errors
//! - `E2xx` - Loader validation errors
//! - `E3xx` - Inheritance resolution errors

use std::fmt;

use crate::error::ErrorKind;

/// Error codes for categorizing diagnostic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Lexer Errors (E0xx)
    // =========================================================================
    /// Unterminated string literal.
    ///
    /// A description was opened with a quote but never closed on the same line.
    E001,

    /// Unexpected character.
    ///
    /// A character was encountered that is not valid in a schema.
    E002,

    /// Invalid escape sequence.
    ///
    /// Valid escapes are: `\n`, `\t`, `\\` and `\"`.
    E003,

    /// Integer literal out of range.
    E004,

    // =========================================================================
    // Parser Errors (E1xx)
    // =========================================================================
    /// Unexpected token.
    ///
    /// The parser encountered a token it did not expect at this position,
    /// including a line indented by the wrong amount.
    E100,

    /// Incomplete input.
    E101,

    // =========================================================================
    // Loader Validation Errors (E2xx)
    // =========================================================================
    /// Reserved identifier.
    ///
    /// The name cannot be used for generated code, e.g. `self` or `Option`.
    E200,

    /// Duplicate declaration.
    ///
    /// Two levels, two types of one level, two members of one parameter type
    /// or two properties of one object type share a name.
    E201,

    /// Undeclared `extends` target.
    ///
    /// No level or object type with that name exists in the schema.
    E202,

    /// Invalid flag value.
    ///
    /// Flag set members need explicit, distinct, single-bit values that fit
    /// in 32 bits.
    E203,

    /// Empty declaration.
    ///
    /// A schema without levels, a level without object types or a parameter
    /// type without members.
    E204,

    /// Invalid enumeration value.
    ///
    /// Enumeration values must be distinct and fit in 32 bits.
    E205,

    // =========================================================================
    // Resolution Errors (E3xx)
    // =========================================================================
    /// Unknown type reference.
    ///
    /// The type is not declared in the level, any of its ancestors, or the
    /// primitive namespace.
    E300,

    /// Name collision across an inheritance chain.
    E301,

    /// Inheritance cycle.
    E302,

    /// Type kind mismatch.
    ///
    /// An object type extends something that is not an object type.
    E303,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E004 => "E004",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
            ErrorCode::E204 => "E204",
            ErrorCode::E205 => "E205",
            ErrorCode::E300 => "E300",
            ErrorCode::E301 => "E301",
            ErrorCode::E302 => "E302",
            ErrorCode::E303 => "E303",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "unterminated string literal",
            ErrorCode::E002 => "unexpected character",
            ErrorCode::E003 => "invalid escape sequence",
            ErrorCode::E004 => "integer literal out of range",
            ErrorCode::E100 => "unexpected token",
            ErrorCode::E101 => "incomplete input",
            ErrorCode::E200 => "reserved identifier",
            ErrorCode::E201 => "duplicate declaration",
            ErrorCode::E202 => "undeclared extends target",
            ErrorCode::E203 => "invalid flag value",
            ErrorCode::E204 => "empty declaration",
            ErrorCode::E205 => "invalid enumeration value",
            ErrorCode::E300 => "unknown type reference",
            ErrorCode::E301 => "name collision",
            ErrorCode::E302 => "inheritance cycle",
            ErrorCode::E303 => "type kind mismatch",
        }
    }

    /// Returns the error category this code reports.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ErrorCode::E001
            | ErrorCode::E002
            | ErrorCode::E003
            | ErrorCode::E004
            | ErrorCode::E100
            | ErrorCode::E101
            | ErrorCode::E200
            | ErrorCode::E204
            | ErrorCode::E205
            | ErrorCode::E303 => ErrorKind::Definition,
            ErrorCode::E201 | ErrorCode::E301 => ErrorKind::NameCollision,
            ErrorCode::E202 | ErrorCode::E300 => ErrorKind::UnknownTypeReference,
            ErrorCode::E203 => ErrorKind::InvalidFlagValue,
            ErrorCode::E302 => ErrorKind::Cycle,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
