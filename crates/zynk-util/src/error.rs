//! Error types shared by every interpreter phase.
//!
//! The error model is deliberately flat: one struct carrying a kind, a
//! human-readable message and (where known) the 1-based source line. No
//! phase recovers from an error; results bubble up with `?` until the
//! driver prints the diagnostic and exits.

use std::fmt;

use thiserror::Error;

/// The closed set of failure kinds a run can end with.
///
/// The `Display` form of a kind is exactly the tag printed inside the
/// `Error[...]` brackets of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed source the parser could not accept.
    Syntax,
    /// A static type rule was violated.
    Type,
    /// A value could not be converted by an `int(...)`/`float(...)` cast.
    TypeCast,
    /// An expression was structurally invalid (missing operand, bad operand type).
    Expression,
    /// A failure surfaced while executing otherwise well-formed code.
    Runtime,
    /// The call depth ceiling was hit.
    Recursion,
    /// A name was read before any declaration of it was in scope.
    NotDefined,
    /// A name was declared twice in the same reachable scope.
    DuplicateDeclaration,
    /// The script file could not be opened.
    FileOpen,
    /// The command line did not describe a runnable invocation.
    Cli,
    /// An unexpected internal fault, wrapped on the way out.
    Panic,
    /// Anything the interpreter does not implement.
    Unknown,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Syntax => "SyntaxError",
            ErrorKind::Type => "TypeError",
            ErrorKind::TypeCast => "TypeCastError",
            ErrorKind::Expression => "ExpressionError",
            ErrorKind::Runtime => "RuntimeError",
            ErrorKind::Recursion => "RecursionError",
            ErrorKind::NotDefined => "NotDefinedError",
            ErrorKind::DuplicateDeclaration => "DuplicateDeclarationError",
            ErrorKind::FileOpen => "FileOpenError",
            ErrorKind::Cli => "CLIError",
            ErrorKind::Panic => "PanicError",
            ErrorKind::Unknown => "UnknownError",
        };
        f.write_str(name)
    }
}

/// A fatal interpreter error.
///
/// # Example
///
/// ```
/// use zynk_util::{ErrorKind, ZynkError};
///
/// let err = ZynkError::new(ErrorKind::Syntax, "Expected ';', found: '}' instead.", Some(3));
/// assert_eq!(
///     err.to_string(),
///     "Error[SyntaxError]: At line: 3. Expected ';', found: '}' instead."
/// );
/// ```
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("Error[{kind}]: {}{message}", location(.line))]
pub struct ZynkError {
    /// Which kind of failure this is.
    pub kind: ErrorKind,
    /// Human-readable description.
    pub message: String,
    /// 1-based source line, when one is known.
    pub line: Option<u32>,
}

/// Renders the `At line: N. ` prefix, or nothing when no line is known.
fn location(line: &Option<u32>) -> String {
    match line {
        Some(line) => format!("At line: {line}. "),
        None => String::new(),
    }
}

/// Result alias used across the whole pipeline.
pub type Result<T> = std::result::Result<T, ZynkError>;

impl ZynkError {
    /// Creates an error with an explicit kind and optional line.
    pub fn new(kind: ErrorKind, message: impl Into<String>, line: Option<u32>) -> Self {
        Self {
            kind,
            message: message.into(),
            line,
        }
    }

    /// Malformed source rejected by the parser.
    pub fn syntax(message: impl Into<String>, line: u32) -> Self {
        Self::new(ErrorKind::Syntax, message, Some(line))
    }

    /// A static type rule violation.
    pub fn type_error(message: impl Into<String>, line: u32) -> Self {
        Self::new(ErrorKind::Type, message, Some(line))
    }

    /// A failed `int(...)`/`float(...)` conversion.
    pub fn type_cast(message: impl Into<String>, line: u32) -> Self {
        Self::new(ErrorKind::TypeCast, message, Some(line))
    }

    /// A structurally invalid expression.
    pub fn expression(message: impl Into<String>, line: u32) -> Self {
        Self::new(ErrorKind::Expression, message, Some(line))
    }

    /// An execution-time failure.
    pub fn runtime(message: impl Into<String>, line: u32) -> Self {
        Self::new(ErrorKind::Runtime, message, Some(line))
    }

    /// The recursion ceiling was hit.
    pub fn recursion(message: impl Into<String>, line: u32) -> Self {
        Self::new(ErrorKind::Recursion, message, Some(line))
    }

    /// A lookup of an undeclared name.
    pub fn not_defined(message: impl Into<String>, line: u32) -> Self {
        Self::new(ErrorKind::NotDefined, message, Some(line))
    }

    /// A second declaration of an already-bound name.
    pub fn duplicate_declaration(message: impl Into<String>, line: u32) -> Self {
        Self::new(ErrorKind::DuplicateDeclaration, message, Some(line))
    }

    /// The script file could not be opened.
    pub fn file_open(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::FileOpen, message, None)
    }

    /// An invalid command line.
    pub fn cli(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cli, message, None)
    }

    /// An unexpected internal fault.
    pub fn panic(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Panic, message, None)
    }

    /// An unimplemented construct.
    pub fn unknown(message: impl Into<String>, line: u32) -> Self {
        Self::new(ErrorKind::Unknown, message, Some(line))
    }
}
