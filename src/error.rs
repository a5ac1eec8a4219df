//! # Error Module
//!
//! Unified error type for every stage of the Strand pipeline. Compile-time
//! errors carry a source location (line, column); runtime errors carry the
//! opcode context in their message instead.

use std::fmt;

// -----------------------------------------------------------------------------
// SPAN — Source Location
// -----------------------------------------------------------------------------

/// Represents a position in source code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// 1-based line number in the source file.
    pub line: u32,
    /// 1-based column number in the source file.
    pub col: u32,
    /// Length of the spanned region in bytes.
    pub len: u32,
}

impl Span {
    /// Creates a new span at the given location.
    #[inline]
    pub fn new(line: u32, col: u32, len: u32) -> Self {
        Self { line, col, len }
    }
}

// -----------------------------------------------------------------------------
// ERROR KIND — Failure Taxonomy
// -----------------------------------------------------------------------------

/// The closed set of failure kinds the pipeline can produce.
///
/// Tests assert on the exact kind, so nothing downstream (facade, CLI)
/// may wrap or translate these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The compiler could not derive a valid instruction sequence.
    Syntax,
    /// A function name was not present in the program.
    UndefinedFunction,
    /// A variable was loaded before any store bound it.
    UndefinedVariable,
    /// An opcode's stack effect required more values than were present.
    StackUnderflow,
    /// Operand types (or operand shape) incompatible with the opcode.
    Type,
    /// DIV with a zero divisor.
    DivideByZero,
    /// CALL exceeded the configured frame-depth limit.
    StackOverflow,
    /// Execution exceeded the configured instruction ceiling.
    InstructionLimit,
    /// The program has no "main" function.
    MissingEntryPoint,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Syntax => "SyntaxError",
            ErrorKind::UndefinedFunction => "UndefinedFunction",
            ErrorKind::UndefinedVariable => "UndefinedVariable",
            ErrorKind::StackUnderflow => "StackUnderflow",
            ErrorKind::Type => "TypeError",
            ErrorKind::DivideByZero => "DivideByZero",
            ErrorKind::StackOverflow => "StackOverflow",
            ErrorKind::InstructionLimit => "InstructionLimit",
            ErrorKind::MissingEntryPoint => "MissingEntryPoint",
        };
        f.write_str(name)
    }
}

// -----------------------------------------------------------------------------
// STRAND ERROR — Unified Error Type
// -----------------------------------------------------------------------------

/// The unified error type for the entire Strand pipeline.
///
/// Every error carries a classification (`kind`), a human-readable
/// `message`, and an optional `span` pointing to the source location.
#[derive(Debug, Clone)]
pub struct StrandError {
    /// Which failure kind this is.
    pub kind: ErrorKind,
    /// Human-readable description of what went wrong.
    pub message: String,
    /// Source location where the error occurred, if available.
    pub span: Option<Span>,
}

impl StrandError {
    /// Creates a new error with a source location.
    pub fn new(kind: ErrorKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            message: message.into(),
            span: Some(span),
        }
    }

    /// Creates a new error without source location information.
    pub fn no_span(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            span: None,
        }
    }

    /// Creates a syntax error at the given span.
    #[inline]
    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        Self::new(ErrorKind::Syntax, message, span)
    }
}

impl fmt::Display for StrandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.span {
            Some(span) => write!(
                f,
                "{} [line {}:{}]: {}",
                self.kind, span.line, span.col, self.message
            ),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for StrandError {}

/// Convenience type alias for Results throughout the Strand pipeline.
pub type StrandResult<T> = std::result::Result<T, StrandError>;

// -----------------------------------------------------------------------------
// DIAGNOSTIC FORMATTING
// -----------------------------------------------------------------------------

/// Formats an error as a diagnostic with the offending source line and a
/// caret marker, for CLI and REPL display.
///
/// Errors without a span (runtime faults) render as a single line.
pub fn format_error(err: &StrandError, source: &str, origin: &str) -> String {
    let span = match err.span {
        Some(span) => span,
        None => return format!("{}", err),
    };

    let mut out = format!("{}:{}:{}: {}", origin, span.line, span.col, err);

    if let Some(line_text) = source.lines().nth(span.line.saturating_sub(1) as usize) {
        let marker_width = (span.len as usize).max(1);
        out.push_str(&format!(
            "\n  {}\n  {}{}",
            line_text,
            " ".repeat(span.col.saturating_sub(1) as usize),
            "^".repeat(marker_width)
        ));
    }

    out
}
