//! # Token Module
//!
//! Token types for the Strand surface language. Tokens are produced by the
//! lexer and consumed by the parser; each carries a [`Span`] for diagnostics.

use crate::error::Span;

// -----------------------------------------------------------------------------
// TOKEN KIND
// -----------------------------------------------------------------------------

/// Every token the Strand grammar recognizes.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // -- Literals --
    /// Numeric literal (decimal, optionally fractional or scientific).
    Number(f64),
    /// Double-quoted string literal.
    Str(String),
    /// `true`
    True,
    /// `false`
    False,

    // -- Identifiers & Keywords --
    /// User-defined identifier (variable or function name).
    Ident(String),
    /// `fun`
    Fun,
    /// `print`
    Print,
    /// `return`
    Return,

    // -- Operators --
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `=`
    Eq,

    // -- Delimiters --
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `;`
    Semicolon,

    // -- Special --
    /// End of input marker.
    Eof,
}

// -----------------------------------------------------------------------------
// TOKEN
// -----------------------------------------------------------------------------

/// A single token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The classification and payload of this token.
    pub kind: TokenKind,
    /// Source location of this token.
    pub span: Span,
}

impl Token {
    /// Creates a new token with the given kind and span.
    #[inline]
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

// -----------------------------------------------------------------------------
// KEYWORD LOOKUP
// -----------------------------------------------------------------------------

/// Resolves an identifier to its keyword token kind, or `None` for
/// non-keyword identifiers.
#[inline]
pub fn lookup_keyword(ident: &str) -> Option<TokenKind> {
    match ident {
        "fun" => Some(TokenKind::Fun),
        "print" => Some(TokenKind::Print),
        "return" => Some(TokenKind::Return),
        "true" => Some(TokenKind::True),
        "false" => Some(TokenKind::False),
        _ => None,
    }
}
