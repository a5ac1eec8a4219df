//! Abstract syntax tree for the Strand surface language. Every node keeps
//! its [`Span`] so the compiler can report location-accurate errors.

use crate::error::Span;

/// A top-level declaration or statement.
#[derive(Debug, Clone)]
pub enum Stmt {
    /// `name = expression;`
    Assign {
        name: String,
        value: Expr,
        span: Span,
    },
    /// `print(expression);`
    Print { value: Expr, span: Span },
    /// `return expression?;` — valid only inside a function body.
    Return { value: Option<Expr>, span: Span },
    /// `fun name() { body }`
    FunDecl {
        name: String,
        body: Vec<Stmt>,
        span: Span,
    },
}

/// An expression node.
#[derive(Debug, Clone)]
pub enum Expr {
    Number {
        value: f64,
        span: Span,
    },
    Str {
        value: String,
        span: Span,
    },
    Bool {
        value: bool,
        span: Span,
    },
    Ident {
        name: String,
        span: Span,
    },
    Binary {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
        span: Span,
    },
    /// `name()` — zero-argument function call.
    Call {
        name: String,
        span: Span,
    },
}

impl Expr {
    /// Returns the source span of this expression node.
    pub fn span(&self) -> Span {
        match self {
            Expr::Number { span, .. }
            | Expr::Str { span, .. }
            | Expr::Bool { span, .. }
            | Expr::Ident { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Call { span, .. } => *span,
        }
    }
}

impl Stmt {
    /// Returns the source span of this statement node.
    pub fn span(&self) -> Span {
        match self {
            Stmt::Assign { span, .. }
            | Stmt::Print { span, .. }
            | Stmt::Return { span, .. }
            | Stmt::FunDecl { span, .. } => *span,
        }
    }
}

/// Binary arithmetic operators with the usual two precedence levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}
