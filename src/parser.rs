//! # Parser Module
//!
//! Recursive descent parser for the Strand grammar. Statements are
//! terminator-delimited; expressions use two precedence levels
//! (multiplicative over additive), both left-associative, with
//! parenthesized sub-expressions.
//!
//! The parser never skips input: any construct it does not recognize is a
//! syntax error with an accurate span.

use crate::ast::{BinOp, Expr, Stmt};
use crate::error::{StrandError, StrandResult};
use crate::token::{Token, TokenKind};

/// The Strand parser. Turns tokens into an abstract syntax tree.
pub struct Parser {
    /// Token stream produced by the lexer, ending in `Eof`.
    tokens: Vec<Token>,
    /// Current position in the token stream.
    current: usize,
}

impl Parser {
    /// Creates a new parser for the given token stream.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, current: 0 }
    }

    /// Parses the entire token stream into a list of top-level statements.
    ///
    /// # Errors
    /// Returns a `SyntaxError` on any malformed input.
    pub fn parse(&mut self) -> StrandResult<Vec<Stmt>> {
        let mut stmts = Vec::new();
        while !self.is_at_end() {
            stmts.push(self.declaration()?);
        }
        Ok(stmts)
    }

    // -------------------------------------------------------------------------
    // DECLARATIONS & STATEMENTS
    // -------------------------------------------------------------------------

    /// Parses a function declaration or falls through to a statement.
    fn declaration(&mut self) -> StrandResult<Stmt> {
        match self.peek_kind() {
            TokenKind::Fun => self.fun_declaration(),
            _ => self.statement(),
        }
    }

    /// Parses `fun name() { statements... }`
    fn fun_declaration(&mut self) -> StrandResult<Stmt> {
        let span = self.advance().span; // consume 'fun'
        let name = self.expect_ident("expected function name after 'fun'")?;
        self.expect_kind(&TokenKind::LParen, "expected '(' after function name")?;
        self.expect_kind(&TokenKind::RParen, "expected ')' after '('")?;
        self.expect_kind(&TokenKind::LBrace, "expected '{' before function body")?;

        let mut body = Vec::new();
        while !self.check_kind(&TokenKind::RBrace) && !self.is_at_end() {
            body.push(self.statement()?);
        }
        self.expect_kind(&TokenKind::RBrace, "expected '}' after function body")?;

        Ok(Stmt::FunDecl { name, body, span })
    }

    /// Parses an assignment, print, or return statement.
    fn statement(&mut self) -> StrandResult<Stmt> {
        match self.peek_kind() {
            TokenKind::Print => self.print_statement(),
            TokenKind::Return => self.return_statement(),
            TokenKind::Ident(_) => self.assignment(),
            _ => {
                let token = self.peek().clone();
                Err(StrandError::syntax(
                    format!("unexpected token: {:?}", token.kind),
                    token.span,
                ))
            }
        }
    }

    /// Parses `name = expression;`
    fn assignment(&mut self) -> StrandResult<Stmt> {
        let span = self.peek().span;
        let name = self.expect_ident("expected variable name")?;
        self.expect_kind(&TokenKind::Eq, "expected '=' after variable name")?;
        let value = self.expression()?;
        self.expect_semicolon()?;
        Ok(Stmt::Assign { name, value, span })
    }

    /// Parses `print(expression);`
    fn print_statement(&mut self) -> StrandResult<Stmt> {
        let span = self.advance().span; // consume 'print'
        self.expect_kind(&TokenKind::LParen, "expected '(' after 'print'")?;
        let value = self.expression()?;
        self.expect_kind(&TokenKind::RParen, "expected ')' after print argument")?;
        self.expect_semicolon()?;
        Ok(Stmt::Print { value, span })
    }

    /// Parses `return expression;` or `return;`
    fn return_statement(&mut self) -> StrandResult<Stmt> {
        let span = self.advance().span; // consume 'return'
        let value = if self.check_kind(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect_semicolon()?;
        Ok(Stmt::Return { value, span })
    }

    // -------------------------------------------------------------------------
    // EXPRESSIONS — two precedence levels, left-associative
    // -------------------------------------------------------------------------

    /// Parses an additive expression: `term (('+' | '-') term)*`
    fn expression(&mut self) -> StrandResult<Expr> {
        let mut left = self.term()?;

        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            let span = self.advance().span;
            let right = self.term()?;
            left = Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
                span,
            };
        }

        Ok(left)
    }

    /// Parses a multiplicative expression: `factor (('*' | '/') factor)*`
    fn term(&mut self) -> StrandResult<Expr> {
        let mut left = self.factor()?;

        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                _ => break,
            };
            let span = self.advance().span;
            let right = self.factor()?;
            left = Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
                span,
            };
        }

        Ok(left)
    }

    /// Parses a literal, identifier, zero-argument call, or parenthesized
    /// sub-expression.
    fn factor(&mut self) -> StrandResult<Expr> {
        let token = self.peek().clone();
        match &token.kind {
            TokenKind::Number(value) => {
                let value = *value;
                let span = self.advance().span;
                Ok(Expr::Number { value, span })
            }
            TokenKind::Str(_) => {
                let t = self.advance();
                if let TokenKind::Str(value) = t.kind {
                    Ok(Expr::Str {
                        value,
                        span: t.span,
                    })
                } else {
                    unreachable!()
                }
            }
            TokenKind::True => {
                let span = self.advance().span;
                Ok(Expr::Bool { value: true, span })
            }
            TokenKind::False => {
                let span = self.advance().span;
                Ok(Expr::Bool { value: false, span })
            }
            TokenKind::Ident(_) => {
                let t = self.advance();
                let name = if let TokenKind::Ident(name) = t.kind {
                    name
                } else {
                    unreachable!()
                };

                if self.check_kind(&TokenKind::LParen) {
                    self.advance(); // consume '('
                    self.expect_kind(&TokenKind::RParen, "expected ')' after '('")?;
                    Ok(Expr::Call { name, span: t.span })
                } else {
                    Ok(Expr::Ident { name, span: t.span })
                }
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.expression()?;
                self.expect_kind(&TokenKind::RParen, "expected ')'")?;
                Ok(expr)
            }
            _ => Err(StrandError::syntax(
                format!("unexpected token: {:?}", token.kind),
                token.span,
            )),
        }
    }

    // -------------------------------------------------------------------------
    // TOKEN HELPERS
    // -------------------------------------------------------------------------

    /// Returns a reference to the current token without consuming it.
    #[inline]
    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    /// Returns the kind of the current token.
    #[inline]
    fn peek_kind(&self) -> &TokenKind {
        &self.tokens[self.current].kind
    }

    /// Consumes and returns the current token.
    #[inline]
    fn advance(&mut self) -> Token {
        let token = self.tokens[self.current].clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    /// Returns `true` if the current token is `Eof`.
    #[inline]
    fn is_at_end(&self) -> bool {
        matches!(self.tokens[self.current].kind, TokenKind::Eof)
    }

    /// Returns `true` if the current token matches the given kind.
    fn check_kind(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.peek_kind()) == std::mem::discriminant(kind)
    }

    /// Expects the current token to match `kind`, returning an error otherwise.
    fn expect_kind(&mut self, kind: &TokenKind, msg: &str) -> StrandResult<Token> {
        if self.check_kind(kind) {
            Ok(self.advance())
        } else {
            Err(StrandError::syntax(msg, self.peek().span))
        }
    }

    /// Expects an identifier token and returns the name string.
    fn expect_ident(&mut self, msg: &str) -> StrandResult<String> {
        if let TokenKind::Ident(_) = self.peek_kind() {
            let t = self.advance();
            if let TokenKind::Ident(name) = t.kind {
                Ok(name)
            } else {
                unreachable!()
            }
        } else {
            Err(StrandError::syntax(msg, self.peek().span))
        }
    }

    /// Expects a semicolon token.
    fn expect_semicolon(&mut self) -> StrandResult<Token> {
        self.expect_kind(&TokenKind::Semicolon, "expected ';'")
    }
}
