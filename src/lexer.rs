//! # Lexer Module
//!
//! Byte-oriented tokenizer for Strand source text. Tracks line and column
//! for every token and skips `//` line comments with `memchr`.

use crate::error::{Span, StrandError, StrandResult};
use crate::token::{Token, TokenKind, lookup_keyword};

/// The Strand lexer. Turns source text into a flat token vector ending
/// in [`TokenKind::Eof`].
pub struct Lexer<'src> {
    source: &'src [u8],
    pos: usize,
    line: u32,
    col: u32,
}

impl<'src> Lexer<'src> {
    /// Creates a lexer over the given source text.
    pub fn new(source: &'src str) -> Self {
        Self {
            source: source.as_bytes(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    /// Tokenizes the whole input.
    ///
    /// # Errors
    /// Returns a `SyntaxError` on any unrecognized character, unterminated
    /// string, or malformed number, with the offending span.
    pub fn tokenize(&mut self) -> StrandResult<Vec<Token>> {
        let mut tokens = Vec::with_capacity(self.source.len() / 4);

        loop {
            self.skip_whitespace_and_comments();

            if self.is_at_end() {
                tokens.push(Token::new(
                    TokenKind::Eof,
                    Span::new(self.line, self.col, 0),
                ));
                break;
            }

            tokens.push(self.scan_token()?);
        }

        Ok(tokens)
    }

    fn scan_token(&mut self) -> StrandResult<Token> {
        let start_line = self.line;
        let start_col = self.col;
        let start_pos = self.pos;

        let byte = self.advance();

        let kind = match byte {
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b';' => TokenKind::Semicolon,
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Star,
            b'/' => TokenKind::Slash,
            b'=' => TokenKind::Eq,

            b'"' => return self.scan_string(start_line, start_col, start_pos),

            b'0'..=b'9' => self.scan_number(byte, start_line, start_col)?,

            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.scan_identifier(start_pos)?,

            _ => {
                return Err(StrandError::syntax(
                    format!("unexpected character: '{}'", byte as char),
                    Span::new(start_line, start_col, 1),
                ));
            }
        };

        let len = (self.pos - start_pos) as u32;
        Ok(Token::new(kind, Span::new(start_line, start_col, len)))
    }

    fn scan_string(
        &mut self,
        start_line: u32,
        start_col: u32,
        start_pos: usize,
    ) -> StrandResult<Token> {
        let mut buf = String::new();

        loop {
            if self.is_at_end() {
                return Err(StrandError::syntax(
                    "unterminated string literal",
                    Span::new(start_line, start_col, 1),
                ));
            }

            let byte = self.peek();

            if byte == b'"' {
                self.advance();
                break;
            }

            if byte == b'\\' {
                self.advance();
                if self.is_at_end() {
                    return Err(StrandError::syntax(
                        "unterminated escape sequence",
                        Span::new(self.line, self.col, 1),
                    ));
                }
                let esc = self.advance();
                match esc {
                    b'n' => buf.push('\n'),
                    b'r' => buf.push('\r'),
                    b't' => buf.push('\t'),
                    b'\\' => buf.push('\\'),
                    b'"' => buf.push('"'),
                    b'0' => buf.push('\0'),
                    _ => {
                        buf.push('\\');
                        buf.push(esc as char);
                    }
                }
                continue;
            }

            if byte == b'\n' {
                self.line += 1;
                self.col = 0;
            }
            self.advance();
            buf.push(byte as char);
        }

        let total_len = (self.pos - start_pos) as u32;
        Ok(Token::new(
            TokenKind::Str(buf),
            Span::new(start_line, start_col, total_len),
        ))
    }

    fn scan_number(&mut self, first: u8, start_line: u32, start_col: u32) -> StrandResult<TokenKind> {
        let mut num_str = String::new();
        num_str.push(first as char);

        while !self.is_at_end() && (self.peek().is_ascii_digit() || self.peek() == b'_') {
            let b = self.advance();
            if b != b'_' {
                num_str.push(b as char);
            }
        }

        if !self.is_at_end()
            && self.peek() == b'.'
            && self.pos + 1 < self.source.len()
            && self.source[self.pos + 1].is_ascii_digit()
        {
            self.advance(); // consume '.'
            num_str.push('.');
            while !self.is_at_end() && (self.peek().is_ascii_digit() || self.peek() == b'_') {
                let b = self.advance();
                if b != b'_' {
                    num_str.push(b as char);
                }
            }
        }

        if !self.is_at_end() && (self.peek() == b'e' || self.peek() == b'E') {
            num_str.push(self.advance() as char);
            if !self.is_at_end() && (self.peek() == b'+' || self.peek() == b'-') {
                num_str.push(self.advance() as char);
            }
            while !self.is_at_end() && self.peek().is_ascii_digit() {
                num_str.push(self.advance() as char);
            }
        }

        let value: f64 = num_str.parse().map_err(|_| {
            StrandError::syntax(
                format!("invalid number literal: {}", num_str),
                Span::new(start_line, start_col, num_str.len() as u32),
            )
        })?;

        Ok(TokenKind::Number(value))
    }

    fn scan_identifier(&mut self, start_pos: usize) -> StrandResult<TokenKind> {
        while !self.is_at_end() && (self.peek().is_ascii_alphanumeric() || self.peek() == b'_') {
            self.advance();
        }

        let text = std::str::from_utf8(&self.source[start_pos..self.pos]).map_err(|_| {
            StrandError::syntax(
                "invalid UTF-8 in identifier",
                Span::new(self.line, self.col, (self.pos - start_pos) as u32),
            )
        })?;

        match lookup_keyword(text) {
            Some(keyword) => Ok(keyword),
            None => Ok(TokenKind::Ident(text.to_string())),
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while !self.is_at_end() {
                match self.peek() {
                    b' ' | b'\t' | b'\r' => {
                        self.advance();
                    }
                    b'\n' => {
                        self.advance();
                        self.line += 1;
                        self.col = 1;
                    }
                    _ => break,
                }
            }

            if self.pos + 1 < self.source.len()
                && self.source[self.pos] == b'/'
                && self.source[self.pos + 1] == b'/'
            {
                let remaining = &self.source[self.pos..];
                match memchr::memchr(b'\n', remaining) {
                    Some(offset) => {
                        self.pos += offset;
                        self.col += offset as u32;
                    }
                    None => {
                        let skip = self.source.len() - self.pos;
                        self.col += skip as u32;
                        self.pos = self.source.len();
                    }
                }
                continue;
            }

            break;
        }
    }

    #[inline(always)]
    fn peek(&self) -> u8 {
        self.source[self.pos]
    }

    #[inline(always)]
    fn advance(&mut self) -> u8 {
        let byte = self.source[self.pos];
        self.pos += 1;
        self.col += 1;
        byte
    }

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }
}
