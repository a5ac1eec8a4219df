//! # Compiler Module
//!
//! AST to bytecode translation. Expressions are emitted in post-order so the
//! instruction sequence directly matches stack-machine evaluation order:
//! operands first, then the operator. Assignments append a `STORE`, print
//! statements a `PRINT`, and every compiled function body ends with an
//! implicit `HALT`.
//!
//! Top-level statements form the `"main"` entry point; each `fun`
//! declaration becomes its own named function in the [`Program`].

use crate::ast::{BinOp, Expr, Stmt};
use crate::error::{Span, StrandError, StrandResult};
use crate::opcode::Instruction;
use crate::program::{ENTRY_POINT, Program};
use crate::value::Value;

/// The Strand compiler. Consumes itself on `compile`.
pub struct Compiler {
    program: Program,
}

impl Compiler {
    /// Creates a fresh compiler.
    pub fn new() -> Self {
        Self {
            program: Program::new(),
        }
    }

    /// Compiles a parsed statement list into a program.
    ///
    /// # Errors
    /// Returns a `SyntaxError` for duplicate function names, a `fun` named
    /// `main`, or `return` at the top level.
    pub fn compile(mut self, stmts: &[Stmt]) -> StrandResult<Program> {
        let mut main = Vec::new();

        for stmt in stmts {
            match stmt {
                Stmt::FunDecl { name, body, span } => {
                    self.compile_fun_decl(name, body, *span)?;
                }
                other => compile_stmt(other, &mut main, false)?,
            }
        }

        main.push(Instruction::halt());
        self.program.define(ENTRY_POINT, main);
        Ok(self.program)
    }

    fn compile_fun_decl(&mut self, name: &str, body: &[Stmt], span: Span) -> StrandResult<()> {
        if name == ENTRY_POINT {
            return Err(StrandError::syntax(
                format!("`{}` is reserved for top-level statements", ENTRY_POINT),
                span,
            ));
        }
        if self.program.contains(name) {
            return Err(StrandError::syntax(
                format!("function `{}` is already defined", name),
                span,
            ));
        }

        let mut instructions = Vec::new();
        for stmt in body {
            compile_stmt(stmt, &mut instructions, true)?;
        }
        instructions.push(Instruction::halt());

        self.program.define(name, instructions);
        Ok(())
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

fn compile_stmt(stmt: &Stmt, out: &mut Vec<Instruction>, in_function: bool) -> StrandResult<()> {
    match stmt {
        Stmt::Assign { name, value, .. } => {
            compile_expr(value, out);
            out.push(Instruction::store(name.clone()));
            Ok(())
        }
        Stmt::Print { value, .. } => {
            compile_expr(value, out);
            out.push(Instruction::print());
            Ok(())
        }
        Stmt::Return { value, span } => {
            if !in_function {
                return Err(StrandError::syntax(
                    "return outside of a function body",
                    *span,
                ));
            }
            if let Some(value) = value {
                compile_expr(value, out);
            }
            out.push(Instruction::ret());
            Ok(())
        }
        // The parser only accepts `fun` at the top level.
        Stmt::FunDecl { span, .. } => Err(StrandError::syntax(
            "nested function declarations are not supported",
            *span,
        )),
    }
}

/// Emits an expression in post-order: sub-expressions first, operator last.
fn compile_expr(expr: &Expr, out: &mut Vec<Instruction>) {
    match expr {
        Expr::Number { value, .. } => out.push(Instruction::push(Value::Num(*value))),
        Expr::Str { value, .. } => out.push(Instruction::push(Value::str(value.clone()))),
        Expr::Bool { value, .. } => out.push(Instruction::push(Value::Bool(*value))),
        Expr::Ident { name, .. } => out.push(Instruction::load(name.clone())),
        Expr::Binary {
            left, op, right, ..
        } => {
            compile_expr(left, out);
            compile_expr(right, out);
            out.push(match op {
                BinOp::Add => Instruction::add(),
                BinOp::Sub => Instruction::sub(),
                BinOp::Mul => Instruction::mul(),
                BinOp::Div => Instruction::div(),
            });
        }
        Expr::Call { name, .. } => out.push(Instruction::call(name.clone())),
    }
}
