//! # Strand — A Stack-Based Bytecode VM
//!
//! Strand compiles a minimal scripting language into function-indexed
//! bytecode and executes it on a stack-based interpreter that reports
//! execution metrics (instruction count, peak stack depth, elapsed time)
//! and captures program output.
//!
//! ## Architecture
//! Source → Lexer → Parser → AST → Compiler → Program → VM → Outcome
//!
//! ## Key Features
//! - Closed-enum instruction set dispatched by `match`, with per-opcode
//!   operand contracts validated at dispatch.
//! - Explicit call-frame stack with a configurable depth limit; recursion
//!   never touches the host stack.
//! - Read-only compiled [`program::Program`] shareable across VM instances.
//! - Optional per-instruction trace sink for debugging.
//! - `FxHashMap` for string-keyed function tables and variable environments.

pub mod ast;
pub mod compiler;
pub mod error;
pub mod lexer;
pub mod opcode;
pub mod parser;
pub mod program;
pub mod runtime;
pub mod token;
pub mod value;
pub mod vm;

#[cfg(test)]
mod tests;
