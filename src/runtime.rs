//! # Runtime Module
//!
//! The facade external callers touch: compose lexing, parsing, compilation,
//! and execution. Errors from the stages pass through unchanged so callers
//! can match on the precise [`ErrorKind`](crate::error::ErrorKind).
//!
//! File access stays outside this module: callers hand `run` a source
//! string, wherever it came from.

use crate::compiler::Compiler;
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::program::Program;
use crate::vm::{Outcome, Vm, VmConfig};

use std::time::{Duration, Instant};

/// Result of a full `run`: the execution outcome plus the wall-clock time
/// of the whole parse + execute composition, measured independently of the
/// dispatch-loop time the VM records in [`Outcome::elapsed`].
#[derive(Debug, Clone)]
pub struct RunReport {
    /// The execution result.
    pub outcome: Outcome,
    /// Wall-clock time around parse + execute.
    pub total_elapsed: Duration,
}

/// Orchestrates the pipeline. Holds the VM configuration so every
/// execution it starts runs under the same limits.
#[derive(Debug, Clone, Default)]
pub struct Runtime {
    config: VmConfig,
}

impl Runtime {
    /// Creates a runtime with default VM limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a runtime with the given VM limits.
    pub fn with_config(config: VmConfig) -> Self {
        Self { config }
    }

    /// Compiles source text into a program.
    ///
    /// # Errors
    /// Propagates `SyntaxError` from the lexer, parser, or compiler.
    pub fn parse(&self, source: &str) -> crate::error::StrandResult<Program> {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize()?;

        let mut parser = Parser::new(tokens);
        let ast = parser.parse()?;

        let program = Compiler::new().compile(&ast)?;
        tracing::debug!(functions = program.len(), "compiled");
        Ok(program)
    }

    /// Executes a program's `"main"` function on a fresh VM.
    pub fn execute(&self, program: &Program) -> crate::error::StrandResult<Outcome> {
        let mut vm = Vm::with_config(self.config.clone());
        vm.execute(program)
    }

    /// Parses and executes source text, measuring the whole composition.
    pub fn run(&self, source: &str) -> crate::error::StrandResult<RunReport> {
        let start = Instant::now();
        let program = self.parse(source)?;
        let outcome = self.execute(&program)?;
        Ok(RunReport {
            outcome,
            total_elapsed: start.elapsed(),
        })
    }
}
