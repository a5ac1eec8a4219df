//! # Program Module
//!
//! The bytecode container: a read-only mapping from function name to compiled
//! instruction sequence. Built once by the compiler (or by hand for tests),
//! then shared immutably with any number of VM instances.
//!
//! No instruction validation happens here — operand contracts are checked by
//! the VM at dispatch, so a `Program` can hold deliberately malformed
//! instructions for conformance testing.

use crate::error::{ErrorKind, StrandError, StrandResult};
use crate::opcode::Instruction;

use rustc_hash::FxHashMap;
use std::fmt::Write as _;

/// Name of the mandatory entry-point function.
pub const ENTRY_POINT: &str = "main";

// -----------------------------------------------------------------------------
// FUNCTION
// -----------------------------------------------------------------------------

/// A named, ordered sequence of instructions.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    /// The function's name, unique within its program.
    pub name: String,
    /// The instruction sequence, executed strictly in order.
    pub instructions: Vec<Instruction>,
}

impl Function {
    /// Creates a function from a name and an ordered instruction list.
    pub fn new(name: impl Into<String>, instructions: Vec<Instruction>) -> Self {
        Self {
            name: name.into(),
            instructions,
        }
    }
}

// -----------------------------------------------------------------------------
// PROGRAM — The Bytecode Module
// -----------------------------------------------------------------------------

/// A compiled program: function name → [`Function`].
///
/// Owns its functions exclusively and holds no back-references.
#[derive(Debug, Clone, Default)]
pub struct Program {
    functions: FxHashMap<String, Function>,
}

impl Program {
    /// Creates an empty program.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a function, replacing any previous function with the same
    /// name. Idempotent by name.
    pub fn define(&mut self, name: impl Into<String>, instructions: Vec<Instruction>) {
        let name = name.into();
        let function = Function::new(name.clone(), instructions);
        self.functions.insert(name, function);
    }

    /// Looks up a function by name.
    pub fn lookup(&self, name: &str) -> StrandResult<&Function> {
        self.functions.get(name).ok_or_else(|| {
            StrandError::no_span(
                ErrorKind::UndefinedFunction,
                format!("function `{}` is not defined", name),
            )
        })
    }

    /// Returns the `"main"` entry point.
    pub fn entry_point(&self) -> StrandResult<&Function> {
        self.functions.get(ENTRY_POINT).ok_or_else(|| {
            StrandError::no_span(
                ErrorKind::MissingEntryPoint,
                format!("program has no `{}` function", ENTRY_POINT),
            )
        })
    }

    /// Returns `true` if a function with this name is defined.
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Number of functions in this program.
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Returns `true` if no functions are defined.
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Renders a human-readable listing of every function, entry point
    /// first, remaining functions in name order for stable output.
    pub fn disassemble(&self) -> String {
        let mut names: Vec<&str> = self
            .functions
            .keys()
            .map(String::as_str)
            .filter(|n| *n != ENTRY_POINT)
            .collect();
        names.sort_unstable();
        if self.functions.contains_key(ENTRY_POINT) {
            names.insert(0, ENTRY_POINT);
        }

        let mut out = String::new();
        for name in names {
            let function = &self.functions[name];
            let _ = writeln!(out, "fn {} ({} instructions)", name, function.instructions.len());
            for (idx, instruction) in function.instructions.iter().enumerate() {
                let _ = writeln!(out, "  {:3}: {}", idx, instruction);
            }
        }
        out
    }
}
