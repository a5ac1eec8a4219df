//! # Opcode Module
//!
//! Stack-based instruction set for the Strand virtual machine.
//!
//! ## Design Notes
//! - A closed enum per opcode, dispatched via `match` in the VM's hot loop —
//!   exhaustiveness is checked at compile time, never by string lookup.
//! - Each opcode declares a fixed operand contract (arity + shape). The VM
//!   verifies the contract at dispatch, so a hand-assembled instruction with
//!   the wrong operands fails fast with a descriptive error instead of
//!   corrupting the stack.
//! - ADD doubles as string concatenation when **both** operands are strings.
//!   Mixed string/number operands are a type error; there is no implicit
//!   coercion.

use crate::error::{ErrorKind, StrandError, StrandResult};
use crate::value::Value;

use std::fmt;

// -----------------------------------------------------------------------------
// OPCODE
// -----------------------------------------------------------------------------

/// A single operation code in the Strand instruction set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    /// Pushes a literal operand onto the stack.
    Push,
    /// Pops and discards the top of the stack.
    Pop,
    /// Pushes the value bound to the named variable.
    Load,
    /// Pops the top and binds it to the named variable.
    Store,
    /// Pops b, pops a, pushes a + b (or string concatenation).
    Add,
    /// Pops b, pops a, pushes a - b.
    Sub,
    /// Pops b, pops a, pushes a * b.
    Mul,
    /// Pops b, pops a, pushes a / b. Zero divisor is a fault.
    Div,
    /// Pops the top and appends its textual form to the frame output.
    Print,
    /// Stops execution of the current frame.
    Halt,
    /// Suspends the current frame and enters the named function.
    Call,
    /// Pops the top (if present) as the frame result and resumes the caller.
    Return,
}

impl Opcode {
    /// Returns the number of operands this opcode requires.
    #[inline]
    pub fn arity(self) -> usize {
        match self {
            Opcode::Push | Opcode::Load | Opcode::Store | Opcode::Call => 1,
            Opcode::Pop
            | Opcode::Add
            | Opcode::Sub
            | Opcode::Mul
            | Opcode::Div
            | Opcode::Print
            | Opcode::Halt
            | Opcode::Return => 0,
        }
    }

    /// Returns the assembler mnemonic for this opcode.
    pub fn name(self) -> &'static str {
        match self {
            Opcode::Push => "PUSH",
            Opcode::Pop => "POP",
            Opcode::Load => "LOAD",
            Opcode::Store => "STORE",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::Print => "PRINT",
            Opcode::Halt => "HALT",
            Opcode::Call => "CALL",
            Opcode::Return => "RETURN",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// -----------------------------------------------------------------------------
// OPERAND
// -----------------------------------------------------------------------------

/// An instruction operand: either a literal value or a symbolic name
/// (variable identifier for LOAD/STORE, function name for CALL).
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A literal value (number, string, boolean).
    Literal(Value),
    /// A symbolic name resolved at execution time.
    Name(String),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Literal(v) => write!(f, "{:?}", v),
            Operand::Name(n) => f.write_str(n),
        }
    }
}

// -----------------------------------------------------------------------------
// INSTRUCTION
// -----------------------------------------------------------------------------

/// An (opcode, operands) pair. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    /// The operation this instruction performs.
    pub opcode: Opcode,
    /// Operand list; its length must match `opcode.arity()`.
    pub operands: Vec<Operand>,
}

impl Instruction {
    /// Creates an instruction from raw parts.
    pub fn new(opcode: Opcode, operands: Vec<Operand>) -> Self {
        Self { opcode, operands }
    }

    /// `PUSH <literal>`
    pub fn push(value: Value) -> Self {
        Self::new(Opcode::Push, vec![Operand::Literal(value)])
    }

    /// `POP`
    pub fn pop() -> Self {
        Self::new(Opcode::Pop, Vec::new())
    }

    /// `LOAD <name>`
    pub fn load(name: impl Into<String>) -> Self {
        Self::new(Opcode::Load, vec![Operand::Name(name.into())])
    }

    /// `STORE <name>`
    pub fn store(name: impl Into<String>) -> Self {
        Self::new(Opcode::Store, vec![Operand::Name(name.into())])
    }

    /// `ADD`
    pub fn add() -> Self {
        Self::new(Opcode::Add, Vec::new())
    }

    /// `SUB`
    pub fn sub() -> Self {
        Self::new(Opcode::Sub, Vec::new())
    }

    /// `MUL`
    pub fn mul() -> Self {
        Self::new(Opcode::Mul, Vec::new())
    }

    /// `DIV`
    pub fn div() -> Self {
        Self::new(Opcode::Div, Vec::new())
    }

    /// `PRINT`
    pub fn print() -> Self {
        Self::new(Opcode::Print, Vec::new())
    }

    /// `HALT`
    pub fn halt() -> Self {
        Self::new(Opcode::Halt, Vec::new())
    }

    /// `CALL <name>`
    pub fn call(name: impl Into<String>) -> Self {
        Self::new(Opcode::Call, vec![Operand::Name(name.into())])
    }

    /// `RETURN`
    pub fn ret() -> Self {
        Self::new(Opcode::Return, Vec::new())
    }

    /// Verifies the operand list against the opcode's declared contract:
    /// exact arity, literal operand for PUSH, name operand for
    /// LOAD/STORE/CALL.
    ///
    /// The VM runs this check at every dispatch so malformed hand-assembled
    /// bytecode faults before its stack effect is applied.
    pub fn check_operands(&self) -> StrandResult<()> {
        let arity = self.opcode.arity();
        if self.operands.len() != arity {
            return Err(StrandError::no_span(
                ErrorKind::Type,
                format!(
                    "{} expects {} operand(s), found {} in `{}`",
                    self.opcode,
                    arity,
                    self.operands.len(),
                    self
                ),
            ));
        }

        match self.opcode {
            Opcode::Push => match &self.operands[0] {
                Operand::Literal(_) => Ok(()),
                Operand::Name(n) => Err(StrandError::no_span(
                    ErrorKind::Type,
                    format!("PUSH expects a literal operand, found name `{}`", n),
                )),
            },
            Opcode::Load | Opcode::Store | Opcode::Call => match &self.operands[0] {
                Operand::Name(_) => Ok(()),
                Operand::Literal(v) => Err(StrandError::no_span(
                    ErrorKind::Type,
                    format!(
                        "{} expects a name operand, found literal `{:?}`",
                        self.opcode, v
                    ),
                )),
            },
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.opcode)?;
        for operand in &self.operands {
            write!(f, " {}", operand)?;
        }
        Ok(())
    }
}
