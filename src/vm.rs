//! # VM Module
//!
//! The Strand stack-machine interpreter. Executes one function of a
//! [`Program`] against an explicit frame stack, producing captured output
//! and execution metrics.
//!
//! ## Key Design
//! - CALL/RETURN run on an explicit `Vec<Frame>`, not host recursion, so
//!   call depth is bounded by [`VmConfig::max_call_depth`] rather than the
//!   host stack.
//! - Every instruction's operand contract is validated at dispatch; a
//!   malformed instruction faults before its stack effect is applied.
//! - The program is read-only: a `Vm` borrows it for the duration of one
//!   `execute` call, and independent `Vm` instances may share it freely.
//! - Control flow is linear per function (no branching opcodes), plus
//!   call/return nesting.

use crate::error::{ErrorKind, StrandError, StrandResult};
use crate::opcode::{Instruction, Opcode, Operand};
use crate::program::{Function, Program};
use crate::value::Value;

use rustc_hash::FxHashMap;
use std::io::Write;
use std::rc::Rc;
use std::time::{Duration, Instant};

// -----------------------------------------------------------------------------
// CONFIGURATION
// -----------------------------------------------------------------------------

/// Execution limits, explicitly constructed and owned by the caller.
#[derive(Debug, Clone)]
pub struct VmConfig {
    /// Maximum number of simultaneously live frames. CALL beyond this
    /// fails with `StackOverflow`.
    pub max_call_depth: usize,
    /// Ceiling on total executed instructions, if any. Reaching it fails
    /// with `InstructionLimit`. A guard rail for when branching opcodes
    /// are added; unlimited by default.
    pub max_instructions: Option<u64>,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            max_call_depth: 256,
            max_instructions: None,
        }
    }
}

// -----------------------------------------------------------------------------
// STATE & RESULT
// -----------------------------------------------------------------------------

/// Lifecycle of one interpreter invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VmState {
    /// No instruction dispatched yet.
    Ready,
    /// Dispatching instructions.
    Running,
    /// The outermost frame halted or fell off the end of its function.
    Halted,
    /// An instruction faulted; the failure was propagated to the caller.
    Faulted,
}

/// The Execution Result: produced once per invocation, immutable after.
#[derive(Debug, Clone)]
pub struct Outcome {
    /// Final stack top of the outermost frame, if any.
    pub result: Option<Value>,
    /// Total instructions executed across all frames.
    pub instructions: u64,
    /// Running maximum operand-stack size observed after each instruction.
    pub peak_stack: usize,
    /// Wall-clock time spent in the dispatch loop.
    pub elapsed: Duration,
    /// Ordered sequence of printed textual representations.
    pub output: Vec<String>,
}

// -----------------------------------------------------------------------------
// FRAME
// -----------------------------------------------------------------------------

/// Per-invocation state for one active function: operand stack, variable
/// environment (fresh per call), program counter, and output accumulator.
/// Owned exclusively by one interpreter invocation.
struct Frame<'p> {
    function: &'p Function,
    pc: usize,
    stack: Vec<Value>,
    env: FxHashMap<String, Value>,
    output: Vec<String>,
}

impl<'p> Frame<'p> {
    fn new(function: &'p Function) -> Self {
        Self {
            function,
            pc: 0,
            stack: Vec::new(),
            env: FxHashMap::default(),
            output: Vec::new(),
        }
    }
}

// -----------------------------------------------------------------------------
// VM
// -----------------------------------------------------------------------------

/// The Strand virtual machine. Single-threaded and synchronous: one frame
/// is active at a time, so the operand stack and environment are free of
/// data races by construction.
pub struct Vm {
    config: VmConfig,
    state: VmState,
    trace: Option<Box<dyn Write>>,
}

impl Vm {
    /// Creates a VM with default limits.
    pub fn new() -> Self {
        Self::with_config(VmConfig::default())
    }

    /// Creates a VM with the given limits.
    pub fn with_config(config: VmConfig) -> Self {
        Self {
            config,
            state: VmState::Ready,
            trace: None,
        }
    }

    /// Installs a debug trace sink. When set, one record per executed
    /// instruction (opcode, operands, resulting stack size) is written to
    /// the sink. Tracing never alters functional output; sink write errors
    /// are ignored.
    pub fn set_trace_sink(&mut self, sink: Box<dyn Write>) {
        self.trace = Some(sink);
    }

    /// Returns the state of the most recent invocation.
    pub fn state(&self) -> VmState {
        self.state
    }

    /// Executes the program's `"main"` entry point.
    ///
    /// # Errors
    /// `MissingEntryPoint` if the program has no `"main"`, otherwise any
    /// runtime fault from [`Vm::execute_function`].
    pub fn execute(&mut self, program: &Program) -> StrandResult<Outcome> {
        let entry = match program.entry_point() {
            Ok(function) => function,
            Err(e) => {
                self.state = VmState::Faulted;
                return Err(e);
            }
        };
        self.execute_named(program, entry)
    }

    /// Executes the named function.
    ///
    /// # Errors
    /// One of `UndefinedFunction`, `UndefinedVariable`, `DivideByZero`,
    /// `Type`, `StackUnderflow`, `StackOverflow`, or `InstructionLimit`.
    /// A fault aborts the whole invocation; there is no partial-result
    /// recovery.
    pub fn execute_function(&mut self, program: &Program, name: &str) -> StrandResult<Outcome> {
        let function = match program.lookup(name) {
            Ok(function) => function,
            Err(e) => {
                self.state = VmState::Faulted;
                return Err(e);
            }
        };
        self.execute_named(program, function)
    }

    fn execute_named<'p>(
        &mut self,
        program: &'p Program,
        function: &'p Function,
    ) -> StrandResult<Outcome> {
        self.state = VmState::Ready;
        let result = self.run(program, function);
        self.state = match result {
            Ok(_) => VmState::Halted,
            Err(_) => VmState::Faulted,
        };
        result
    }

    /// The dispatch loop: fetch, validate, apply, record metrics, advance.
    fn run<'p>(&mut self, program: &'p Program, entry: &'p Function) -> StrandResult<Outcome> {
        tracing::debug!(function = %entry.name, "executing");

        let mut frames: Vec<Frame<'p>> = vec![Frame::new(entry)];
        let mut executed: u64 = 0;
        let mut peak_stack: usize = 0;

        self.state = VmState::Running;
        let start = Instant::now();

        loop {
            let (function, pc) = {
                // Invariant: the loop returns before the frame stack empties.
                let frame = frames.last().expect("frame stack is never empty here");
                (frame.function, frame.pc)
            };

            // Falling off the end of the instruction sequence is HALT.
            if pc >= function.instructions.len() {
                if let Some(outcome) =
                    pop_frame(&mut frames, None, executed, peak_stack, start)
                {
                    tracing::debug!(instructions = executed, "execution finished");
                    return Ok(outcome);
                }
                continue;
            }

            if let Some(limit) = self.config.max_instructions {
                if executed >= limit {
                    return Err(StrandError::no_span(
                        ErrorKind::InstructionLimit,
                        format!("instruction ceiling of {} reached in `{}`", limit, function.name),
                    ));
                }
            }

            let instr = &function.instructions[pc];
            instr.check_operands().map_err(|e| {
                StrandError::no_span(
                    e.kind,
                    format!("{} (in `{}` at {})", e.message, function.name, pc),
                )
            })?;

            {
                let frame = frames.last_mut().expect("frame stack is never empty here");
                frame.pc += 1;
            }
            executed += 1;

            match instr.opcode {
                Opcode::Push => {
                    let value = literal_operand(instr).clone();
                    top_frame(&mut frames).stack.push(value);
                }

                Opcode::Pop => {
                    let frame = top_frame(&mut frames);
                    pop_one(frame, Opcode::Pop)?;
                }

                Opcode::Load => {
                    let name = name_operand(instr);
                    let frame = top_frame(&mut frames);
                    let value = frame.env.get(name).cloned().ok_or_else(|| {
                        StrandError::no_span(
                            ErrorKind::UndefinedVariable,
                            format!(
                                "variable `{}` is not defined in `{}`",
                                name, frame.function.name
                            ),
                        )
                    })?;
                    frame.stack.push(value);
                }

                Opcode::Store => {
                    let name = name_operand(instr).to_string();
                    let frame = top_frame(&mut frames);
                    let value = pop_one(frame, Opcode::Store)?;
                    frame.env.insert(name, value);
                }

                Opcode::Add => {
                    let frame = top_frame(&mut frames);
                    let (a, b) = pop_two(frame, Opcode::Add)?;
                    let result = match (&a, &b) {
                        (Value::Num(x), Value::Num(y)) => Value::Num(x + y),
                        (Value::Str(x), Value::Str(y)) => {
                            Value::Str(Rc::new(format!("{}{}", x, y)))
                        }
                        _ => {
                            return Err(type_error("add", &a, &b, frame));
                        }
                    };
                    frame.stack.push(result);
                }

                Opcode::Sub => {
                    let frame = top_frame(&mut frames);
                    let (a, b) = pop_two(frame, Opcode::Sub)?;
                    let result = numeric_op(&a, &b, "subtract", frame, |x, y| x - y)?;
                    frame.stack.push(result);
                }

                Opcode::Mul => {
                    let frame = top_frame(&mut frames);
                    let (a, b) = pop_two(frame, Opcode::Mul)?;
                    let result = numeric_op(&a, &b, "multiply", frame, |x, y| x * y)?;
                    frame.stack.push(result);
                }

                Opcode::Div => {
                    let frame = top_frame(&mut frames);
                    let (a, b) = pop_two(frame, Opcode::Div)?;
                    if let Value::Num(divisor) = &b {
                        if *divisor == 0.0 {
                            return Err(StrandError::no_span(
                                ErrorKind::DivideByZero,
                                format!("division by zero in `{}`", frame.function.name),
                            ));
                        }
                    }
                    let result = numeric_op(&a, &b, "divide", frame, |x, y| x / y)?;
                    frame.stack.push(result);
                }

                Opcode::Print => {
                    let frame = top_frame(&mut frames);
                    let value = pop_one(frame, Opcode::Print)?;
                    frame.output.push(value.to_display_string());
                }

                Opcode::Halt => {
                    if let Some(outcome) =
                        pop_frame(&mut frames, None, executed, peak_stack, start)
                    {
                        self.trace_instr(instr, 0);
                        tracing::debug!(instructions = executed, "execution finished");
                        return Ok(outcome);
                    }
                }

                Opcode::Call => {
                    let name = name_operand(instr);
                    if frames.len() >= self.config.max_call_depth {
                        return Err(StrandError::no_span(
                            ErrorKind::StackOverflow,
                            format!(
                                "call depth limit of {} exceeded calling `{}`",
                                self.config.max_call_depth, name
                            ),
                        ));
                    }
                    let callee = program.lookup(name)?;
                    frames.push(Frame::new(callee));
                }

                Opcode::Return => {
                    let value = top_frame(&mut frames).stack.pop();
                    if let Some(outcome) =
                        pop_frame(&mut frames, value, executed, peak_stack, start)
                    {
                        self.trace_instr(instr, 0);
                        tracing::debug!(instructions = executed, "execution finished");
                        return Ok(outcome);
                    }
                }
            }

            let depth = frames.last().map(|f| f.stack.len()).unwrap_or(0);
            peak_stack = peak_stack.max(depth);
            self.trace_instr(instr, depth);
        }
    }

    fn trace_instr(&mut self, instr: &Instruction, stack_size: usize) {
        if let Some(sink) = self.trace.as_mut() {
            let _ = writeln!(sink, "{:<20} stack={}", instr.to_string(), stack_size);
        }
    }
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}

// -----------------------------------------------------------------------------
// DISPATCH HELPERS
// -----------------------------------------------------------------------------

#[inline]
fn top_frame<'a, 'p>(frames: &'a mut Vec<Frame<'p>>) -> &'a mut Frame<'p> {
    frames.last_mut().expect("frame stack is never empty here")
}

/// Retires the current frame. If a caller remains, the finished frame's
/// output (and return value, if any) flow into it and execution continues.
/// If the outermost frame finished, the final [`Outcome`] is returned.
fn pop_frame(
    frames: &mut Vec<Frame<'_>>,
    return_value: Option<Value>,
    executed: u64,
    peak_stack: usize,
    start: Instant,
) -> Option<Outcome> {
    let finished = frames.pop().expect("frame stack is never empty here");

    match frames.last_mut() {
        Some(caller) => {
            caller.output.extend(finished.output);
            if let Some(value) = return_value {
                caller.stack.push(value);
            }
            None
        }
        None => {
            let result = match return_value {
                Some(value) => Some(value),
                None => finished.stack.last().cloned(),
            };
            Some(Outcome {
                result,
                instructions: executed,
                peak_stack,
                elapsed: start.elapsed(),
                output: finished.output,
            })
        }
    }
}

/// Extracts PUSH's literal operand. The operand contract was validated at
/// dispatch, so any other shape is unreachable.
#[inline]
fn literal_operand(instr: &Instruction) -> &Value {
    match &instr.operands[0] {
        Operand::Literal(value) => value,
        Operand::Name(_) => unreachable!("operand contract validated at dispatch"),
    }
}

/// Extracts a LOAD/STORE/CALL name operand. See [`literal_operand`].
#[inline]
fn name_operand(instr: &Instruction) -> &str {
    match &instr.operands[0] {
        Operand::Name(name) => name,
        Operand::Literal(_) => unreachable!("operand contract validated at dispatch"),
    }
}

fn pop_one(frame: &mut Frame<'_>, op: Opcode) -> StrandResult<Value> {
    frame.stack.pop().ok_or_else(|| {
        StrandError::no_span(
            ErrorKind::StackUnderflow,
            format!("{} on empty stack in `{}`", op, frame.function.name),
        )
    })
}

/// Pops the two operands of a binary opcode: b first, then a.
fn pop_two(frame: &mut Frame<'_>, op: Opcode) -> StrandResult<(Value, Value)> {
    if frame.stack.len() < 2 {
        return Err(StrandError::no_span(
            ErrorKind::StackUnderflow,
            format!(
                "{} needs two operands but the stack holds {} in `{}`",
                op,
                frame.stack.len(),
                frame.function.name
            ),
        ));
    }
    let b = frame.stack.pop().expect("length checked above");
    let a = frame.stack.pop().expect("length checked above");
    Ok((a, b))
}

fn numeric_op(
    a: &Value,
    b: &Value,
    verb: &str,
    frame: &Frame<'_>,
    op: impl Fn(f64, f64) -> f64,
) -> StrandResult<Value> {
    match (a, b) {
        (Value::Num(x), Value::Num(y)) => Ok(Value::Num(op(*x, *y))),
        _ => Err(type_error(verb, a, b, frame)),
    }
}

fn type_error(verb: &str, a: &Value, b: &Value, frame: &Frame<'_>) -> StrandError {
    StrandError::no_span(
        ErrorKind::Type,
        format!(
            "cannot {} {} and {} in `{}`",
            verb,
            a.type_name(),
            b.type_name(),
            frame.function.name
        ),
    )
}
