//! # Value Module
//!
//! Runtime value representation for the Strand VM. Arithmetic lives in a
//! single numeric domain (`f64`), so there is no int/float branching in
//! the interpreter. Strings are `Rc<String>` so pushing, storing, and
//! printing the same string never copies the character data.

use std::fmt;
use std::rc::Rc;

/// A runtime value: the only three shapes the instruction set moves around.
///
/// `Num` and `Bool` are stored inline; `Str` bumps a refcount on clone.
#[derive(Clone)]
pub enum Value {
    /// 64-bit floating-point number (the sole numeric domain).
    Num(f64),
    /// Boolean value.
    Bool(bool),
    /// Reference-counted string.
    Str(Rc<String>),
}

impl Value {
    /// Convenience constructor for string values.
    pub fn str(s: impl Into<String>) -> Self {
        Value::Str(Rc::new(s.into()))
    }

    /// Returns the type name of this value as a static string.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Num(_) => "num",
            Value::Bool(_) => "bool",
            Value::Str(_) => "str",
        }
    }

    /// Returns the textual form PRINT appends to the output sequence.
    ///
    /// Integral finite numbers render without a fractional part, so
    /// `10.0 + 20.0` prints as `30`.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Num(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            Value::Bool(b) => format!("{}", b),
            Value::Str(s) => s.as_ref().clone(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{:?}", s.as_ref()),
            other => write!(f, "{}", other),
        }
    }
}

// Value equality — used by tests and by operand comparisons in tooling.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Num(a), Value::Num(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            _ => false,
        }
    }
}
