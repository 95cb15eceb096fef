use core::fmt;

/// Result of evaluating an expression.
///
/// Memory only stores integers; booleans come from comparisons and are
/// converted at the point of use.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Bool(bool),
}

impl Value {
    /// Integer view: `true` is 1 and `false` is 0.
    pub fn as_int(self) -> i64 {
        match self {
            Value::Int(value) => value,
            Value::Bool(value) => value as i64,
        }
    }

    /// Truthiness: any non-zero integer is true.
    pub fn as_bool(self) -> bool {
        match self {
            Value::Int(value) => value != 0,
            Value::Bool(value) => value,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(value) => write!(f, "{}", value),
            Value::Bool(value) => write!(f, "{}", value),
        }
    }
}
