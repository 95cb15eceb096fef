//! Constrained integer expressions.
//!
//! Operation arguments are evaluated in two passes: memory references are
//! substituted textually ([`reference::resolve`]), then the result is parsed
//! with a small Pratt grammar and walked by [`Evaluator`]. The grammar has
//! integer literals, identifiers (named mode only), parentheses, unary `-`
//! and the operators `+ - * / % < > <= >= == !=`; nothing else.
//!
//! ## Example
//!
//! ```
//! use grd_core::expression::{self, Value};
//! use grd_core::memory::{AddressingMode, Memory};
//!
//! let mut memory = Memory::new();
//! memory.set(0, 4);
//!
//! let value = expression::evaluate("{} * 2 < 10", &memory, AddressingMode::Tape).unwrap();
//! assert_eq!(value, Value::Bool(true));
//! ```

mod error;
mod eval;
mod expr;
mod operators;
mod parser;
pub mod reference;
mod value;



pub use error::EvalError;
pub use eval::Evaluator;
pub use expr::{BinaryOp, ComparisonOp, Expr, UnaryOp};
pub use parser::{DEFAULT_MAX_DEPTH, ExpressionParser, Rule, parse, parse_with_max_depth};
pub use reference::Reference;
pub use value::Value;

use crate::memory::{AddressingMode, Memory};

/// Resolve references in `source` and evaluate it with the default depth limit.
pub fn evaluate(source: &str, memory: &Memory, mode: AddressingMode) -> Result<Value, EvalError> {
    evaluate_with_max_depth(source, memory, mode, DEFAULT_MAX_DEPTH)
}

pub fn evaluate_with_max_depth(
    source: &str,
    memory: &Memory,
    mode: AddressingMode,
    max_depth: usize,
) -> Result<Value, EvalError> {
    let resolved = reference::resolve(source, memory, mode)?;
    let expr = parse_with_max_depth(&resolved, max_depth)?;
    Evaluator::new(memory, mode)
        .with_max_depth(max_depth)
        .eval(&expr)
}
