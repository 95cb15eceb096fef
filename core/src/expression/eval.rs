//! Tree-walking evaluation of parsed expressions.

use super::expr::{Expr, UnaryOp};
use super::operators::{eval_binary_int, eval_comparison};
use super::parser::DEFAULT_MAX_DEPTH;
use super::{EvalError, Value};
use crate::memory::{AddressingMode, Memory};

/// Evaluator over a read-only view of memory.
///
/// Identifiers resolve to named cells in [`AddressingMode::Named`] and are
/// rejected in [`AddressingMode::Tape`].
pub struct Evaluator<'m> {
    memory: &'m Memory,
    mode: AddressingMode,
    max_depth: usize,
    depth: usize,
}

impl<'m> Evaluator<'m> {
    pub fn new(memory: &'m Memory, mode: AddressingMode) -> Self {
        Self {
            memory,
            mode,
            max_depth: DEFAULT_MAX_DEPTH,
            depth: 0,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn eval(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        // Check depth before recursing
        if self.depth >= self.max_depth {
            return Err(EvalError::MaxDepthExceeded {
                max_depth: self.max_depth,
            });
        }

        self.depth += 1;
        let result = self.eval_inner(expr);
        self.depth -= 1;

        result
    }

    fn eval_inner(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        match expr {
            Expr::Int(value) => Ok(Value::Int(*value)),

            Expr::Ident(name) => match self.mode {
                AddressingMode::Named => Ok(Value::Int(self.memory.named(name))),
                AddressingMode::Tape => Err(EvalError::NamedMemoryDisabled { name: name.clone() }),
            },

            Expr::Unary {
                op: UnaryOp::Neg,
                expr,
            } => {
                let value = self.eval(expr)?.as_int();
                Ok(Value::Int(value.wrapping_neg()))
            }

            Expr::Binary { op, left, right } => {
                let left = self.eval(left)?.as_int();
                let right = self.eval(right)?.as_int();
                eval_binary_int(*op, left, right).map(Value::Int)
            }

            Expr::Comparison { op, left, right } => {
                let left = self.eval(left)?.as_int();
                let right = self.eval(right)?.as_int();
                Ok(Value::Bool(eval_comparison(*op, left, right)))
            }
        }
    }
}
