//! Expression errors.
//!
//! Every variant is recoverable from the executor's point of view: the
//! operation that raised it is skipped and the run continues.

use thiserror::Error;

use crate::syntax::Span;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// The text does not match the expression grammar.
    #[error("invalid expression `{input}`: {message}")]
    Syntax {
        input: String,
        message: String,
        span: Span,
    },

    /// The text contains a `{` that does not start a valid reference.
    #[error("malformed reference in `{input}`")]
    MalformedReference { input: String, span: Span },

    /// Integer literal or reference offset outside the `i64` range.
    #[error("integer literal `{text}` is out of range")]
    InvalidNumber { text: String },

    #[error("division by zero")]
    DivisionByZero,

    #[error("modulo by zero")]
    ModuloByZero,

    /// An identifier was used while named memory is disabled.
    #[error("`{name}` names a memory cell, but named memory is disabled (tape mode)")]
    NamedMemoryDisabled { name: String },

    #[error("expression nesting depth exceeds maximum of {max_depth} levels")]
    MaxDepthExceeded { max_depth: usize },
}

impl EvalError {
    pub(crate) fn from_pest<R: pest::RuleType>(err: pest::error::Error<R>, input: &str) -> Self {
        let span = match err.location {
            pest::error::InputLocation::Pos(pos) => Span::new(pos, pos),
            pest::error::InputLocation::Span((start, end)) => Span::new(start, end),
        };
        EvalError::Syntax {
            input: input.to_string(),
            message: err.variant.message().into_owned(),
            span,
        }
    }
}
