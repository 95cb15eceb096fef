//! The six operation kinds and their textual form `KEYWORD(argument)`.

use pest::Parser;
use thiserror::Error;

use crate::expression::{EvalError, Reference};
use crate::program::{ProgramParser, Rule};

/// A parsed node operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// `SET(expr)` or `SET(target, expr)`: store the value of `expr`.
    Set { target: Reference, expression: String },
    /// `INCREMENT` or `INCREMENT(target)`.
    Increment(Reference),
    /// `DECREMENT` or `DECREMENT(target)`.
    Decrement(Reference),
    /// `OUTPUT("template")` or `OUTPUT(expr)`: emit one line.
    Output(Output),
    /// `CHECK` tests the current cell; `CHECK(expr)` tests `expr`.
    Check(Option<String>),
    /// `SHIFT(">>")`: move the pointer by the net count of `>` over `<`.
    Shift(i64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// Quoted text; `{...}` references inside are replaced by cell values.
    Template(String),
    /// An expression whose integer value is printed.
    Value(String),
}

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("unsupported operation `{keyword}`")]
    Unsupported { keyword: String },

    #[error("malformed operation `{text}`: expected `KEYWORD(argument)`")]
    Malformed { text: String },

    #[error("invalid argument for {keyword}: {message}")]
    InvalidArgument {
        keyword: &'static str,
        message: String,
    },

    #[error(transparent)]
    Eval(#[from] EvalError),

    /// Writing to the output stream failed. This is the only error that
    /// aborts a run.
    #[error("failed to write output")]
    Output(#[source] std::io::Error),
}

impl Operation {
    pub fn parse(text: &str) -> Result<Operation, OperationError> {
        let malformed = || OperationError::Malformed {
            text: text.to_string(),
        };
        let call = ProgramParser::parse(Rule::operation_call, text)
            .map_err(|_| malformed())?
            .next()
            .ok_or_else(malformed)?;

        let mut keyword = "";
        let mut argument = "";
        for pair in call.into_inner() {
            match pair.as_rule() {
                Rule::keyword => keyword = pair.as_str(),
                Rule::argument => argument = pair.as_str(),
                _ => {}
            }
        }

        match keyword {
            "SET" => parse_set(argument),
            "INCREMENT" => Ok(Operation::Increment(Reference::parse_target(argument)?)),
            "DECREMENT" => Ok(Operation::Decrement(Reference::parse_target(argument)?)),
            "OUTPUT" => Ok(Operation::Output(parse_output(argument))),
            "CHECK" => {
                let condition = argument.trim();
                Ok(Operation::Check(
                    (!condition.is_empty()).then(|| condition.to_string()),
                ))
            }
            "SHIFT" => parse_shift(argument).map(Operation::Shift),
            _ => Err(OperationError::Unsupported {
                keyword: keyword.to_string(),
            }),
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Operation::Set { .. } => "SET",
            Operation::Increment(_) => "INCREMENT",
            Operation::Decrement(_) => "DECREMENT",
            Operation::Output(_) => "OUTPUT",
            Operation::Check(_) => "CHECK",
            Operation::Shift(_) => "SHIFT",
        }
    }
}

fn parse_set(argument: &str) -> Result<Operation, OperationError> {
    let (target, expression) = match argument.split_once(',') {
        Some((target, expression)) => (Reference::parse_target(target)?, expression),
        None => (Reference::Current, argument),
    };
    let expression = expression.trim();
    if expression.is_empty() {
        return Err(OperationError::InvalidArgument {
            keyword: "SET",
            message: "missing value expression".to_string(),
        });
    }
    Ok(Operation::Set {
        target,
        expression: expression.to_string(),
    })
}

fn parse_output(argument: &str) -> Output {
    let argument = argument.trim();
    match unquote(argument) {
        Some(template) => Output::Template(template.to_string()),
        None if argument.is_empty() => Output::Value("{}".to_string()),
        None => Output::Value(argument.to_string()),
    }
}

fn parse_shift(argument: &str) -> Result<i64, OperationError> {
    let argument = argument.trim();
    let moves = unquote(argument).unwrap_or(argument);
    moves.chars().try_fold(0i64, |delta, c| match c {
        '>' => Ok(delta.wrapping_add(1)),
        '<' => Ok(delta.wrapping_sub(1)),
        c if c.is_whitespace() => Ok(delta),
        c => Err(OperationError::InvalidArgument {
            keyword: "SHIFT",
            message: format!("expected only `<` or `>`, found `{}`", c),
        }),
    })
}

/// Strips one pair of matching double or single quotes.
fn unquote(text: &str) -> Option<&str> {
    ['"', '\''].into_iter().find_map(|quote| {
        text.strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
    })
}
