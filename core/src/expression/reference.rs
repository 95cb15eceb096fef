//! Memory references inside operation arguments.
//!
//! `{}` is the current cell, `{N}` the cell `N` places from the pointer and,
//! in named mode, `{name}` a named cell. References are replaced by the
//! values they denote before the surrounding text is parsed.

use pest::Parser;
use pest::iterators::Pair;

use super::EvalError;
use super::parser::{ExpressionParser, Rule};
use crate::memory::{AddressingMode, Memory};
use crate::syntax::Span;

/// A single memory location named by an operation argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// The cell under the pointer.
    Current,
    /// The cell at `pointer + offset`.
    Relative(i64),
    /// A named cell.
    Named(String),
}

impl Reference {
    /// Parses a destination: empty text, a `{...}` reference or a bare name.
    pub fn parse_target(text: &str) -> Result<Reference, EvalError> {
        let target = ExpressionParser::parse(Rule::target, text)
            .map_err(|err| EvalError::from_pest(err, text))?
            .next()
            .and_then(|target| target.into_inner().next());

        match target {
            Some(pair) if pair.as_rule() == Rule::reference => from_pair(pair),
            Some(pair) if pair.as_rule() == Rule::ref_name => {
                Ok(Reference::Named(pair.as_str().to_string()))
            }
            _ => Ok(Reference::Current),
        }
    }

    pub fn read(&self, memory: &Memory, mode: AddressingMode) -> Result<i64, EvalError> {
        match self {
            Reference::Current => Ok(memory.current()),
            Reference::Relative(offset) => Ok(memory.get(memory.relative(*offset))),
            Reference::Named(name) => {
                check_named(name, mode)?;
                Ok(memory.named(name))
            }
        }
    }

    pub fn write(
        &self,
        memory: &mut Memory,
        mode: AddressingMode,
        value: i64,
    ) -> Result<(), EvalError> {
        match self {
            Reference::Current => memory.set(memory.pointer(), value),
            Reference::Relative(offset) => memory.set(memory.relative(*offset), value),
            Reference::Named(name) => {
                check_named(name, mode)?;
                memory.set_named(name, value);
            }
        }
        Ok(())
    }
}

fn check_named(name: &str, mode: AddressingMode) -> Result<(), EvalError> {
    match mode {
        AddressingMode::Named => Ok(()),
        AddressingMode::Tape => Err(EvalError::NamedMemoryDisabled {
            name: name.to_string(),
        }),
    }
}

/// Converts a `reference` pair into a [`Reference`].
fn from_pair(pair: Pair<'_, Rule>) -> Result<Reference, EvalError> {
    match pair.into_inner().next() {
        None => Ok(Reference::Current),
        Some(inner) => match inner.as_rule() {
            Rule::ref_name => Ok(Reference::Named(inner.as_str().to_string())),
            _ => {
                let text = inner.as_str();
                let offset = text.strip_prefix('+').unwrap_or(text);
                offset
                    .parse()
                    .map(Reference::Relative)
                    .map_err(|_| EvalError::InvalidNumber {
                        text: text.to_string(),
                    })
            }
        },
    }
}

/// Replaces every reference in an expression with its value.
///
/// Negative values are parenthesised so `2-{}` with a current cell of -3
/// reads as `2-(-3)`. `i64::MIN` has no literal form and is written as
/// `(-9223372036854775807 - 1)`.
pub fn resolve(text: &str, memory: &Memory, mode: AddressingMode) -> Result<String, EvalError> {
    substitute(text, memory, mode, |value| match value {
        i64::MIN => format!("(-{} - 1)", i64::MAX),
        value if value < 0 => format!("({})", value),
        value => value.to_string(),
    })
}

/// Replaces every reference in an output template with its value.
pub fn render(text: &str, memory: &Memory, mode: AddressingMode) -> Result<String, EvalError> {
    substitute(text, memory, mode, |value| value.to_string())
}

fn substitute(
    text: &str,
    memory: &Memory,
    mode: AddressingMode,
    format_value: impl Fn(i64) -> String,
) -> Result<String, EvalError> {
    let template = ExpressionParser::parse(Rule::template, text)
        .map_err(|err| match err.location {
            pest::error::InputLocation::Pos(pos) => EvalError::MalformedReference {
                input: text.to_string(),
                span: Span::new(pos, text.len()),
            },
            pest::error::InputLocation::Span((start, end)) => EvalError::MalformedReference {
                input: text.to_string(),
                span: Span::new(start, end),
            },
        })?;

    let mut output = String::with_capacity(text.len());
    for part in template.flatten() {
        match part.as_rule() {
            Rule::text => output.push_str(part.as_str()),
            Rule::reference => {
                let value = from_pair(part)?.read(memory, mode)?;
                output.push_str(&format_value(value));
            }
            _ => {}
        }
    }
    Ok(output)
}
