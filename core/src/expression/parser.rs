use lazy_static::lazy_static;
use pest::Parser;
use pest::iterators::Pair;
use pest::pratt_parser::{Assoc, Op, PrattParser};
use pest_derive::Parser;

use super::error::EvalError;
use crate::syntax::Span;
use super::expr::{BinaryOp, ComparisonOp, Expr, UnaryOp};

lazy_static! {
    // Note: precedence is defined lowest to highest.
    static ref PRATT_PARSER: PrattParser<Rule> = PrattParser::new()
        // (lowest precedence)
        .op(Op::infix(Rule::eq, Assoc::Left) | Op::infix(Rule::ne, Assoc::Left))
        .op(
            Op::infix(Rule::lt, Assoc::Left)
                | Op::infix(Rule::gt, Assoc::Left)
                | Op::infix(Rule::le, Assoc::Left)
                | Op::infix(Rule::ge, Assoc::Left)
        )
        .op(Op::infix(Rule::add, Assoc::Left) | Op::infix(Rule::sub, Assoc::Left))
        .op(
            Op::infix(Rule::mul, Assoc::Left)
                | Op::infix(Rule::div, Assoc::Left)
                | Op::infix(Rule::rem, Assoc::Left)
        )
        .op(Op::prefix(Rule::neg))
        // (highest precedence)
        ;
}

#[derive(Parser)]
#[grammar = "expression/expression.pest"]
pub struct ExpressionParser;

/// Default limit on parenthesis and operator nesting.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Parse an expression with the default nesting limit.
pub fn parse(source: &str) -> Result<Expr, EvalError> {
    parse_with_max_depth(source, DEFAULT_MAX_DEPTH)
}

pub fn parse_with_max_depth(source: &str, max_depth: usize) -> Result<Expr, EvalError> {
    let mut pairs = ExpressionParser::parse(Rule::main, source)
        .map_err(|err| EvalError::from_pest(err, source))?;
    let builder = Builder { source, max_depth };
    match pairs.next().and_then(|main| main.into_inner().next()) {
        Some(expression) => builder.build(expression, 0),
        None => Err(EvalError::Syntax {
            input: source.to_string(),
            message: "expected an expression".to_string(),
            span: Span::new(0, source.len()),
        }),
    }
}

struct Builder<'s> {
    source: &'s str,
    max_depth: usize,
}

impl Builder<'_> {
    fn build(&self, pair: Pair<'_, Rule>, depth: usize) -> Result<Expr, EvalError> {
        if depth >= self.max_depth {
            return Err(EvalError::MaxDepthExceeded {
                max_depth: self.max_depth,
            });
        }

        match pair.as_rule() {
            Rule::expression => PRATT_PARSER
                .map_primary(|primary| self.build(primary, depth + 1))
                .map_prefix(|op, rhs| match op.as_rule() {
                    Rule::neg => Ok(Expr::Unary {
                        op: UnaryOp::Neg,
                        expr: Box::new(rhs?),
                    }),
                    rule => Err(self.unexpected(rule, op.as_span())),
                })
                .map_infix(|lhs, op, rhs| {
                    let rule = op.as_rule();
                    let (left, right) = (Box::new(lhs?), Box::new(rhs?));
                    if let Some(op) = binary_op(rule) {
                        Ok(Expr::Binary { op, left, right })
                    } else if let Some(op) = comparison_op(rule) {
                        Ok(Expr::Comparison { op, left, right })
                    } else {
                        Err(self.unexpected(rule, op.as_span()))
                    }
                })
                .parse(pair.into_inner()),

            Rule::integer => {
                let text = pair.as_str();
                text.parse()
                    .map(Expr::Int)
                    .map_err(|_| EvalError::InvalidNumber {
                        text: text.to_string(),
                    })
            }

            Rule::ident => Ok(Expr::Ident(pair.as_str().to_string())),

            Rule::grouped => {
                let span = pair.as_span();
                match pair.into_inner().next() {
                    Some(inner) => self.build(inner, depth + 1),
                    None => Err(self.unexpected(Rule::grouped, span)),
                }
            }

            rule => Err(self.unexpected(rule, pair.as_span())),
        }
    }

    fn unexpected(&self, rule: Rule, span: pest::Span<'_>) -> EvalError {
        EvalError::Syntax {
            input: self.source.to_string(),
            message: format!("unhandled rule {:?}", rule),
            span: span.into(),
        }
    }
}

fn binary_op(rule: Rule) -> Option<BinaryOp> {
    match rule {
        Rule::add => Some(BinaryOp::Add),
        Rule::sub => Some(BinaryOp::Sub),
        Rule::mul => Some(BinaryOp::Mul),
        Rule::div => Some(BinaryOp::Div),
        Rule::rem => Some(BinaryOp::Rem),
        _ => None,
    }
}

fn comparison_op(rule: Rule) -> Option<ComparisonOp> {
    match rule {
        Rule::eq => Some(ComparisonOp::Eq),
        Rule::ne => Some(ComparisonOp::Neq),
        Rule::lt => Some(ComparisonOp::Lt),
        Rule::gt => Some(ComparisonOp::Gt),
        Rule::le => Some(ComparisonOp::Le),
        Rule::ge => Some(ComparisonOp::Ge),
        _ => None,
    }
}
