//! Restricted arithmetic evaluator for supplemental input
//!
//! Supports integer and decimal literals, `+ - * / // % **`, unary `-`/`+`
//! and parentheses. The grammar has no identifiers, calls or attribute
//! access. `evaluate` never fails: anything it cannot evaluate comes back
//! unchanged as [`EvaluatedResult::Raw`].

mod lexer;
mod parser;

use std::fmt;
use thiserror::Error;

/// Longest input considered for evaluation
pub const MAX_INPUT_LEN: usize = 256;
/// Largest magnitude allowed for a numeric literal
pub const MAX_LITERAL: i64 = 1_000_000_000_000;
/// Largest magnitude allowed for the right-hand side of `**`
pub const MAX_EXPONENT: i64 = 1024;

/// Reasons an expression is not evaluated. Never leaves this module.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    #[error("expression is empty")]
    Empty,
    #[error("expression is longer than {} characters", MAX_INPUT_LEN)]
    TooLong,
    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(char),
    #[error("invalid number literal '{0}'")]
    InvalidLiteral(String),
    #[error("number literal '{0}' is too large")]
    LiteralTooLarge(String),
    #[error("unexpected token at position {0}")]
    UnexpectedToken(usize),
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("unbalanced parentheses")]
    UnbalancedParentheses,
    #[error("division by zero")]
    DivisionByZero,
    #[error("exponent is too large")]
    ExponentTooLarge,
    #[error("integer overflow")]
    Overflow,
    #[error("result is not a finite number")]
    NonFinite,
    #[error("result is not a real number")]
    NonReal,
}

/// Numeric value; integers stay integral unless an operation demands a float
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(value) => value as f64,
            Number::Float(value) => value,
        }
    }

    fn is_zero(self) -> bool {
        match self {
            Number::Int(value) => value == 0,
            Number::Float(value) => value == 0.0,
        }
    }
}

impl fmt::Display for Number {
    /// Whole floats print without a fractional part (`7/1` renders as `7`)
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Number::Int(value) => write!(f, "{}", value),
            Number::Float(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
                write!(f, "{}", value as i64)
            }
            Number::Float(value) => write!(f, "{}", value),
        }
    }
}

/// Outcome of evaluating operator input
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluatedResult {
    Numeric(Number),
    /// Input that was not (or could not be) evaluated, unchanged
    Raw(String),
}

impl fmt::Display for EvaluatedResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluatedResult::Numeric(number) => write!(f, "{}", number),
            EvaluatedResult::Raw(text) => f.write_str(text),
        }
    }
}

/// Evaluate `text`, falling back to `Raw(text)` on any failure
pub fn evaluate(text: &str) -> EvaluatedResult {
    match try_evaluate(text) {
        Ok(number) => EvaluatedResult::Numeric(number),
        Err(e) => {
            tracing::debug!(input = %text, reason = %e, "Input kept as raw text");
            EvaluatedResult::Raw(text.to_string())
        }
    }
}

fn try_evaluate(text: &str) -> Result<Number, EvaluationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(EvaluationError::Empty);
    }
    if trimmed.chars().count() > MAX_INPUT_LEN {
        return Err(EvaluationError::TooLong);
    }
    let tokens = lexer::tokenize(trimmed)?;
    parser::Parser::new(tokens).evaluate()
}
