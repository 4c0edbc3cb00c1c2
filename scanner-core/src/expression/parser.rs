//! Recursive-descent evaluation over the token stream
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! expr  := term (('+' | '-') term)*
//! term  := unary (('*' | '/' | '//' | '%') unary)*
//! unary := ('-' | '+') unary | power
//! power := atom ('**' unary)?
//! atom  := NUMBER | '(' expr ')'
//! ```
//!
//! `**` is right-associative and binds tighter than a unary minus on its
//! left, so `-2**2` is `-4` and `2**-1` is `0.5`.

use crate::expression::lexer::Token;
use crate::expression::{EvaluationError, Number, MAX_EXPONENT};

pub(crate) struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub(crate) fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Evaluate the whole token stream
    pub(crate) fn evaluate(mut self) -> Result<Number, EvaluationError> {
        if self.tokens.is_empty() {
            return Err(EvaluationError::Empty);
        }
        let value = self.expr()?;
        if self.pos != self.tokens.len() {
            return Err(EvaluationError::UnexpectedToken(self.pos));
        }
        Ok(value)
    }

    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expr(&mut self) -> Result<Number, EvaluationError> {
        let mut value = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.pos += 1;
                    value = add(value, self.term()?)?;
                }
                Some(Token::Minus) => {
                    self.pos += 1;
                    value = sub(value, self.term()?)?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn term(&mut self) -> Result<Number, EvaluationError> {
        let mut value = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.pos += 1;
                    value = mul(value, self.unary()?)?;
                }
                Some(Token::Slash) => {
                    self.pos += 1;
                    value = div(value, self.unary()?)?;
                }
                Some(Token::DoubleSlash) => {
                    self.pos += 1;
                    value = floor_div(value, self.unary()?)?;
                }
                Some(Token::Percent) => {
                    self.pos += 1;
                    value = modulo(value, self.unary()?)?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn unary(&mut self) -> Result<Number, EvaluationError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                negate(self.unary()?)
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<Number, EvaluationError> {
        let base = self.atom()?;
        if self.peek() == Some(Token::DoubleStar) {
            self.pos += 1;
            let exponent = self.unary()?;
            return pow(base, exponent);
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<Number, EvaluationError> {
        let at = self.pos;
        match self.advance() {
            Some(Token::Number(value)) => Ok(value),
            Some(Token::LParen) => {
                let value = self.expr()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(value),
                    _ => Err(EvaluationError::UnbalancedParentheses),
                }
            }
            Some(_) => Err(EvaluationError::UnexpectedToken(at)),
            None => Err(EvaluationError::UnexpectedEnd),
        }
    }
}

fn finite(value: f64) -> Result<Number, EvaluationError> {
    if value.is_finite() {
        Ok(Number::Float(value))
    } else {
        Err(EvaluationError::NonFinite)
    }
}

fn add(a: Number, b: Number) -> Result<Number, EvaluationError> {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => {
            x.checked_add(y).map(Number::Int).ok_or(EvaluationError::Overflow)
        }
        _ => finite(a.as_f64() + b.as_f64()),
    }
}

fn sub(a: Number, b: Number) -> Result<Number, EvaluationError> {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => {
            x.checked_sub(y).map(Number::Int).ok_or(EvaluationError::Overflow)
        }
        _ => finite(a.as_f64() - b.as_f64()),
    }
}

fn mul(a: Number, b: Number) -> Result<Number, EvaluationError> {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => {
            x.checked_mul(y).map(Number::Int).ok_or(EvaluationError::Overflow)
        }
        _ => finite(a.as_f64() * b.as_f64()),
    }
}

/// True division always yields a float
fn div(a: Number, b: Number) -> Result<Number, EvaluationError> {
    if b.is_zero() {
        return Err(EvaluationError::DivisionByZero);
    }
    finite(a.as_f64() / b.as_f64())
}

/// Division rounding toward negative infinity
fn floor_div(a: Number, b: Number) -> Result<Number, EvaluationError> {
    if b.is_zero() {
        return Err(EvaluationError::DivisionByZero);
    }
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => {
            let quotient = x.checked_div(y).ok_or(EvaluationError::Overflow)?;
            if x % y != 0 && ((x < 0) != (y < 0)) {
                Ok(Number::Int(quotient - 1))
            } else {
                Ok(Number::Int(quotient))
            }
        }
        _ => finite((a.as_f64() / b.as_f64()).floor()),
    }
}

/// Remainder carrying the sign of the divisor, consistent with `floor_div`
fn modulo(a: Number, b: Number) -> Result<Number, EvaluationError> {
    if b.is_zero() {
        return Err(EvaluationError::DivisionByZero);
    }
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => {
            let remainder = x.checked_rem(y).ok_or(EvaluationError::Overflow)?;
            if remainder != 0 && ((remainder < 0) != (y < 0)) {
                Ok(Number::Int(remainder + y))
            } else {
                Ok(Number::Int(remainder))
            }
        }
        _ => {
            let (x, y) = (a.as_f64(), b.as_f64());
            let remainder = x % y;
            if remainder != 0.0 && ((remainder < 0.0) != (y < 0.0)) {
                finite(remainder + y)
            } else {
                finite(remainder)
            }
        }
    }
}

fn negate(a: Number) -> Result<Number, EvaluationError> {
    match a {
        Number::Int(x) => x.checked_neg().map(Number::Int).ok_or(EvaluationError::Overflow),
        Number::Float(x) => Ok(Number::Float(-x)),
    }
}

fn pow(base: Number, exponent: Number) -> Result<Number, EvaluationError> {
    if exponent.as_f64().abs() > MAX_EXPONENT as f64 {
        return Err(EvaluationError::ExponentTooLarge);
    }
    match (base, exponent) {
        (Number::Int(x), Number::Int(e)) if e >= 0 => x
            .checked_pow(e as u32)
            .map(Number::Int)
            .ok_or(EvaluationError::Overflow),
        (Number::Int(0), Number::Int(_)) => Err(EvaluationError::DivisionByZero),
        _ => {
            let (x, e) = (base.as_f64(), exponent.as_f64());
            if x == 0.0 && e < 0.0 {
                return Err(EvaluationError::DivisionByZero);
            }
            if x < 0.0 && e.fract() != 0.0 {
                return Err(EvaluationError::NonReal);
            }
            finite(x.powf(e))
        }
    }
}
