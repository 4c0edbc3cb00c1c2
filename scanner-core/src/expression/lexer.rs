//! Tokenizer for arithmetic expressions

use crate::expression::{EvaluationError, Number, MAX_LITERAL};

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Token {
    Number(Number),
    Plus,
    Minus,
    Star,
    DoubleStar,
    Slash,
    DoubleSlash,
    Percent,
    LParen,
    RParen,
}

/// Split `text` into tokens. Anything outside digits, `.`, operators,
/// parentheses and whitespace is rejected.
pub(crate) fn tokenize(text: &str) -> Result<Vec<Token>, EvaluationError> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        let c = chars[pos];
        match c {
            c if c.is_whitespace() => pos += 1,
            '0'..='9' | '.' => {
                let start = pos;
                while pos < chars.len() && (chars[pos].is_ascii_digit() || chars[pos] == '.') {
                    pos += 1;
                }
                let literal: String = chars[start..pos].iter().collect();
                tokens.push(Token::Number(parse_literal(&literal)?));
            }
            '+' => {
                tokens.push(Token::Plus);
                pos += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                pos += 1;
            }
            '*' if chars.get(pos + 1) == Some(&'*') => {
                tokens.push(Token::DoubleStar);
                pos += 2;
            }
            '*' => {
                tokens.push(Token::Star);
                pos += 1;
            }
            '/' if chars.get(pos + 1) == Some(&'/') => {
                tokens.push(Token::DoubleSlash);
                pos += 2;
            }
            '/' => {
                tokens.push(Token::Slash);
                pos += 1;
            }
            '%' => {
                tokens.push(Token::Percent);
                pos += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                pos += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                pos += 1;
            }
            other => return Err(EvaluationError::UnexpectedCharacter(other)),
        }
    }

    Ok(tokens)
}

fn parse_literal(literal: &str) -> Result<Number, EvaluationError> {
    let invalid = || EvaluationError::InvalidLiteral(literal.to_string());

    if literal.contains('.') {
        if literal == "." || literal.matches('.').count() > 1 {
            return Err(invalid());
        }
        let value: f64 = literal.parse().map_err(|_| invalid())?;
        if value.abs() > MAX_LITERAL as f64 {
            return Err(EvaluationError::LiteralTooLarge(literal.to_string()));
        }
        return Ok(Number::Float(value));
    }

    // `007` is not a valid integer literal, `000` is
    if literal.len() > 1 && literal.starts_with('0') && literal.chars().any(|c| c != '0') {
        return Err(invalid());
    }
    if literal.len() > 13 {
        return Err(EvaluationError::LiteralTooLarge(literal.to_string()));
    }
    let value: i64 = literal.parse().map_err(|_| invalid())?;
    if value > MAX_LITERAL {
        return Err(EvaluationError::LiteralTooLarge(literal.to_string()));
    }
    Ok(Number::Int(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operators() {
        let tokens = tokenize("2 ** 3 // (4 % 1.5)").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Number(Number::Int(2)),
                Token::DoubleStar,
                Token::Number(Number::Int(3)),
                Token::DoubleSlash,
                Token::LParen,
                Token::Number(Number::Int(4)),
                Token::Percent,
                Token::Number(Number::Float(1.5)),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn test_float_forms() {
        assert_eq!(tokenize(".5").unwrap(), vec![Token::Number(Number::Float(0.5))]);
        assert_eq!(tokenize("2.").unwrap(), vec![Token::Number(Number::Float(2.0))]);
        assert!(tokenize("1.2.3").is_err());
        assert!(tokenize(".").is_err());
    }

    #[test]
    fn test_rejects_identifiers_and_leading_zeros() {
        assert!(matches!(
            tokenize("abs(1)"),
            Err(EvaluationError::UnexpectedCharacter('a'))
        ));
        assert!(tokenize("1e3").is_err());
        assert!(tokenize("007").is_err());
        assert!(tokenize("000").is_ok());
    }

    #[test]
    fn test_literal_limit() {
        assert!(tokenize("1000000000000").is_ok());
        assert!(matches!(
            tokenize("1000000000001"),
            Err(EvaluationError::LiteralTooLarge(_))
        ));
        assert!(tokenize("99999999999999999999999").is_err());
    }
}
