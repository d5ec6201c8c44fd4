//! Integer expressions for offsets and column counts, and text needles.
//!
//! Offsets typed at the prompt may use `+ - * / %`, parentheses, decimal,
//! `0x`/`0o`/`0b` literals and two variables: `cursor` (the current offset)
//! and `size` (the file size).
//!
//! ```
//! use hexless::expr::{Env, evaluate};
//!
//! let env = Env { cursor: 0x10, size: 0x400 };
//! assert_eq!(evaluate("size - 0x10", env), Ok(0x3f0));
//! assert_eq!(evaluate("(cursor + 2) * 4", env), Ok(72));
//! ```

use std::iter::Peekable;
use std::str::CharIndices;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    #[error("empty expression")]
    Empty,
    #[error("unexpected '{found}' at column {column}")]
    Unexpected { found: char, column: usize },
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("unknown name '{0}' (use cursor or size)")]
    UnknownName(String),
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("arithmetic overflow")]
    Overflow,
    #[error("invalid escape '\\{0}'")]
    InvalidEscape(String),
}

/// Values of the variables an expression may refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Env {
    pub cursor: u64,
    pub size: u64,
}

/// Evaluate `input` to a signed integer.
///
/// # Errors
///
/// Returns an [`ExprError`] on syntax errors, unknown names, division by
/// zero or overflow.
pub fn evaluate(input: &str, env: Env) -> Result<i64, ExprError> {
    if input.trim().is_empty() {
        return Err(ExprError::Empty);
    }
    let mut parser = Parser {
        chars: input.char_indices().peekable(),
        env,
    };
    let value = parser.expr()?;
    parser.skip_whitespace();
    match parser.chars.next() {
        None => Ok(value),
        Some((column, found)) => Err(ExprError::Unexpected { found, column }),
    }
}

struct Parser<'a> {
    chars: Peekable<CharIndices<'a>>,
    env: Env,
}

impl Parser<'_> {
    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_whitespace();
        self.chars.peek().map(|&(_, c)| c)
    }

    fn expr(&mut self) -> Result<i64, ExprError> {
        let mut value = self.term()?;
        while let Some(op @ ('+' | '-')) = self.peek() {
            self.chars.next();
            let rhs = self.term()?;
            value = if op == '+' {
                value.checked_add(rhs)
            } else {
                value.checked_sub(rhs)
            }
            .ok_or(ExprError::Overflow)?;
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<i64, ExprError> {
        let mut value = self.unary()?;
        while let Some(op @ ('*' | '/' | '%')) = self.peek() {
            self.chars.next();
            let rhs = self.unary()?;
            value = match op {
                '*' => value.checked_mul(rhs).ok_or(ExprError::Overflow)?,
                _ if rhs == 0 => return Err(ExprError::DivisionByZero),
                '/' => value.checked_div(rhs).ok_or(ExprError::Overflow)?,
                _ => value.checked_rem(rhs).ok_or(ExprError::Overflow)?,
            };
        }
        Ok(value)
    }

    fn unary(&mut self) -> Result<i64, ExprError> {
        match self.peek() {
            Some('-') => {
                self.chars.next();
                self.unary()?.checked_neg().ok_or(ExprError::Overflow)
            }
            Some('+') => {
                self.chars.next();
                self.unary()
            }
            _ => self.atom(),
        }
    }

    fn atom(&mut self) -> Result<i64, ExprError> {
        match self.peek() {
            None => Err(ExprError::UnexpectedEnd),
            Some('(') => {
                self.chars.next();
                let value = self.expr()?;
                match self.peek() {
                    Some(')') => {
                        self.chars.next();
                        Ok(value)
                    }
                    Some(found) => Err(self.unexpected(found)),
                    None => Err(ExprError::UnexpectedEnd),
                }
            }
            Some(c) if c.is_ascii_digit() => {
                let word = self.word();
                parse_number(&word)
            }
            Some(c) if c.is_alphabetic() || c == '_' => {
                let word = self.word();
                let value = match word.as_str() {
                    "cursor" => self.env.cursor,
                    "size" => self.env.size,
                    _ => return Err(ExprError::UnknownName(word)),
                };
                i64::try_from(value).map_err(|_| ExprError::Overflow)
            }
            Some(found) => Err(self.unexpected(found)),
        }
    }

    fn word(&mut self) -> String {
        let mut word = String::new();
        while let Some((_, c)) = self.chars.next_if(|(_, c)| c.is_alphanumeric() || *c == '_') {
            word.push(c);
        }
        word
    }

    fn unexpected(&mut self, found: char) -> ExprError {
        let column = self.chars.peek().map_or(0, |&(idx, _)| idx);
        ExprError::Unexpected { found, column }
    }
}

fn parse_number(word: &str) -> Result<i64, ExprError> {
    let digits = word.replace('_', "");
    let lower = digits.to_ascii_lowercase();
    let (radix, body) = if let Some(rest) = lower.strip_prefix("0x") {
        (16, rest)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (8, rest)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (2, rest)
    } else {
        (10, lower.as_str())
    };
    if body.is_empty() {
        return Err(ExprError::InvalidNumber(word.to_string()));
    }
    let value =
        u64::from_str_radix(body, radix).map_err(|_| ExprError::InvalidNumber(word.to_string()))?;
    i64::try_from(value).map_err(|_| ExprError::Overflow)
}

/// Turn search text into needle bytes.
///
/// Text is taken as UTF-8 with the escapes `\\`, `\n`, `\r`, `\t`, `\0` and
/// `\xNN`.
///
/// # Errors
///
/// Returns [`ExprError::InvalidEscape`] for unknown or truncated escapes.
pub fn parse_needle(text: &str) -> Result<Vec<u8>, ExprError> {
    let mut out = Vec::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0u8; 4];
            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        match chars.next() {
            Some('\\') => out.push(b'\\'),
            Some('n') => out.push(b'\n'),
            Some('r') => out.push(b'\r'),
            Some('t') => out.push(b'\t'),
            Some('0') => out.push(0),
            Some('x') => {
                let hex: String = chars.by_ref().take(2).collect();
                let byte = (hex.len() == 2)
                    .then(|| u8::from_str_radix(&hex, 16).ok())
                    .flatten()
                    .ok_or_else(|| ExprError::InvalidEscape(format!("x{hex}")))?;
                out.push(byte);
            }
            Some(other) => return Err(ExprError::InvalidEscape(other.to_string())),
            None => return Err(ExprError::InvalidEscape(String::new())),
        }
    }
    Ok(out)
}
