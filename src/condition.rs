//! Restricted predicate mini-language used by `!createcondition` and
//! `!dropcondition` directives. Expressions are template-expanded before
//! evaluation, so they compare literal attribute values:
//!
//! ```text
//! {type} == VIEW && {schema} != dbo
//! ({name} == user_stats || {name} == order_stats) && true
//! ```
//!
//! Only equality/inequality over words or quoted strings, the literals
//! `true`/`false`, `&&`, `||` and parentheses. No function calls, no
//! arithmetic, no access to anything beyond the expanded text itself.

use crate::error::{DeployError, Result};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Value(String),
    EqEq,
    NotEq,
    AndAnd,
    OrOr,
    LParen,
    RParen,
}

fn tokenize(expr: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = expr.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '=' => {
                chars.next();
                if chars.next_if_eq(&'=').is_some() {
                    tokens.push(Token::EqEq);
                } else {
                    return Err(syntax(expr, "expected `==`"));
                }
            }
            '!' => {
                chars.next();
                if chars.next_if_eq(&'=').is_some() {
                    tokens.push(Token::NotEq);
                } else {
                    return Err(syntax(expr, "expected `!=`"));
                }
            }
            '&' => {
                chars.next();
                if chars.next_if_eq(&'&').is_some() {
                    tokens.push(Token::AndAnd);
                } else {
                    return Err(syntax(expr, "expected `&&`"));
                }
            }
            '|' => {
                chars.next();
                if chars.next_if_eq(&'|').is_some() {
                    tokens.push(Token::OrOr);
                } else {
                    return Err(syntax(expr, "expected `||`"));
                }
            }
            quote @ ('\'' | '"') => {
                chars.next();
                let mut value = String::new();
                loop {
                    match chars.next() {
                        Some(c) if c == quote => break,
                        Some(c) => value.push(c),
                        None => return Err(syntax(expr, "unterminated string")),
                    }
                }
                tokens.push(Token::Value(value));
            }
            _ => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || "()=!&|'\"".contains(c) {
                        break;
                    }
                    word.push(c);
                    chars.next();
                }
                tokens.push(Token::Value(word));
            }
        }
    }

    Ok(tokens)
}

struct Parser<'a> {
    expr: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    // or := and ("||" and)*
    fn or(&mut self) -> Result<bool> {
        let mut value = self.and()?;
        while self.eat(&Token::OrOr) {
            let rhs = self.and()?;
            value = value || rhs;
        }
        Ok(value)
    }

    // and := atom ("&&" atom)*
    fn and(&mut self) -> Result<bool> {
        let mut value = self.atom()?;
        while self.eat(&Token::AndAnd) {
            let rhs = self.atom()?;
            value = value && rhs;
        }
        Ok(value)
    }

    // atom := "(" or ")" | value (("=="|"!=") value)?
    fn atom(&mut self) -> Result<bool> {
        if self.eat(&Token::LParen) {
            let value = self.or()?;
            if !self.eat(&Token::RParen) {
                return Err(syntax(self.expr, "expected `)`"));
            }
            return Ok(value);
        }

        let lhs = match self.next() {
            Some(Token::Value(v)) => v,
            _ => return Err(syntax(self.expr, "expected a value")),
        };

        match self.peek() {
            Some(Token::EqEq) => {
                self.pos += 1;
                let rhs = self.value()?;
                Ok(lhs == rhs)
            }
            Some(Token::NotEq) => {
                self.pos += 1;
                let rhs = self.value()?;
                Ok(lhs != rhs)
            }
            _ => match lhs.to_lowercase().as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(syntax(
                    self.expr,
                    "bare value must be `true` or `false`, or part of a comparison",
                )),
            },
        }
    }

    fn value(&mut self) -> Result<String> {
        match self.next() {
            Some(Token::Value(v)) => Ok(v),
            _ => Err(syntax(self.expr, "expected a value")),
        }
    }
}

fn syntax(expr: &str, message: &str) -> DeployError {
    DeployError::ConditionSyntax {
        expr: expr.to_string(),
        message: message.to_string(),
    }
}

/// Evaluate a (template-expanded) predicate expression.
pub fn eval_predicate(expr: &str) -> Result<bool> {
    let tokens = tokenize(expr)?;
    if tokens.is_empty() {
        return Err(syntax(expr, "empty expression"));
    }
    let mut parser = Parser {
        expr,
        tokens,
        pos: 0,
    };
    let value = parser.or()?;
    if parser.pos != parser.tokens.len() {
        return Err(syntax(expr, "trailing tokens after expression"));
    }
    Ok(value)
}
