use serde_json::Value as JsonValue;

use super::{CompareOp, QueryError};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Ident(String),
    Str(String),
    Number(JsonValue),
    Star,
    Comma,
    Dot,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Compare(CompareOp),
    Eof,
}

impl Token {
    pub(crate) fn describe(&self) -> String {
        match self {
            Token::Ident(name) => name.clone(),
            Token::Str(s) => format!("'{}'", s),
            Token::Number(n) => n.to_string(),
            Token::Star => "*".to_string(),
            Token::Comma => ",".to_string(),
            Token::Dot => ".".to_string(),
            Token::LParen => "(".to_string(),
            Token::RParen => ")".to_string(),
            Token::LBracket => "[".to_string(),
            Token::RBracket => "]".to_string(),
            Token::Compare(op) => match op {
                CompareOp::Eq => "=",
                CompareOp::Ne => "!=",
                CompareOp::Lt => "<",
                CompareOp::Le => "<=",
                CompareOp::Gt => ">",
                CompareOp::Ge => ">=",
            }
            .to_string(),
            Token::Eof => "end of input".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct SpannedToken {
    pub token: Token,
    pub position: usize,
}

pub(crate) struct Lexer<'a> {
    input: &'a str,
    offset: usize,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self { input, offset: 0 }
    }

    pub(crate) fn lex(mut self) -> Result<Vec<SpannedToken>, QueryError> {
        let mut tokens = Vec::new();

        while let Some(ch) = self.peek() {
            let start = self.offset;
            match ch {
                c if c.is_whitespace() => {
                    self.offset += c.len_utf8();
                }
                '*' => tokens.push(self.single(Token::Star)),
                ',' => tokens.push(self.single(Token::Comma)),
                '.' => tokens.push(self.single(Token::Dot)),
                '(' => tokens.push(self.single(Token::LParen)),
                ')' => tokens.push(self.single(Token::RParen)),
                '[' => tokens.push(self.single(Token::LBracket)),
                ']' => tokens.push(self.single(Token::RBracket)),
                '=' => tokens.push(self.single(Token::Compare(CompareOp::Eq))),
                '!' => {
                    if self.peek_next() == Some('=') {
                        self.offset += 2;
                        tokens.push(SpannedToken {
                            token: Token::Compare(CompareOp::Ne),
                            position: start,
                        });
                    } else {
                        return Err(QueryError::UnexpectedToken {
                            expected: "!=",
                            found: "!".to_string(),
                            position: start,
                        });
                    }
                }
                '<' => {
                    let op = match self.peek_next() {
                        Some('=') => Some(CompareOp::Le),
                        Some('>') => Some(CompareOp::Ne),
                        _ => None,
                    };
                    self.offset += if op.is_some() { 2 } else { 1 };
                    tokens.push(SpannedToken {
                        token: Token::Compare(op.unwrap_or(CompareOp::Lt)),
                        position: start,
                    });
                }
                '>' => {
                    let op = if self.peek_next() == Some('=') {
                        self.offset += 2;
                        CompareOp::Ge
                    } else {
                        self.offset += 1;
                        CompareOp::Gt
                    };
                    tokens.push(SpannedToken { token: Token::Compare(op), position: start });
                }
                '\'' | '"' => {
                    let value = self.string_literal(ch)?;
                    tokens.push(SpannedToken { token: Token::Str(value), position: start });
                }
                c if c.is_ascii_digit()
                    || (c == '-' && self.peek_next().is_some_and(|n| n.is_ascii_digit())) =>
                {
                    let value = self.number_literal()?;
                    tokens.push(SpannedToken { token: Token::Number(value), position: start });
                }
                c if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
                    self.consume_while(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
                    let ident = self.input[start..self.offset].to_string();
                    tokens.push(SpannedToken { token: Token::Ident(ident), position: start });
                }
                other => {
                    return Err(QueryError::UnexpectedToken {
                        expected: "identifier, literal, or operator",
                        found: other.to_string(),
                        position: start,
                    });
                }
            }
        }

        if tokens.is_empty() {
            return Err(QueryError::EmptyInput);
        }

        tokens.push(SpannedToken { token: Token::Eof, position: self.offset });
        Ok(tokens)
    }

    fn peek(&self) -> Option<char> {
        self.input[self.offset..].chars().next()
    }

    fn peek_next(&self) -> Option<char> {
        let mut chars = self.input[self.offset..].chars();
        chars.next();
        chars.next()
    }

    fn single(&mut self, token: Token) -> SpannedToken {
        let spanned = SpannedToken { token, position: self.offset };
        self.offset += 1;
        spanned
    }

    fn consume_while<F>(&mut self, condition: F)
    where
        F: Fn(char) -> bool,
    {
        while let Some(c) = self.peek() {
            if condition(c) {
                self.offset += c.len_utf8();
            } else {
                break;
            }
        }
    }

    fn string_literal(&mut self, quote: char) -> Result<String, QueryError> {
        let start = self.offset;
        self.offset += 1;
        let mut value = String::new();
        loop {
            let Some(c) = self.peek() else {
                return Err(QueryError::UnterminatedString { position: start });
            };
            self.offset += c.len_utf8();
            match c {
                '\\' => {
                    let Some(escaped) = self.peek() else {
                        return Err(QueryError::UnterminatedString { position: start });
                    };
                    self.offset += escaped.len_utf8();
                    value.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        other => other,
                    });
                }
                c if c == quote => return Ok(value),
                c => value.push(c),
            }
        }
    }

    fn number_literal(&mut self) -> Result<JsonValue, QueryError> {
        let start = self.offset;
        if self.peek() == Some('-') {
            self.offset += 1;
        }
        self.consume_while(|c| c.is_ascii_digit());
        let mut fractional = false;
        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            fractional = true;
            self.offset += 1;
            self.consume_while(|c| c.is_ascii_digit());
        }
        if matches!(self.peek(), Some('e') | Some('E')) {
            fractional = true;
            self.offset += 1;
            if matches!(self.peek(), Some('+') | Some('-')) {
                self.offset += 1;
            }
            self.consume_while(|c| c.is_ascii_digit());
        }

        let literal = &self.input[start..self.offset];
        let invalid = || QueryError::InvalidNumber { literal: literal.to_string(), position: start };
        if !fractional {
            if let Ok(n) = literal.parse::<i64>() {
                return Ok(JsonValue::from(n));
            }
        }
        let f = literal.parse::<f64>().map_err(|_| invalid())?;
        serde_json::Number::from_f64(f).map(JsonValue::Number).ok_or_else(invalid)
    }
}
