use serde_json::Value as JsonValue;

use super::lexer::{SpannedToken, Token};
use super::{Expr, Function, OrderBy, PathSegment, Projection, Query, QueryError, Selection};

/// Recursive-descent parser over the token stream
pub(crate) struct Parser {
    tokens: Vec<SpannedToken>,
    index: usize,
    /// FROM alias, found up front so projections can be resolved as they are parsed
    alias: String,
}

impl Parser {
    pub(crate) fn new(tokens: Vec<SpannedToken>) -> Self {
        let alias = find_from_alias(&tokens).unwrap_or_default();
        Self { tokens, index: 0, alias }
    }

    pub(crate) fn parse_query(mut self) -> Result<Query, QueryError> {
        self.expect_keyword("SELECT")?;

        let top = if self.matches_keyword("TOP") { Some(self.parse_top()?) } else { None };
        let value = self.matches_keyword("VALUE");
        let selection = self.parse_selection(value)?;

        self.expect_keyword("FROM")?;
        let position = self.current().position;
        let alias = self.expect_ident("collection alias")?;
        if alias != self.alias {
            return Err(QueryError::UnknownIdentifier { name: alias, position });
        }

        let filter = if self.matches_keyword("WHERE") { Some(self.parse_expression()?) } else { None };

        let order_by = if self.matches_keyword("ORDER") {
            self.expect_keyword("BY")?;
            let expr = self.parse_expression()?;
            let descending = if self.matches_keyword("DESC") {
                true
            } else {
                self.matches_keyword("ASC");
                false
            };
            Some(OrderBy { expr, descending })
        } else {
            None
        };

        self.expect_eof()?;

        Ok(Query { top, selection, alias, filter, order_by })
    }

    fn parse_top(&mut self) -> Result<usize, QueryError> {
        let position = self.current().position;
        match self.current().token.clone() {
            Token::Number(JsonValue::Number(n)) => {
                let n = n.as_u64().ok_or_else(|| QueryError::InvalidNumber {
                    literal: n.to_string(),
                    position,
                })?;
                self.advance();
                usize::try_from(n)
                    .map_err(|_| QueryError::InvalidNumber { literal: n.to_string(), position })
            }
            _ => Err(self.unexpected("row count after TOP")),
        }
    }

    fn parse_selection(&mut self, value: bool) -> Result<Selection, QueryError> {
        if matches!(self.current().token, Token::Star) {
            if value {
                return Err(self.unexpected("expression after VALUE"));
            }
            self.advance();
            return Ok(Selection::All);
        }

        if self.at_count() {
            self.advance();
            self.expect(Token::LParen, "(")?;
            let expr = if matches!(self.current().token, Token::Star) {
                self.advance();
                Expr::Literal(JsonValue::from(1))
            } else {
                self.parse_expression()?
            };
            self.expect(Token::RParen, ")")?;
            if matches!(self.current().token, Token::Comma) {
                return Err(QueryError::MisplacedCount);
            }
            return Ok(Selection::Count { expr, value });
        }

        if value {
            return Ok(Selection::Value(self.parse_expression()?));
        }

        let mut fields = Vec::new();
        let mut unnamed = 0usize;
        loop {
            if self.at_count() {
                return Err(QueryError::MisplacedCount);
            }
            let expr = self.parse_expression()?;
            let name = if self.matches_keyword("AS") {
                self.expect_ident("projection name")?
            } else if let Some(PathSegment::Field(last)) = last_segment(&expr) {
                last.clone()
            } else {
                unnamed += 1;
                format!("${}", unnamed)
            };
            fields.push(Projection { expr, name });
            if !self.matches(&Token::Comma) {
                break;
            }
        }
        Ok(Selection::Fields(fields))
    }

    fn parse_expression(&mut self) -> Result<Expr, QueryError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, QueryError> {
        let mut parts = vec![self.parse_and()?];
        while self.matches_keyword("OR") {
            parts.push(self.parse_and()?);
        }
        Ok(if parts.len() == 1 { parts.remove(0) } else { Expr::Or(parts) })
    }

    fn parse_and(&mut self) -> Result<Expr, QueryError> {
        let mut parts = vec![self.parse_not()?];
        while self.matches_keyword("AND") {
            parts.push(self.parse_not()?);
        }
        Ok(if parts.len() == 1 { parts.remove(0) } else { Expr::And(parts) })
    }

    fn parse_not(&mut self) -> Result<Expr, QueryError> {
        if self.matches_keyword("NOT") {
            return Ok(Expr::Not(Box::new(self.parse_not()?)));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, QueryError> {
        let lhs = self.parse_primary()?;
        if let Token::Compare(op) = self.current().token {
            self.advance();
            let rhs = self.parse_primary()?;
            return Ok(Expr::Compare { op, lhs: Box::new(lhs), rhs: Box::new(rhs) });
        }
        Ok(lhs)
    }

    fn parse_primary(&mut self) -> Result<Expr, QueryError> {
        let position = self.current().position;
        match self.current().token.clone() {
            Token::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(Token::RParen, ")")?;
                Ok(expr)
            }
            Token::Str(s) => {
                self.advance();
                Ok(Expr::Literal(JsonValue::String(s)))
            }
            Token::Number(n) => {
                self.advance();
                Ok(Expr::Literal(n))
            }
            Token::Ident(name) => {
                self.advance();
                if let Some(literal) = keyword_literal(&name) {
                    return Ok(Expr::Literal(literal));
                }
                if matches!(self.current().token, Token::LParen) {
                    return self.parse_call(&name, position);
                }
                if name != self.alias {
                    return Err(QueryError::UnknownIdentifier { name, position });
                }
                self.parse_path()
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    fn parse_call(&mut self, name: &str, position: usize) -> Result<Expr, QueryError> {
        let function = Function::lookup(name)
            .ok_or_else(|| QueryError::UnknownFunction { name: name.to_string(), position })?;
        self.expect(Token::LParen, "(")?;
        let mut args = Vec::new();
        if !self.matches(&Token::RParen) {
            loop {
                args.push(self.parse_expression()?);
                if self.matches(&Token::Comma) {
                    continue;
                }
                self.expect(Token::RParen, ", or )")?;
                break;
            }
        }
        let (min, max, expected) = function.arity();
        if args.len() < min || args.len() > max {
            return Err(QueryError::Arity { name: function.name(), expected, found: args.len() });
        }
        Ok(Expr::Call { function, args })
    }

    fn parse_path(&mut self) -> Result<Expr, QueryError> {
        let mut segments = Vec::new();
        loop {
            if self.matches(&Token::Dot) {
                let field = self.expect_ident("property name")?;
                segments.push(PathSegment::Field(field));
            } else if self.matches(&Token::LBracket) {
                let position = self.current().position;
                match self.current().token.clone() {
                    Token::Str(field) => segments.push(PathSegment::Field(field)),
                    Token::Number(JsonValue::Number(n)) => {
                        let index = n
                            .as_u64()
                            .and_then(|i| usize::try_from(i).ok())
                            .ok_or_else(|| QueryError::InvalidNumber {
                                literal: n.to_string(),
                                position,
                            })?;
                        segments.push(PathSegment::Index(index));
                    }
                    _ => return Err(self.unexpected("property name or array index")),
                }
                self.advance();
                self.expect(Token::RBracket, "]")?;
            } else {
                break;
            }
        }
        Ok(Expr::Path(segments))
    }

    fn at_count(&self) -> bool {
        matches!(&self.current().token, Token::Ident(name) if name.eq_ignore_ascii_case("COUNT"))
            && matches!(self.peek_token(), Some(Token::LParen))
    }

    fn expect_keyword(&mut self, keyword: &'static str) -> Result<(), QueryError> {
        if self.matches_keyword(keyword) {
            Ok(())
        } else {
            Err(self.unexpected(keyword))
        }
    }

    fn matches_keyword(&mut self, keyword: &str) -> bool {
        if matches!(&self.current().token, Token::Ident(name) if name.eq_ignore_ascii_case(keyword)) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_ident(&mut self, expected: &'static str) -> Result<String, QueryError> {
        match self.current().token.clone() {
            Token::Ident(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    fn expect(&mut self, token: Token, expected: &'static str) -> Result<(), QueryError> {
        if self.matches(&token) {
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_eof(&self) -> Result<(), QueryError> {
        if matches!(self.current().token, Token::Eof) {
            Ok(())
        } else {
            Err(self.unexpected("end of input"))
        }
    }

    fn matches(&mut self, token: &Token) -> bool {
        if std::mem::discriminant(&self.current().token) == std::mem::discriminant(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn unexpected(&self, expected: &'static str) -> QueryError {
        QueryError::UnexpectedToken {
            expected,
            found: self.current().token.describe(),
            position: self.current().position,
        }
    }

    fn current(&self) -> &SpannedToken {
        &self.tokens[self.index.min(self.tokens.len() - 1)]
    }

    fn peek_token(&self) -> Option<&Token> {
        self.tokens.get(self.index + 1).map(|t| &t.token)
    }

    fn advance(&mut self) {
        if self.index < self.tokens.len() - 1 {
            self.index += 1;
        }
    }
}

fn find_from_alias(tokens: &[SpannedToken]) -> Option<String> {
    tokens.windows(3).find_map(|window| match (&window[0].token, &window[1].token, &window[2].token) {
        (prev, Token::Ident(kw), Token::Ident(alias))
            if kw.eq_ignore_ascii_case("FROM") && !matches!(prev, Token::Dot) =>
        {
            Some(alias.clone())
        }
        _ => None,
    })
}

fn keyword_literal(name: &str) -> Option<JsonValue> {
    match name.to_ascii_lowercase().as_str() {
        "true" => Some(JsonValue::Bool(true)),
        "false" => Some(JsonValue::Bool(false)),
        "null" => Some(JsonValue::Null),
        _ => None,
    }
}

fn last_segment(expr: &Expr) -> Option<&PathSegment> {
    match expr {
        Expr::Path(segments) => segments.last(),
        _ => None,
    }
}
