//! Document query language
//!
//! A subset of the document store's SQL dialect, enough for ad-hoc lookups
//! issued through the `query_items` tool:
//!
//! ```text
//! SELECT [TOP n] [VALUE] projection FROM alias [WHERE expr] [ORDER BY expr [ASC|DESC]]
//! ```
//!
//! Parsing is done once per call; evaluation walks the container's items in
//! storage order.

mod eval;
mod lexer;
mod parser;

use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::error::StoreError;
use crate::types::StoreItem;

/// Errors produced while lexing or parsing query text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("query text is empty")]
    EmptyInput,
    #[error("expected {expected}, found '{found}' at position {position}")]
    UnexpectedToken {
        expected: &'static str,
        found: String,
        position: usize,
    },
    #[error("unterminated string literal starting at position {position}")]
    UnterminatedString { position: usize },
    #[error("invalid number '{literal}' at position {position}")]
    InvalidNumber { literal: String, position: usize },
    #[error("identifier '{name}' could not be resolved at position {position}")]
    UnknownIdentifier { name: String, position: usize },
    #[error("unknown function '{name}' at position {position}")]
    UnknownFunction { name: String, position: usize },
    #[error("function '{name}' expects {expected} argument(s), got {found}")]
    Arity {
        name: &'static str,
        expected: &'static str,
        found: usize,
    },
    #[error("COUNT must be the only projection")]
    MisplacedCount,
}

impl From<QueryError> for StoreError {
    fn from(err: QueryError) -> Self {
        StoreError::Query(err.to_string())
    }
}

/// Parsed query
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub top: Option<usize>,
    pub selection: Selection,
    pub alias: String,
    pub filter: Option<Expr>,
    pub order_by: Option<OrderBy>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// `SELECT *`
    All,
    /// `SELECT VALUE expr`
    Value(Expr),
    /// `SELECT [VALUE] COUNT(expr)`
    Count { expr: Expr, value: bool },
    /// `SELECT expr [AS name], ...`
    Fields(Vec<Projection>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub expr: Expr,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub expr: Expr,
    pub descending: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Lower,
    Upper,
    Contains,
    StartsWith,
    EndsWith,
    IsDefined,
    Length,
}

impl Function {
    pub(crate) fn lookup(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "LOWER" => Some(Function::Lower),
            "UPPER" => Some(Function::Upper),
            "CONTAINS" => Some(Function::Contains),
            "STARTSWITH" => Some(Function::StartsWith),
            "ENDSWITH" => Some(Function::EndsWith),
            "IS_DEFINED" => Some(Function::IsDefined),
            "LENGTH" => Some(Function::Length),
            _ => None,
        }
    }

    pub(crate) fn name(&self) -> &'static str {
        match self {
            Function::Lower => "LOWER",
            Function::Upper => "UPPER",
            Function::Contains => "CONTAINS",
            Function::StartsWith => "STARTSWITH",
            Function::EndsWith => "ENDSWITH",
            Function::IsDefined => "IS_DEFINED",
            Function::Length => "LENGTH",
        }
    }

    /// Accepted argument counts (inclusive)
    pub(crate) fn arity(&self) -> (usize, usize, &'static str) {
        match self {
            Function::Lower | Function::Upper | Function::IsDefined | Function::Length => {
                (1, 1, "1")
            }
            Function::Contains | Function::StartsWith | Function::EndsWith => (2, 3, "2 or 3"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(JsonValue),
    /// Property path relative to the FROM alias; empty means the whole item
    Path(Vec<PathSegment>),
    Compare {
        op: CompareOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Not(Box<Expr>),
    Call { function: Function, args: Vec<Expr> },
}

impl Query {
    /// Parse query text
    pub fn parse(sql: &str) -> Result<Self, QueryError> {
        let tokens = lexer::Lexer::new(sql).lex()?;
        parser::Parser::new(tokens).parse_query()
    }

    /// Evaluate against items in storage order
    pub fn execute<'a, I>(&self, items: I) -> Vec<JsonValue>
    where
        I: IntoIterator<Item = &'a StoreItem>,
    {
        eval::execute(self, items)
    }
}

#[cfg(test)]
mod tests;
