use std::fmt;

use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Kind of store resource named in a not-found outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Database,
    Container,
    Item,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ResourceKind::Database => "Database",
            ResourceKind::Container => "Container",
            ResourceKind::Item => "Item",
        };
        f.write_str(label)
    }
}

/// Tagged outcome of a failed store call.
///
/// Every `DocumentStore` operation reports failures through this enum so callers
/// can match on the kind instead of inspecting messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{kind} '{id}' not found")]
    NotFound { kind: ResourceKind, id: String },
    #[error("Query error: {0}")]
    Query(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("{0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found(kind: ResourceKind, id: impl Into<String>) -> Self {
        StoreError::NotFound { kind, id: id.into() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}
