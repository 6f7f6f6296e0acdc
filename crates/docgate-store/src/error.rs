use docgate_core::StoreError;

/// Failures raised by a storage backend before they are folded into [`StoreError`]
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[cfg(feature = "sqlite")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl From<BackendError> for StoreError {
    fn from(err: BackendError) -> Self {
        match err {
            #[cfg(feature = "sqlite")]
            BackendError::Database(e) => match e {
                sqlx::Error::Database(db_err) => {
                    let code = db_err.code().unwrap_or_default();
                    let message = db_err.message();

                    // SQLite extended result codes: https://www.sqlite.org/rescode.html
                    match &*code {
                        "1555" | "2067" => {
                            StoreError::Conflict(format!("Unique constraint violation: {}", message))
                        }
                        "787" => StoreError::BadRequest(format!(
                            "Foreign key constraint failed: {}",
                            message
                        )),
                        "8" | "1032" => {
                            StoreError::Backend(format!("Database is read-only: {}", message))
                        }
                        _ => StoreError::Backend(format!("Database error ({}): {}", code, message)),
                    }
                }
                other => StoreError::Backend(other.to_string()),
            },
            BackendError::Serialization(e) => StoreError::Backend(format!("Serialization error: {}", e)),
            BackendError::Corrupt(msg) => StoreError::Backend(format!("Corrupt record: {}", msg)),
        }
    }
}

pub type BackendResult<T> = Result<T, BackendError>;
