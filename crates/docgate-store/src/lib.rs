pub mod error;
pub mod memory;

#[cfg(feature = "sqlite")]
pub mod sql_store;

// Re-export commonly used types
pub use error::{BackendError, BackendResult};
pub use memory::MemoryDocumentStore;

#[cfg(feature = "sqlite")]
pub use sql_store::SqlDocumentStore;
