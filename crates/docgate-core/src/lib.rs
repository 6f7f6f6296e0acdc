pub mod error;
pub mod query;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use error::{ResourceKind, StoreError, StoreResult};
pub use query::Query;
pub use store::DocumentStore;
pub use types::{item_id, stamp_system_properties, PartitionKey, PartitionKeyPath, StoreItem};
