pub mod migrations;
pub mod store;

pub use store::SqlDocumentStore;
