pub mod init;
pub mod invoke;
pub mod migrate_categories;
pub mod seed;
pub mod serve;
pub mod tools;

// Re-export command handlers
pub use init::InitCommand;
pub use invoke::InvokeCommand;
pub use migrate_categories::{CategoryChange, MigrateCategoriesCommand};
pub use seed::{SeedCommand, SeedReport};
pub use serve::ServeArgs;
pub use tools::ToolsCommand;
