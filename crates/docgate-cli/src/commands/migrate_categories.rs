//! Lowercase category migration.
//!
//! The container is partitioned by `/category`, so changing an item's category
//! moves it to another logical partition. Each move goes through
//! [`DocumentStore::rekey_item`], which the bundled stores perform atomically.

use docgate_core::{item_id, DocumentStore, PartitionKey};
use serde_json::Value as JsonValue;
use tracing::{debug, info};

use crate::{error::CliResult, utils::ColoredOutput};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryChange {
    pub id: String,
    pub name: String,
    pub from: String,
    pub to: String,
}

pub struct MigrateCategoriesCommand;

impl MigrateCategoriesCommand {
    pub async fn run(
        store: &dyn DocumentStore,
        database: &str,
        container: &str,
        dry_run: bool,
    ) -> CliResult<Vec<CategoryChange>> {
        let items = store.read_all_items(database, container).await?;
        debug!("Scanning {} items in {}/{}", items.len(), database, container);

        let mut changes = Vec::new();
        for mut item in items {
            let Some(category) = item.get("category").and_then(JsonValue::as_str) else {
                continue;
            };
            let lowered = category.to_lowercase();
            if lowered == category {
                continue;
            }

            let change = CategoryChange {
                id: item_id(&item)?.to_string(),
                name: item.get("name").and_then(JsonValue::as_str).unwrap_or_default().to_string(),
                from: category.to_string(),
                to: lowered,
            };

            if !dry_run {
                item.insert("category".to_string(), JsonValue::String(change.to.clone()));
                store
                    .rekey_item(database, container, &change.id, &PartitionKey::new(&change.from), item)
                    .await?;
            }

            println!(
                "{} {} - '{}' -> '{}'",
                if dry_run { ColoredOutput::warning("Would update:") } else { ColoredOutput::success("Updated:") },
                change.name,
                change.from,
                change.to
            );
            changes.push(change);
        }

        println!();
        if dry_run {
            println!("{} items would be updated", changes.len());
        } else {
            info!(updated = changes.len(), "category migration finished");
            println!("Updated {} items", changes.len());
        }
        Ok(changes)
    }
}
