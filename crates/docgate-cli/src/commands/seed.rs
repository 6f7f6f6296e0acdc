//! Sample product catalog loader

use docgate_core::{DocumentStore, PartitionKeyPath, StoreItem};
use serde_json::{json, Value as JsonValue};
use tracing::{info, warn};

use crate::{error::CliResult, utils::ColoredOutput};

pub const SAMPLE_PARTITION_KEY: &str = "/category";
pub const VERIFY_QUERY: &str = "SELECT * FROM c WHERE c.category = 'Electronics'";

/// Outcome of a seed run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub inserted: Vec<String>,
    /// `(name, error)` of every product the store refused
    pub failed: Vec<(String, String)>,
    /// Result count of the verification query
    pub electronics: usize,
}

pub struct SeedCommand;

impl SeedCommand {
    pub async fn run(store: &dyn DocumentStore, database: &str, container: &str) -> CliResult<SeedReport> {
        store.create_database(database).await?;
        store
            .create_container(database, container, &PartitionKeyPath::new(SAMPLE_PARTITION_KEY)?)
            .await?;

        let products = sample_products();
        println!(
            "Inserting {} products into {}...",
            products.len(),
            ColoredOutput::highlight(&format!("{}/{}", database, container))
        );

        let mut report = SeedReport::default();
        for product in products {
            let name = product.get("name").and_then(JsonValue::as_str).unwrap_or_default().to_string();
            match store.upsert_item(database, container, product).await {
                Ok(_) => {
                    println!("  {} {}", ColoredOutput::success("✓ Inserted:"), name);
                    report.inserted.push(name);
                }
                Err(e) => {
                    warn!("Failed to insert {}: {}", name, e);
                    println!("  {} {}: {}", ColoredOutput::error("✗ Failed to insert"), name, e);
                    report.failed.push((name, e.to_string()));
                }
            }
        }
        info!(inserted = report.inserted.len(), failed = report.failed.len(), "seed finished");

        println!();
        println!("{}", ColoredOutput::info("Verifying data with a sample query..."));
        report.electronics = store.query_items(database, container, VERIFY_QUERY).await?.len();
        println!("Found {} electronics products.", report.electronics);

        Ok(report)
    }
}

/// The ten sample products
pub fn sample_products() -> Vec<StoreItem> {
    let products = json!([
        {
            "id": "1",
            "name": "Laptop Pro 15",
            "category": "Electronics",
            "price": 1299.99,
            "description": "High-performance laptop with 15-inch display",
            "inStock": true,
            "quantity": 50
        },
        {
            "id": "2",
            "name": "Wireless Mouse",
            "category": "Electronics",
            "price": 29.99,
            "description": "Ergonomic wireless mouse with long battery life",
            "inStock": true,
            "quantity": 200
        },
        {
            "id": "3",
            "name": "USB-C Hub",
            "category": "Electronics",
            "price": 49.99,
            "description": "7-in-1 USB-C hub with HDMI and SD card reader",
            "inStock": true,
            "quantity": 150
        },
        {
            "id": "4",
            "name": "Office Chair",
            "category": "Furniture",
            "price": 299.99,
            "description": "Ergonomic office chair with lumbar support",
            "inStock": true,
            "quantity": 30
        },
        {
            "id": "5",
            "name": "Standing Desk",
            "category": "Furniture",
            "price": 599.99,
            "description": "Electric height-adjustable standing desk",
            "inStock": false,
            "quantity": 0
        },
        {
            "id": "6",
            "name": "Monitor Stand",
            "category": "Furniture",
            "price": 79.99,
            "description": "Adjustable monitor stand with storage drawer",
            "inStock": true,
            "quantity": 75
        },
        {
            "id": "7",
            "name": "Mechanical Keyboard",
            "category": "Electronics",
            "price": 149.99,
            "description": "RGB mechanical keyboard with Cherry MX switches",
            "inStock": true,
            "quantity": 100
        },
        {
            "id": "8",
            "name": "Desk Lamp",
            "category": "Lighting",
            "price": 45.99,
            "description": "LED desk lamp with adjustable brightness",
            "inStock": true,
            "quantity": 120
        },
        {
            "id": "9",
            "name": "Webcam HD",
            "category": "Electronics",
            "price": 89.99,
            "description": "1080p HD webcam with built-in microphone",
            "inStock": true,
            "quantity": 80
        },
        {
            "id": "10",
            "name": "Notebook Set",
            "category": "Office Supplies",
            "price": 15.99,
            "description": "Pack of 5 lined notebooks",
            "inStock": true,
            "quantity": 500
        }
    ]);

    match products {
        JsonValue::Array(values) => values
            .into_iter()
            .filter_map(|value| match value {
                JsonValue::Object(item) => Some(item),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docgate_core::PartitionKey;
    use docgate_store::MemoryDocumentStore;
    use std::collections::HashSet;

    #[test]
    fn ten_products_with_unique_ids() {
        let products = sample_products();
        assert_eq!(products.len(), 10);
        let ids: HashSet<&str> = products.iter().filter_map(|p| p["id"].as_str()).collect();
        assert_eq!(ids.len(), 10);
        assert_eq!(products.iter().filter(|p| p["inStock"] == false).count(), 1);
    }

    #[tokio::test]
    async fn seed_inserts_and_verifies() {
        let store = MemoryDocumentStore::new();
        let report = SeedCommand::run(&store, "SampleDB", "Products").await.unwrap();

        assert_eq!(report.inserted.len(), 10);
        assert!(report.failed.is_empty());
        assert_eq!(report.electronics, 5);

        let desk = store
            .read_item("SampleDB", "Products", "5", &PartitionKey::new("Furniture"))
            .await
            .unwrap();
        assert_eq!(desk["name"], "Standing Desk");
    }

    #[tokio::test]
    async fn seeding_twice_keeps_ten_items() {
        let store = MemoryDocumentStore::new();
        SeedCommand::run(&store, "SampleDB", "Products").await.unwrap();
        SeedCommand::run(&store, "SampleDB", "Products").await.unwrap();

        let all = store.read_all_items("SampleDB", "Products").await.unwrap();
        assert_eq!(all.len(), 10);
    }
}
