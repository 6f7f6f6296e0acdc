//! Database and container provisioning command

use docgate_core::{DocumentStore, PartitionKeyPath};
use tracing::info;

use crate::{error::CliResult, utils::ColoredOutput};

pub struct InitCommand;

impl InitCommand {
    pub async fn run(
        store: &dyn DocumentStore,
        database: &str,
        container: &str,
        partition_key: &str,
    ) -> CliResult<()> {
        let partition_key_path = PartitionKeyPath::new(partition_key)?;

        info!("Provisioning {}/{}", database, container);
        store.create_database(database).await?;
        store.create_container(database, container, &partition_key_path).await?;

        println!(
            "{} {}/{} (partition key {})",
            ColoredOutput::success("✓ Ready:"),
            ColoredOutput::highlight(database),
            ColoredOutput::highlight(container),
            partition_key_path
        );
        Ok(())
    }
}
