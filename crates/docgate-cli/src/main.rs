//! Docgate CLI main entry point

use clap::Parser;
use docgate_cli::{
    cli::{Cli, Commands},
    commands::{InitCommand, InvokeCommand, MigrateCategoriesCommand, SeedCommand, ToolsCommand},
    error::CliResult,
    utils::{init_tracing, load_config, ColoredOutput},
};
use docgate_mcp::open_store;
use tracing::info;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", ColoredOutput::error("Error:"), e);
            1
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> CliResult<i32> {
    let cli = Cli::parse();

    init_tracing(cli.verbose)?;

    if cli.no_color {
        colored::control::set_override(false);
    }

    info!("Docgate CLI v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(cli.config.as_deref(), cli.store.as_deref())?;

    match cli.command {
        Commands::Serve { args } => docgate_cli::commands::serve::execute(args, &config).await?,

        Commands::Tools { format } => ToolsCommand::run(format)?,

        Commands::Invoke { tool, pairs, json_args, format } => {
            let result =
                InvokeCommand::run(&config, &tool, &pairs, json_args.as_deref(), format).await?;
            if !result.is_success() {
                return Ok(1);
            }
        }

        Commands::Init { database, container, partition_key } => {
            let store = open_store(&config.store).await?;
            InitCommand::run(store.as_ref(), &database, &container, &partition_key).await?
        }

        Commands::Seed { database, container } => {
            let store = open_store(&config.store).await?;
            let report = SeedCommand::run(store.as_ref(), &database, &container).await?;
            if !report.failed.is_empty() {
                return Ok(1);
            }
        }

        Commands::MigrateCategories { database, container, dry_run } => {
            let store = open_store(&config.store).await?;
            MigrateCategoriesCommand::run(store.as_ref(), &database, &container, dry_run).await?;
        }
    }

    Ok(0)
}
