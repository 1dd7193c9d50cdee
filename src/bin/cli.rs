//! Storefront crawler CLI
//!
//! Local execution entry point.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use storefront_crawler::{
    error::{AppError, Result},
    models::{Config, ProductRecord},
    pipeline::{self, CatalogMerger, CatalogStructurer},
    storage::{CatalogStorage, LocalStorage},
};

/// Storefront catalog crawler
#[derive(Parser, Debug)]
#[command(
    name = "storefront-crawler",
    version,
    about = "Extracts product catalogs from storefront listing pages"
)]
struct Cli {
    /// Path to the storage directory for catalogs and configuration
    #[arg(short, long, default_value = "data")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl listing targets into per-target catalogs
    Crawl {
        /// Crawl only the named target (default: all configured targets)
        #[arg(long)]
        target: Option<String>,
    },

    /// Merge per-target catalogs into one branded list
    Merge,

    /// Split the merged catalog into per-category documents
    Structure {
        /// Merged catalog file name (default: the configured merge output)
        #[arg(long)]
        input: Option<String>,
    },

    /// Validate configuration
    Validate,

    /// Show current storage state
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("storefront-crawler starting...");

    let config_path = cli.storage_dir.join("config.toml");
    let config = Config::load_or_default(&config_path);
    let storage = LocalStorage::new(&cli.storage_dir);

    match cli.command {
        Command::Crawl { target } => {
            config.validate()?;

            let stats = pipeline::run_crawler(&config, &storage, target.as_deref()).await?;
            for target_stats in &stats.targets {
                log::info!(
                    "{}: {} pages visited, {} unique products",
                    target_stats.target,
                    target_stats.pages_visited,
                    target_stats.unique_count
                );
            }
            log::info!("Crawl complete!");
        }

        Command::Merge => {
            let mut catalogs: Vec<Vec<ProductRecord>> = Vec::new();
            for target in &config.targets {
                match storage.read_catalog(&target.output_file).await? {
                    Some(catalog) => {
                        log::info!("{}: {} products loaded", target.name, catalog.len());
                        catalogs.push(catalog);
                    }
                    None => log::warn!(
                        "{}: catalog {} not found, skipping",
                        target.name,
                        target.output_file
                    ),
                }
            }

            if catalogs.is_empty() {
                return Err(AppError::config("No catalogs found. Run 'crawl' first."));
            }

            let merged = CatalogMerger::new(config.merge.clone()).merge(&catalogs);
            let summary = storage
                .write_merged(&config.merge.output_file, &merged)
                .await?;
            log::info!("Wrote {} merged products to {}", summary.count, summary.location);
        }

        Command::Structure { input } => {
            let input = input.unwrap_or_else(|| config.merge.output_file.clone());
            let Some(merged) = storage.read_merged(&input).await? else {
                return Err(AppError::config(format!(
                    "Merged catalog not found at {input}. Run 'merge' first."
                )));
            };

            let groups = CatalogStructurer::new(config.prices.clone()).structure(&merged);
            for group in &groups {
                let rel_path = format!("structured_by_type/{}", group.file_name());
                storage
                    .write_document(&rel_path, &serde_json::to_value(group)?)
                    .await?;
                log::info!(
                    "{}: {} products -> {}",
                    group.material_type,
                    group.total_products,
                    rel_path
                );
            }
            log::info!("Structured {} categories", groups.len());
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!(
                "✓ Config OK ({} targets, {} brand rules)",
                config.targets.len(),
                config.merge.brand_rules.len()
            );
        }

        Command::Info => {
            log::info!("Storage directory: {}", cli.storage_dir.display());

            for target in &config.targets {
                match storage.read_catalog(&target.output_file).await? {
                    Some(catalog) => log::info!(
                        "{}: {} products in {}",
                        target.name,
                        catalog.len(),
                        target.output_file
                    ),
                    None => log::info!("{}: no catalog yet", target.name),
                }
            }

            match storage.read_merged(&config.merge.output_file).await? {
                Some(merged) => log::info!("merged: {} products", merged.len()),
                None => log::info!("merged: not generated yet"),
            }
        }
    }

    log::info!("Done!");

    Ok(())
}
