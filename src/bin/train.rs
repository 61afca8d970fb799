use std::path::PathBuf;

use antojo_api::services::{
    catalog::ProductCatalog,
    forest::ForestParams,
    training::{read_sales_file, train},
};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Fits the recommendation model on historical sales and writes the model artifact
#[derive(Debug, Parser)]
#[command(name = "train")]
struct Args {
    /// Sales CSV with tipo_producto_general, tipo_antojo, base, tipo_sabor, weather, product_id
    #[arg(long, default_value = "data/sales_data.csv")]
    data: PathBuf,

    /// Where to write the model artifact
    #[arg(long, default_value = "model/model.json")]
    out: PathBuf,

    /// Number of trees in the forest
    #[arg(long, default_value_t = 100)]
    trees: usize,

    /// Seed for bootstrap sampling and column selection
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Catalog to check predicted labels against; the embedded catalog when omitted
    #[arg(long)]
    catalog: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let examples = read_sales_file(&args.data)?;
    tracing::info!(rows = examples.len(), data = %args.data.display(), "Loaded sales data");

    let params = ForestParams {
        n_trees: args.trees,
        seed: args.seed,
        ..ForestParams::default()
    };
    let artifact = train(&examples, &params)?;

    // Labels the catalog cannot resolve would surface as 404s at serving time
    let catalog = ProductCatalog::load_or_embedded(args.catalog.as_deref())?;
    let unknown: Vec<&str> = artifact
        .classes
        .iter()
        .filter(|id| !catalog.contains(id))
        .map(|id| id.as_str())
        .collect();
    if !unknown.is_empty() {
        tracing::warn!(
            count = unknown.len(),
            products = ?unknown,
            "Trained labels missing from the catalog"
        );
    }

    artifact.save(&args.out)?;
    tracing::info!(out = %args.out.display(), "Model artifact written");

    Ok(())
}
