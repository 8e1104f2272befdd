use cinerec::services::evaluation::{Evaluator, RelevanceSource};
use cinerec::services::store::memory::InMemoryStores;
use cinerec::{init_tracing, Config, Dataset, RecommendationEngine};
use anyhow::{anyhow, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Offline precision@k / recall@k evaluation", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Dataset JSON; falls back to `catalog.dataset_path`.
    #[arg(short, long)]
    dataset: Option<String>,

    /// `history` or `ratings`.
    #[arg(short, long, default_value = "history")]
    source: RelevanceSource,

    #[arg(short, long)]
    k: Option<usize>,

    /// Write the JSON report here instead of stdout.
    #[arg(short, long)]
    output: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    std::env::set_var("RUST_LOG", &args.log_level);
    init_tracing().await;

    let mut config = if std::path::Path::new(&args.config).exists() {
        Config::from_file(&args.config)?
    } else {
        info!("Config file not found, using default configuration");
        Config::default()
    };

    if let Some(k) = args.k {
        config.evaluation.k = k;
    }

    let dataset_path = args
        .dataset
        .or_else(|| config.catalog.dataset_path.clone())
        .ok_or_else(|| anyhow!("No dataset given: pass --dataset or set catalog.dataset_path"))?;

    let raw = std::fs::read_to_string(&dataset_path)?;
    let dataset: Dataset = serde_json::from_str(&raw)?;
    let stores = InMemoryStores::from_dataset(dataset.clone())?;

    let engine = RecommendationEngine::new(
        stores.movies,
        stores.history,
        Arc::new(config.recommendation.clone()),
    );
    let evaluator = Evaluator::new(engine, config.evaluation.clone());

    let cases = evaluator.cases_for(args.source, &dataset);
    info!("Evaluating {} candidate users from {}", cases.len(), args.source);

    let report = evaluator.evaluate(&cases, args.source).await;
    let json = serde_json::to_string_pretty(&report)?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, json)?;
            info!("Evaluation report written to {}", path);
        }
        None => println!("{}", json),
    }

    Ok(())
}
