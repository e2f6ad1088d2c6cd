//! Task Pipeline - Main Entry Point
//!
//! Runs the producer/consumer/observer pipeline once and prints the final
//! statistics. The actual implementation is in the `task_pipeline` library.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use task_pipeline::formatting::format_statistics;
use task_pipeline::pipeline::ProducerSettings;
use task_pipeline::{Orchestrator, PipelineConfig, Storage, StorageFormat, Store, TaskList};

/// Concurrent task/note pipeline: producer → channel → consumer → store ← observer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of entities to generate
    #[arg(long)]
    count: Option<usize>,

    /// Directory for persisted tasks and notes (in-memory only when omitted)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Preferred storage format: json or csv
    #[arg(long)]
    format: Option<StorageFormat>,

    /// Observer polling interval in milliseconds
    #[arg(long)]
    poll_interval_ms: Option<u64>,

    /// Grace window after Ctrl-C, in milliseconds
    #[arg(long)]
    shutdown_timeout_ms: Option<u64>,

    /// Seed for the producer's random generator
    #[arg(long)]
    seed: Option<u64>,
}

impl Args {
    fn into_config(self) -> Result<(PipelineConfig, Option<u64>)> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::load(path)?,
            None => PipelineConfig::default(),
        };
        if let Some(count) = self.count {
            config.item_count = count;
        }
        if let Some(dir) = self.data_dir {
            config.data_dir = Some(dir);
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        if let Some(ms) = self.poll_interval_ms {
            config.poll_interval_ms = ms;
        }
        if let Some(ms) = self.shutdown_timeout_ms {
            config.shutdown_timeout_ms = ms;
        }
        config.validate()?;
        Ok((config, self.seed))
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("task_pipeline=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed
async fn termination_requested() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::warn!("interrupt received"),
        Err(e) => {
            tracing::warn!(error = %e, "cannot listen for Ctrl-C; running to completion");
            std::future::pending::<()>().await;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let (config, seed) = Args::parse().into_config()?;

    let store = Arc::new(match &config.data_dir {
        Some(dir) => Store::open(Storage::new(dir, config.format)),
        None => Store::new(),
    });

    let (min_delay, max_delay) = config.delay_range();
    let settings = ProducerSettings {
        count: config.item_count,
        min_delay,
        max_delay,
        seed,
        ..Default::default()
    };

    let summary = Orchestrator::new(config, Arc::clone(&store))
        .with_producer_settings(settings)
        .run(termination_requested())
        .await?;

    let tasks: TaskList = store.tasks().into_iter().collect();
    println!();
    print!("{}", format_statistics(&tasks, summary.note_count));

    if let Some(err) = summary.timeout_error() {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
    Ok(())
}
