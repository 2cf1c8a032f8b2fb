// Backfill: one digest per day for the last DAYS days, oldest first.
// Run with: cargo run --bin backfill

use std::process::ExitCode;
use chrono::Utc;
use dotenv::dotenv;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;
use sift::{
    config::Config,
    delivery::distributors_from_config,
    error::Result,
    gemini::GeminiSummarizer,
    metrics::MetricsRegistry,
    orchestrator::{Orchestrator, RunReport},
    prompt::SIGNAL_DIGEST,
    source::DiscordSource,
};

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let metrics = MetricsRegistry::new();
    let outcome = run().await;
    debug!("{}", metrics.gather_metrics());

    match outcome {
        Ok(report) => {
            info!(
                delivered = report.delivered(),
                skipped = report.skipped(),
                failed = report.failed(),
                "Backfill done"
            );
            if report.is_success() { ExitCode::SUCCESS } else { ExitCode::FAILURE }
        }
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<RunReport> {
    let cfg = Config::from_env()?;
    let summarizer = GeminiSummarizer::new(&cfg, SIGNAL_DIGEST)?;
    let source = DiscordSource::new(&cfg);
    let distributors = distributors_from_config(&cfg);

    info!(days = cfg.backfill_days, dir = %cfg.output_dir.display(), "Starting backfill");
    let orchestrator = Orchestrator::new(&cfg, &source, &summarizer, &distributors);
    Ok(orchestrator.run_backfill(Utc::now()).await)
}
