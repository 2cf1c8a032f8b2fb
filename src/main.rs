// Rolling digest: the last HOURS of every configured channel.
// Run with: cargo run --bin sift

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
    prompt::DAILY_BRIEF,
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
        Ok(report) if report.is_success() => ExitCode::SUCCESS,
        Ok(report) => {
            error!(failed = report.failed(), "Some digests were not delivered");
            ExitCode::FAILURE
        }
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<RunReport> {
    let cfg = Config::from_env()?;
    let summarizer = GeminiSummarizer::new(&cfg, DAILY_BRIEF)?;
    let source = DiscordSource::new(&cfg);
    let distributors = distributors_from_config(&cfg);

    info!(channels = cfg.channel_ids.len(), "Starting rolling digest");
    let orchestrator = Orchestrator::new(&cfg, &source, &summarizer, &distributors);
    Ok(orchestrator.run_rolling(Utc::now()).await)
}
