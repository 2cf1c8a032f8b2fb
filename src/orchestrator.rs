use std::time::Duration;
use chrono::{DateTime, Utc};
use tracing::{error, info, warn};
use crate::{
    artifacts::{digest_document, ArtifactWriter},
    config::Config,
    delivery::Distributor,
    error::{DigestError, Result},
    exporter::WindowExporter,
    gemini::Summarizer,
    metrics::{DELIVERY_FAILURES, DIGESTS_DELIVERED, WINDOWS_SKIPPED},
    schema::Window,
    source::MessageSource,
    transcript::Transcript,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// One window ending now; the summarization call gets one retry.
    Rolling,
    /// Consecutive daily windows, oldest first, transcripts kept on disk.
    Backfill,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowOutcome {
    Delivered { channel_id: u64, date: String, message_count: usize },
    Skipped { channel_id: u64, date: String },
    Failed { channel_id: u64, date: String, reason: String },
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub outcomes: Vec<WindowOutcome>,
}

impl RunReport {
    pub fn delivered(&self) -> usize {
        self.count(|o| matches!(o, WindowOutcome::Delivered { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, WindowOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, WindowOutcome::Failed { .. }))
    }

    /// False when any window failed to export, summarize, or deliver.
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    fn count(&self, pred: impl Fn(&WindowOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o)).count()
    }
}

/// Drives export, summarization and delivery over every configured channel
/// and window, one at a time.
pub struct Orchestrator<'a> {
    cfg: &'a Config,
    source: &'a dyn MessageSource,
    summarizer: &'a dyn Summarizer,
    distributors: &'a [Box<dyn Distributor>],
    artifacts: ArtifactWriter,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        cfg: &'a Config,
        source: &'a dyn MessageSource,
        summarizer: &'a dyn Summarizer,
        distributors: &'a [Box<dyn Distributor>],
    ) -> Self {
        Self {
            cfg,
            source,
            summarizer,
            distributors,
            artifacts: ArtifactWriter::new(&cfg.output_dir, cfg.channel_ids.len() > 1),
        }
    }

    pub async fn run_rolling(&self, now: DateTime<Utc>) -> RunReport {
        let window = Window::rolling(now, self.cfg.hours);
        info!(hours = self.cfg.hours, "Fetching messages since {}", window.start.format("%Y-%m-%d %H:%M UTC"));
        self.run(Mode::Rolling, &[window]).await
    }

    pub async fn run_backfill(&self, now: DateTime<Utc>) -> RunReport {
        info!(days = self.cfg.backfill_days, "Backfilling daily digests");
        self.run(Mode::Backfill, &Window::daily(now, self.cfg.backfill_days)).await
    }

    pub async fn run(&self, mode: Mode, windows: &[Window]) -> RunReport {
        let mut report = RunReport::default();
        let mut first = true;

        for &channel_id in &self.cfg.channel_ids {
            info!(channel_id, url = %self.cfg.channel_url(channel_id), "Channel {}", channel_id);

            for window in windows {
                if !first {
                    pause(self.cfg.pacing.between_windows).await;
                }
                first = false;

                let outcome = self.process_window(mode, channel_id, window).await;
                report.outcomes.push(outcome);
            }
        }

        info!(
            delivered = report.delivered(),
            skipped = report.skipped(),
            failed = report.failed(),
            "Run complete"
        );
        report
    }

    async fn process_window(&self, mode: Mode, channel_id: u64, window: &Window) -> WindowOutcome {
        let date = match mode {
            Mode::Rolling => window.end.format("%Y-%m-%d").to_string(),
            Mode::Backfill => window.date_label(),
        };
        info!(channel_id, date = %date, "Window {} .. {}", window.start.format("%Y-%m-%d %H:%M"), window.end.format("%Y-%m-%d %H:%M"));

        let exporter = WindowExporter::new(self.source, channel_id, self.cfg.pacing.between_pages);
        let messages = match exporter.export_window(window).await {
            Ok(messages) => messages,
            Err(err) => {
                error!(channel_id, date = %date, error = %err, "Export failed, abandoning window");
                return WindowOutcome::Failed { channel_id, date, reason: err.to_string() };
            }
        };

        if messages.is_empty() {
            info!(channel_id, date = %date, "No messages. Skipping.");
            WINDOWS_SKIPPED.inc();
            return WindowOutcome::Skipped { channel_id, date };
        }

        let transcript = Transcript::new(channel_id, messages);
        info!(
            channel_id,
            messages = transcript.message_count(),
            chars = transcript.text.len(),
            "{} messages, {} chars", transcript.message_count(), transcript.text.len()
        );

        match self.digest(mode, &transcript, &date).await {
            Ok(()) => {
                DIGESTS_DELIVERED.inc();
                WindowOutcome::Delivered { channel_id, date, message_count: transcript.message_count() }
            }
            Err(err) => {
                error!(channel_id, date = %date, error = %err, "Digest failed");
                WindowOutcome::Failed { channel_id, date, reason: err.to_string() }
            }
        }
    }

    async fn digest(&self, mode: Mode, transcript: &Transcript, date: &str) -> Result<()> {
        let count = transcript.message_count();
        let title = format!("{} Signal Digest, {}", self.cfg.source_label, date);

        if mode == Mode::Backfill {
            self.artifacts.write_transcript(date, transcript.channel_id, &transcript.text)?;
        }

        info!("Summarizing {} messages", count);
        let analysis = match mode {
            Mode::Rolling => self.summarize_with_retry(transcript, date).await?,
            Mode::Backfill => self.summarizer.summarize(&transcript.text, date, count).await?,
        };

        if mode == Mode::Backfill {
            let document = digest_document(&title, count, &analysis);
            self.artifacts.write_digest(date, transcript.channel_id, &document)?;
        }

        let subject = format!("{title} ({count} msgs)");
        // Saved before delivery so a failing distributor never loses the analysis.
        if mode == Mode::Rolling && self.cfg.write_local_digest {
            let document = format!("# {subject}\n\n{analysis}");
            self.artifacts.write_rolling_digest(transcript.channel_id, &document)?;
        }

        self.distribute(&subject, &analysis).await
    }

    async fn summarize_with_retry(&self, transcript: &Transcript, date: &str) -> Result<String> {
        let count = transcript.message_count();
        match self.summarizer.summarize(&transcript.text, date, count).await {
            Ok(analysis) => Ok(analysis),
            Err(err) => {
                let cooldown = self.cfg.pacing.retry_cooldown;
                warn!(error = %err, "Summarizer error. Waiting {}s before retrying", cooldown.as_secs());
                pause(cooldown).await;
                self.summarizer.summarize(&transcript.text, date, count).await
            }
        }
    }

    /// Hands the digest to every distributor; one failing does not stop the rest.
    async fn distribute(&self, subject: &str, body: &str) -> Result<()> {
        let mut failed = Vec::new();
        for distributor in self.distributors {
            if let Err(err) = distributor.deliver(subject, body).await {
                DELIVERY_FAILURES.inc();
                error!(distributor = distributor.name(), error = %err, "Delivery failed");
                failed.push(distributor.name());
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(DigestError::Delivery(failed.join(", ")))
        }
    }
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}
