#![allow(dead_code)]

use std::collections::HashMap;
use std::ops::Range;
use std::sync::{Arc, Mutex};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sift::{
    config::{Config, Pacing},
    delivery::Distributor,
    error::{DigestError, Result},
    gemini::Summarizer,
    schema::ChannelMessage,
    snowflake::{instant_of, to_cursor},
    source::MessageSource,
};

/// Config with credentials filled in, no pacing, artifacts under `output_dir`.
pub fn test_config(output_dir: &std::path::Path, extra: &[(&str, &str)]) -> Config {
    let dir = output_dir.display().to_string();
    let mut vars: HashMap<&str, &str> = [
        ("DISCORD_TOKEN", "token"),
        ("GEMINI_API_KEY", "key"),
        ("CHANNEL_IDS", "1"),
        ("SOURCE_LABEL", "Test #general"),
    ]
    .into_iter()
    .collect();
    vars.insert("OUTPUT_DIR", &dir);
    vars.extend(extra.iter().copied());

    let mut cfg = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();
    cfg.pacing = Pacing::none();
    cfg
}

pub fn message(id: u64, author: &str, content: &str) -> ChannelMessage {
    ChannelMessage {
        id,
        author: author.into(),
        timestamp: instant_of(id).to_rfc3339(),
        content: content.into(),
        attachments: vec![],
    }
}

/// A message created at `at`; `seq` separates messages in the same millisecond.
pub fn message_at(at: DateTime<Utc>, seq: u64, content: &str) -> ChannelMessage {
    message(to_cursor(at) + seq, "ada", content)
}

/// In-memory channel history served the way the real API does: the oldest
/// `limit` messages after the cursor, in no particular order.
#[derive(Default)]
pub struct PagedSource {
    channels: HashMap<u64, Vec<ChannelMessage>>,
    failing_cursors: Vec<(u64, Range<u64>)>,
    pub fetches: Mutex<Vec<(u64, u64)>>,
}

impl PagedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_messages(mut self, channel_id: u64, mut messages: Vec<ChannelMessage>) -> Self {
        messages.sort_by_key(|m| m.id);
        self.channels.insert(channel_id, messages);
        self
    }

    /// Fetches on `channel_id` whose cursor falls in `cursors` fail.
    pub fn failing(mut self, channel_id: u64, cursors: Range<u64>) -> Self {
        self.failing_cursors.push((channel_id, cursors));
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.lock().unwrap().len()
    }
}

#[async_trait]
impl MessageSource for PagedSource {
    async fn fetch_after(&self, channel_id: u64, cursor: u64, limit: u8) -> Result<Vec<ChannelMessage>> {
        self.fetches.lock().unwrap().push((channel_id, cursor));

        let fails = self
            .failing_cursors
            .iter()
            .any(|(channel, range)| *channel == channel_id && range.contains(&cursor));
        if fails {
            return Err(DigestError::Api { service: "discord", status: 503, body: "unavailable".into() });
        }

        let mut page: Vec<ChannelMessage> = self
            .channels
            .get(&channel_id)
            .map(|history| {
                history
                    .iter()
                    .filter(|m| m.id > cursor)
                    .take(usize::from(limit))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        // Newest first, then rotate, so nothing downstream can rely on order.
        page.reverse();
        if page.len() > 2 {
            let shift = page.len() / 3;
            page.rotate_left(shift);
        }
        Ok(page)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryCall {
    pub date: String,
    pub count: usize,
    pub transcript: String,
}

/// Records every call; the first `fail_first` calls fail.
#[derive(Default)]
pub struct RecordingSummarizer {
    pub calls: Mutex<Vec<SummaryCall>>,
    pub fail_first: usize,
}

impl RecordingSummarizer {
    pub fn failing(times: usize) -> Self {
        Self { fail_first: times, ..Self::default() }
    }

    pub fn calls(&self) -> Vec<SummaryCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Summarizer for RecordingSummarizer {
    async fn summarize(&self, transcript: &str, date_label: &str, message_count: usize) -> Result<String> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(SummaryCall {
            date: date_label.to_string(),
            count: message_count,
            transcript: transcript.to_string(),
        });
        if calls.len() <= self.fail_first {
            return Err(DigestError::Api { service: "gemini", status: 429, body: "quota".into() });
        }
        Ok(format!("## TL;DR\n**{message_count} messages on {date_label}**"))
    }
}

/// Clones share one delivery log, so a test can keep a handle after boxing.
#[derive(Clone)]
pub struct RecordingDistributor {
    pub delivered: Arc<Mutex<Vec<(String, String)>>>,
    pub fail: bool,
}

impl RecordingDistributor {
    pub fn new() -> Self {
        Self { delivered: Arc::default(), fail: false }
    }

    pub fn broken() -> Self {
        Self { fail: true, ..Self::new() }
    }

    pub fn boxed(&self) -> Box<dyn Distributor> {
        Box::new(self.clone())
    }

    pub fn subjects(&self) -> Vec<String> {
        self.delivered.lock().unwrap().iter().map(|(s, _)| s.clone()).collect()
    }
}

#[async_trait]
impl Distributor for RecordingDistributor {
    fn name(&self) -> &'static str {
        if self.fail { "broken" } else { "recording" }
    }

    async fn deliver(&self, subject: &str, body: &str) -> Result<()> {
        self.delivered.lock().unwrap().push((subject.to_string(), body.to_string()));
        if self.fail {
            return Err(DigestError::Api { service: "github", status: 500, body: "boom".into() });
        }
        Ok(())
    }
}
