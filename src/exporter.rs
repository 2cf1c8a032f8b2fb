use std::time::Duration;
use tracing::{debug, info};
use crate::{
    config::PAGE_SIZE,
    error::Result,
    metrics::{MESSAGES_EXPORTED, PAGES_FETCHED},
    schema::{ChannelMessage, Window},
    sequencer::sequence,
    snowflake::to_cursor,
    source::MessageSource,
};

/// Accumulated pages for one window, before sequencing.
#[derive(Debug, Default)]
pub struct RawExport {
    pub messages: Vec<ChannelMessage>,
    pub pages_fetched: usize,
    /// Cursor after the last page, i.e. the highest raw id seen.
    pub cursor: u64,
}

/// Pages one channel forward from a window's start until the window's end
/// or the end of the stream.
pub struct WindowExporter<'a> {
    source: &'a dyn MessageSource,
    channel_id: u64,
    page_size: u8,
    page_delay: Duration,
}

impl<'a> WindowExporter<'a> {
    pub fn new(source: &'a dyn MessageSource, channel_id: u64, page_delay: Duration) -> Self {
        Self {
            source,
            channel_id,
            page_size: PAGE_SIZE,
            page_delay,
        }
    }

    pub fn with_page_size(mut self, page_size: u8) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Ordered, de-duplicated messages with id in `[to_cursor(start), to_cursor(end))`.
    pub async fn export_window(&self, window: &Window) -> Result<Vec<ChannelMessage>> {
        let raw = self.export_raw(window).await?;
        let messages = sequence(raw.messages);
        MESSAGES_EXPORTED.inc_by(messages.len() as f64);
        Ok(messages)
    }

    pub async fn export_raw(&self, window: &Window) -> Result<RawExport> {
        let end_id = to_cursor(window.end);
        // `after` is exclusive; step back one so an id equal to the start cursor counts.
        let mut export = RawExport {
            cursor: to_cursor(window.start).saturating_sub(1),
            ..RawExport::default()
        };

        loop {
            let page = self
                .source
                .fetch_after(self.channel_id, export.cursor, self.page_size)
                .await?;
            export.pages_fetched += 1;
            PAGES_FETCHED.inc();

            let raw_len = page.len();
            // Advance on the raw page so a page lying entirely past the window
            // still moves the cursor.
            let Some(page_max) = page.iter().map(|m| m.id).max() else {
                debug!(channel_id = self.channel_id, "Stream exhausted");
                break;
            };
            export.cursor = export.cursor.max(page_max);

            let mut in_window: Vec<ChannelMessage> =
                page.into_iter().filter(|m| m.id < end_id).collect();
            if in_window.is_empty() {
                debug!(channel_id = self.channel_id, cursor = export.cursor, "Crossed window boundary");
                break;
            }
            in_window.sort_by_key(|m| m.id);
            export.messages.extend(in_window);

            info!(
                channel_id = self.channel_id,
                page = export.pages_fetched,
                total = export.messages.len(),
                "Page {}: {} messages", export.pages_fetched, export.messages.len()
            );

            if raw_len < usize::from(self.page_size) {
                break;
            }
            if !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }
        }

        Ok(export)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::Mutex;
    use crate::{error::DigestError, snowflake::instant_of};

    /// Serves fixed pages in order, recording every cursor it is asked for.
    struct ScriptedSource {
        pages: Mutex<Vec<Vec<u64>>>,
        cursors: Mutex<Vec<u64>>,
    }

    impl ScriptedSource {
        fn new(pages: Vec<Vec<u64>>) -> Self {
            Self {
                pages: Mutex::new(pages.into_iter().rev().collect()),
                cursors: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl MessageSource for ScriptedSource {
        async fn fetch_after(&self, _channel_id: u64, cursor: u64, _limit: u8) -> Result<Vec<ChannelMessage>> {
            self.cursors.lock().unwrap().push(cursor);
            let ids = self.pages.lock().unwrap().pop().unwrap_or_default();
            Ok(ids.into_iter().map(stub).collect())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl MessageSource for FailingSource {
        async fn fetch_after(&self, _channel_id: u64, _cursor: u64, _limit: u8) -> Result<Vec<ChannelMessage>> {
            Err(DigestError::Api { service: "discord", status: 502, body: "bad gateway".into() })
        }
    }

    fn stub(id: u64) -> ChannelMessage {
        ChannelMessage {
            id,
            author: "ada".into(),
            timestamp: instant_of(id).to_rfc3339(),
            content: format!("message {id}"),
            attachments: vec![],
        }
    }

    /// Window whose cursor bounds are exactly `[0, end_id)` in id space.
    fn window_below(end_id: u64) -> Window {
        Window::new(instant_of(0), instant_of(end_id))
    }

    #[tokio::test]
    async fn boundary_page_advances_cursor_and_stops() {
        let end = to_cursor(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap());
        let start = to_cursor(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let source = ScriptedSource::new(vec![vec![end + 5, end, end + 9]]);
        let exporter = WindowExporter::new(&source, 1, Duration::ZERO).with_page_size(3);

        let raw = exporter
            .export_raw(&Window::new(instant_of(start), instant_of(end)))
            .await
            .unwrap();

        assert!(raw.messages.is_empty());
        assert_eq!(raw.pages_fetched, 1);
        assert_eq!(raw.cursor, end + 9);
    }

    #[tokio::test]
    async fn cursor_follows_raw_page_maximum() {
        let end_id = 1u64 << 30;
        let source = ScriptedSource::new(vec![vec![30, 10, 20], vec![end_id + 1, 40, 50]]);
        let exporter = WindowExporter::new(&source, 1, Duration::ZERO).with_page_size(3);

        let raw = exporter.export_raw(&window_below(end_id)).await.unwrap();

        let ids: Vec<u64> = raw.messages.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![10, 20, 30, 40, 50]);
        assert_eq!(raw.cursor, end_id + 1);
        assert_eq!(*source.cursors.lock().unwrap(), vec![0, 30, end_id + 1]);
    }

    #[tokio::test]
    async fn empty_stream_is_not_an_error() {
        let source = ScriptedSource::new(vec![]);
        let exporter = WindowExporter::new(&source, 1, Duration::ZERO);

        let messages = exporter.export_window(&window_below(1 << 30)).await.unwrap();
        assert!(messages.is_empty());
    }

    #[tokio::test]
    async fn fetch_failure_propagates() {
        let exporter = WindowExporter::new(&FailingSource, 1, Duration::ZERO);
        let err = exporter.export_window(&window_below(1 << 30)).await.unwrap_err();
        assert!(matches!(err, DigestError::Api { status: 502, .. }));
    }

    #[tokio::test]
    async fn repeated_boundary_message_appears_once() {
        // The second page re-serves id 42 at the cursor boundary.
        let source = ScriptedSource::new(vec![vec![40, 42, 41], vec![42, 44, 43], vec![]]);
        let exporter = WindowExporter::new(&source, 1, Duration::ZERO).with_page_size(3);

        let messages = exporter.export_window(&window_below(1 << 30)).await.unwrap();
        let ids: Vec<u64> = messages.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![40, 41, 42, 43, 44]);
    }
}
