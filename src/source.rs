use std::sync::Arc;
use async_trait::async_trait;
use serenity::{
    builder::GetMessages,
    http::Http,
    model::{channel::Message, id::{ChannelId, MessageId}},
};
use tracing::debug;
use crate::{config::Config, error::Result, metrics::DISCORD_API_DURATION, schema::ChannelMessage};

/// A paginated, append-only message stream.
///
/// `fetch_after` returns up to `limit` messages with id strictly greater than
/// `cursor`. Order within the page is unspecified.
#[async_trait]
pub trait MessageSource: Send + Sync {
    async fn fetch_after(&self, channel_id: u64, cursor: u64, limit: u8) -> Result<Vec<ChannelMessage>>;
}

pub struct DiscordSource {
    http: Arc<Http>,
}

impl DiscordSource {
    pub fn new(cfg: &Config) -> Self {
        Self {
            http: Arc::new(Http::new(&cfg.discord_token)),
        }
    }
}

#[async_trait]
impl MessageSource for DiscordSource {
    async fn fetch_after(&self, channel_id: u64, cursor: u64, limit: u8) -> Result<Vec<ChannelMessage>> {
        let _timer = DISCORD_API_DURATION.start_timer();

        // Ids are non-zero on the wire; nothing real is ever created at id 1.
        let after = MessageId::new(cursor.max(1));
        let builder = GetMessages::new().after(after).limit(limit);
        let messages = ChannelId::new(channel_id).messages(&self.http, builder).await?;

        debug!(channel_id, cursor, count = messages.len(), "Fetched raw page");
        Ok(messages.into_iter().map(to_channel_message).collect())
    }
}

fn to_channel_message(msg: Message) -> ChannelMessage {
    ChannelMessage {
        id: msg.id.get(),
        author: msg.author.name,
        timestamp: msg.timestamp.to_rfc3339().unwrap_or_default(),
        content: msg.content,
        attachments: msg.attachments.into_iter().map(|a| a.url).collect(),
    }
}
