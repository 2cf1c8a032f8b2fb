use crate::schema::ChannelMessage;

/// One window's ordered messages and their rendered text.
#[derive(Debug, Clone)]
pub struct Transcript {
    pub channel_id: u64,
    pub messages: Vec<ChannelMessage>,
    pub text: String,
}

impl Transcript {
    pub fn new(channel_id: u64, messages: Vec<ChannelMessage>) -> Self {
        let text = render(&messages);
        Self { channel_id, messages, text }
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }
}

/// `[YYYY-MM-DD HH:MM:SS] author: content [attachments: a, b]`, one line per message.
pub fn render(messages: &[ChannelMessage]) -> String {
    messages.iter().map(render_line).collect::<Vec<_>>().join("\n")
}

fn render_line(msg: &ChannelMessage) -> String {
    let mut line = format!("[{}] {}: {}", display_timestamp(&msg.timestamp), msg.author, msg.content);
    if !msg.attachments.is_empty() {
        line.push_str(&format!(" [attachments: {}]", msg.attachments.join(", ")));
    }
    line
}

fn display_timestamp(raw: &str) -> String {
    raw.chars().take(19).map(|c| if c == 'T' { ' ' } else { c }).collect()
}
