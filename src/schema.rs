use chrono::{DateTime, Duration, Utc};

/// One message as pulled from a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMessage {
    pub id: u64,
    pub author: String,
    /// RFC 3339 creation time as reported by the source.
    pub timestamp: String,
    pub content: String,
    pub attachments: Vec<String>,
}

/// Half-open time range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// The single most recent window ending at `now`.
    pub fn rolling(now: DateTime<Utc>, hours: u32) -> Self {
        Self::new(now - Duration::hours(i64::from(hours)), now)
    }

    /// `days` contiguous 24h windows ending at `now`, oldest first.
    pub fn daily(now: DateTime<Utc>, days: u32) -> Vec<Self> {
        (1..=i64::from(days))
            .rev()
            .map(|day| {
                Self::new(
                    now - Duration::days(day),
                    now - Duration::days(day - 1),
                )
            })
            .collect()
    }

    pub fn date_label(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }
}
