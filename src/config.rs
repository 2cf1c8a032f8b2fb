use std::env;
use std::path::PathBuf;
use std::time::Duration;
use crate::error::{DigestError, Result};

/// Messages requested per page. The API caps this at 100.
pub const PAGE_SIZE: u8 = 100;

const DEFAULT_CHANNEL_ID: u64 = 730095596861521970;
const DEFAULT_GUILD_ID: u64 = 729741769192767510;

/// Upper bounds for the window settings; one year either way.
const MAX_HOURS: u32 = 24 * 366;
const MAX_DAYS: u32 = 366;

/// Fixed pauses between remote calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub between_pages: Duration,
    pub between_windows: Duration,
    pub retry_cooldown: Duration,
}

impl Pacing {
    pub fn none() -> Self {
        Self {
            between_pages: Duration::ZERO,
            between_windows: Duration::ZERO,
            retry_cooldown: Duration::ZERO,
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            between_pages: Duration::from_millis(500),
            between_windows: Duration::from_secs(2),
            retry_cooldown: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub gemini_key: String,
    pub gemini_model: String,
    pub channel_ids: Vec<u64>,
    pub guild_id: u64,
    pub hours: u32,
    pub backfill_days: u32,
    pub output_dir: PathBuf,
    pub source_label: String,
    pub github_token: Option<String>,
    pub github_repo: Option<String>,
    pub resend_key: Option<String>,
    pub email_to: Option<String>,
    pub email_from: String,
    /// Rolling mode drops `digest-output.md` locally when not running under CI.
    pub write_local_digest: bool,
    pub pacing: Pacing,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset, the way CI secrets arrive.
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &str| {
            get(key).ok_or_else(|| DigestError::Config(format!("expected {key} in env")))
        };

        let channel_ids = match get("CHANNEL_IDS").or_else(|| get("CHANNEL_ID")) {
            Some(raw) => parse_id_list(&raw)?,
            None => vec![DEFAULT_CHANNEL_ID],
        };

        Ok(Self {
            discord_token: required("DISCORD_TOKEN")?,
            gemini_key: required("GEMINI_API_KEY")?,
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| "gemini-2.0-flash".into()),
            channel_ids,
            guild_id: parse_or("GUILD_ID", get("GUILD_ID"), DEFAULT_GUILD_ID)?,
            hours: bounded("HOURS", get("HOURS"), 24, MAX_HOURS)?,
            backfill_days: bounded("DAYS", get("DAYS"), 7, MAX_DAYS)?,
            output_dir: get("OUTPUT_DIR").map(PathBuf::from).unwrap_or_else(|| "backfill".into()),
            source_label: get("SOURCE_LABEL").unwrap_or_else(|| "EleutherAI #off-topic".into()),
            github_token: get("GITHUB_TOKEN"),
            github_repo: get("GITHUB_REPO"),
            resend_key: get("RESEND_API_KEY"),
            email_to: get("EMAIL_TO"),
            email_from: get("EMAIL_FROM")
                .unwrap_or_else(|| "Signal Digest <onboarding@resend.dev>".into()),
            write_local_digest: get("GITHUB_ACTIONS").is_none(),
            pacing: Pacing::default(),
        })
    }

    pub fn channel_url(&self, channel_id: u64) -> String {
        format!("https://discord.com/channels/{}/{}", self.guild_id, channel_id)
    }
}

fn parse_id_list(raw: &str) -> Result<Vec<u64>> {
    let ids = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u64>()
                .ok()
                .filter(|id| *id != 0)
                .ok_or_else(|| DigestError::Config(format!("invalid channel id: {s:?}")))
        })
        .collect::<Result<Vec<_>>>()?;

    if ids.is_empty() {
        return Err(DigestError::Config("no channel ids given".into()));
    }
    Ok(ids)
}

fn parse_or<T: std::str::FromStr>(key: &str, value: Option<String>, default: T) -> Result<T> {
    match value {
        Some(v) => v
            .parse()
            .map_err(|_| DigestError::Config(format!("invalid value for {key}: {v:?}"))),
        None => Ok(default),
    }
}

fn bounded(key: &str, value: Option<String>, default: u32, max: u32) -> Result<u32> {
    match parse_or(key, value, default)? {
        0 => Err(DigestError::Config(format!("{key} must be greater than zero"))),
        n if n > max => Err(DigestError::Config(format!("{key} must be at most {max}"))),
        n => Ok(n),
    }
}
