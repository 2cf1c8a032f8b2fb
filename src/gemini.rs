use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{info, warn};
use crate::{
    config::Config,
    error::{DigestError, Result},
    metrics::SUMMARIZE_DURATION,
    prompt::render_prompt,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Opaque text-in, text-out analysis of one transcript.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, transcript: &str, date_label: &str, message_count: usize) -> Result<String>;
}

pub struct GeminiSummarizer {
    client: Client,
    api_key: String,
    model: String,
    source_label: String,
    template: &'static str,
}

impl GeminiSummarizer {
    pub fn new(cfg: &Config, template: &'static str) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key: cfg.gemini_key.clone(),
            model: cfg.gemini_model.clone(),
            source_label: cfg.source_label.clone(),
            template,
        })
    }
}

#[async_trait]
impl Summarizer for GeminiSummarizer {
    async fn summarize(&self, transcript: &str, date_label: &str, message_count: usize) -> Result<String> {
        let _timer = SUMMARIZE_DURATION.start_timer();
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
            self.model
        );
        let prompt = render_prompt(self.template, &self.source_label, date_label, message_count, transcript);

        let res = self
            .client
            .post(&url)
            .query(&[("key", &self.api_key)])
            .json(&json!({
                "contents": [{ "parts": [{ "text": prompt }] }],
                "generationConfig": {
                    "temperature": 0.2,
                    "maxOutputTokens": 1500,
                    "frequencyPenalty": 1.5,
                    "presencePenalty": 0.5
                }
            }))
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(DigestError::Api {
                service: "gemini",
                status: status.as_u16(),
                body: res.text().await?,
            });
        }

        let body: Value = res.json().await?;
        extract_text(&body)
    }
}

fn extract_text(body: &Value) -> Result<String> {
    match body["candidates"][0]["content"]["parts"][0]["text"].as_str() {
        Some(text) => {
            let analysis = text.trim().to_string();
            info!(len = analysis.len(), "Generated digest");
            Ok(analysis)
        }
        None => {
            warn!("No text in Gemini response: {body:?}");
            Err(DigestError::MalformedResponse {
                service: "gemini",
                detail: "no candidate text".into(),
            })
        }
    }
}
