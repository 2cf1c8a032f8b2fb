use async_trait::async_trait;
use reqwest::{header::USER_AGENT, Client};
use serde_json::{json, Value};
use tracing::{info, warn};
use crate::{
    config::Config,
    error::{DigestError, Result},
    html::markdown_to_html,
};

const CLIENT_NAME: &str = "sift-digest/0.1";

/// Somewhere a finished digest goes.
#[async_trait]
pub trait Distributor: Send + Sync {
    fn name(&self) -> &'static str;

    async fn deliver(&self, subject: &str, body: &str) -> Result<()>;
}

/// Opens an issue; the tracker's own notifications do the rest.
pub struct GithubIssue {
    client: Client,
    token: String,
    repo: String,
}

#[async_trait]
impl Distributor for GithubIssue {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn deliver(&self, subject: &str, body: &str) -> Result<()> {
        let url = format!("https://api.github.com/repos/{}/issues", self.repo);
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header(USER_AGENT, CLIENT_NAME)
            .json(&json!({ "title": subject, "body": body, "labels": ["digest"] }))
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(DigestError::Api {
                service: "github",
                status: status.as_u16(),
                body: res.text().await?,
            });
        }

        let created: Value = res.json().await?;
        info!(url = created["html_url"].as_str().unwrap_or_default(), "Posted digest issue");
        Ok(())
    }
}

pub struct ResendEmail {
    client: Client,
    api_key: String,
    from: String,
    to: String,
}

#[async_trait]
impl Distributor for ResendEmail {
    fn name(&self) -> &'static str {
        "email"
    }

    async fn deliver(&self, subject: &str, body: &str) -> Result<()> {
        let res = self
            .client
            .post("https://api.resend.com/emails")
            .bearer_auth(&self.api_key)
            .header(USER_AGENT, CLIENT_NAME)
            .json(&json!({
                "from": self.from,
                "to": [self.to],
                "subject": subject,
                "html": markdown_to_html(body)
            }))
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(DigestError::Api {
                service: "resend",
                status: status.as_u16(),
                body: res.text().await?,
            });
        }

        info!(to = %self.to, "Email sent");
        Ok(())
    }
}

/// Fallback when no issue credentials are configured.
pub struct Stdout;

#[async_trait]
impl Distributor for Stdout {
    fn name(&self) -> &'static str {
        "stdout"
    }

    async fn deliver(&self, subject: &str, body: &str) -> Result<()> {
        let rule = "=".repeat(60);
        println!("{rule}\n{subject}\n{rule}\n{body}\n{rule}");
        Ok(())
    }
}

pub fn distributors_from_config(cfg: &Config) -> Vec<Box<dyn Distributor>> {
    let client = Client::new();
    let mut distributors: Vec<Box<dyn Distributor>> = Vec::new();

    match (&cfg.github_token, &cfg.github_repo) {
        (Some(token), Some(repo)) => distributors.push(Box::new(GithubIssue {
            client: client.clone(),
            token: token.clone(),
            repo: repo.clone(),
        })),
        _ => {
            info!("No GITHUB_TOKEN/GITHUB_REPO, digests will be printed to stdout");
            distributors.push(Box::new(Stdout));
        }
    }

    match (&cfg.resend_key, &cfg.email_to) {
        (Some(key), Some(to)) => distributors.push(Box::new(ResendEmail {
            client,
            api_key: key.clone(),
            from: cfg.email_from.clone(),
            to: to.clone(),
        })),
        (Some(_), None) => warn!("RESEND_API_KEY set without EMAIL_TO, email disabled"),
        _ => {}
    }

    distributors
}
