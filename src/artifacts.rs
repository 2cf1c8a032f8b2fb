use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use crate::error::{DigestError, Result};

/// Flat files a run leaves behind in the output directory.
pub struct ArtifactWriter {
    dir: PathBuf,
    /// Append the channel id to file stems when more than one channel is digested.
    per_channel: bool,
}

impl ArtifactWriter {
    pub fn new(dir: impl Into<PathBuf>, per_channel: bool) -> Self {
        Self { dir: dir.into(), per_channel }
    }

    pub fn write_transcript(&self, date: &str, channel_id: u64, text: &str) -> Result<PathBuf> {
        let path = self.dir.join(format!("{}.txt", self.stem(date, channel_id)));
        self.write(&path, text)?;
        Ok(path)
    }

    pub fn write_digest(&self, date: &str, channel_id: u64, document: &str) -> Result<PathBuf> {
        let path = self.dir.join(format!("{}-digest.md", self.stem(date, channel_id)));
        self.write(&path, document)?;
        info!(path = %path.display(), "Saved digest");
        Ok(path)
    }

    /// The rolling run's local copy, overwritten on every run.
    pub fn write_rolling_digest(&self, channel_id: u64, document: &str) -> Result<PathBuf> {
        let path = self.dir.join(format!("{}.md", self.stem("digest-output", channel_id)));
        self.write(&path, document)?;
        info!(path = %path.display(), "Saved digest");
        Ok(path)
    }

    fn stem(&self, base: &str, channel_id: u64) -> String {
        if self.per_channel {
            format!("{base}-{channel_id}")
        } else {
            base.to_string()
        }
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        let io_err = |source| DigestError::Io { path: path.to_path_buf(), source };
        fs::create_dir_all(&self.dir).map_err(io_err)?;
        fs::write(path, contents).map_err(io_err)
    }
}

/// Markdown document stored next to the transcript.
pub fn digest_document(title: &str, message_count: usize, analysis: &str) -> String {
    format!("# {title}\n**{message_count} messages**\n\n{analysis}")
}
