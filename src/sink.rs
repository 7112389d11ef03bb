//! Journal sinks: where rendered journal entries end up.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::FsResult;
use crate::journal::{Journal, JournalEntry};

/// Line format of a persisted journal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum JournalFormat {
    /// `[<timestamp>] <OP>: <details> (Status: <STATUS>)`
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

impl JournalFormat {
    pub fn render(self, entry: &JournalEntry) -> FsResult<String> {
        Ok(match self {
            JournalFormat::Text => entry.to_string(),
            JournalFormat::Json => serde_json::to_string(entry)?,
        })
    }
}

/// Consumer of journal snapshots taken from [`Journal::outbox`].
#[async_trait::async_trait]
pub trait JournalSink: Send + 'static {
    async fn append(&mut self, entries: &[JournalEntry]) -> FsResult<()>;
}

/// Hand the journal's pending transitions to `sink`.
///
/// The outbox is acknowledged only after the append succeeds, so a failed
/// write is retried in full on the next flush. Returns how many were written.
pub async fn flush<S: JournalSink + ?Sized>(
    journal: &mut Journal,
    sink: &mut S,
) -> FsResult<usize> {
    let count = journal.outbox().len();
    if count == 0 {
        return Ok(0);
    }
    sink.append(journal.outbox()).await?;
    journal.ack_outbox(count);
    Ok(count)
}

/// Appends to a text artifact on disk; nothing is ever rewritten.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
    format: JournalFormat,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>, format: JournalFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl JournalSink for FileSink {
    async fn append(&mut self, entries: &[JournalEntry]) -> FsResult<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut buf = String::new();
        for entry in entries {
            buf.push_str(&self.format.render(entry)?);
            buf.push('\n');
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(buf.as_bytes()).await?;
        file.flush().await?;

        debug!(path = %self.path.display(), count = entries.len(), "journal appended");
        Ok(())
    }
}

/// Keeps rendered lines in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    format: JournalFormat,
    lines: Vec<String>,
}

impl MemorySink {
    pub fn new(format: JournalFormat) -> Self {
        Self {
            format,
            lines: Vec::new(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

#[async_trait::async_trait]
impl JournalSink for MemorySink {
    async fn append(&mut self, entries: &[JournalEntry]) -> FsResult<()> {
        for entry in entries {
            self.lines.push(self.format.render(entry)?);
        }
        Ok(())
    }
}
