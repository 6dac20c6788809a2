//! Generation History
//!
//! Log of completed runs. Kept in memory; when created with a path the
//! log is also written to disk after every run so it survives restarts.
//! Only the newest `limit` entries are kept.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::warn;

use crate::mcp::{Envelope, Payload};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub client_name: String,
    pub project_title: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HistoryEntry {
    /// Summarise the envelope a run returned.
    pub fn from_result(result: &Envelope) -> Self {
        let (brief, success, total, error) = match result.payload() {
            Payload::ProposalCompleted(done) => (&done.proposal.brief, true, Some(done.proposal.pricing.total), None),
            Payload::GenerationError(failed) => (
                &failed.partial_data.brief,
                false,
                failed.partial_data.pricing.as_ref().map(|p| p.total),
                Some(failed.error.clone()),
            ),
            other => {
                return Self {
                    timestamp: result.timestamp(),
                    client_name: "Unknown".to_string(),
                    project_title: "Unknown".to_string(),
                    success: false,
                    total: None,
                    error: Some(format!("Unexpected result type {}", other.message_type())),
                }
            }
        };

        Self {
            timestamp: result.timestamp(),
            client_name: brief.client_name.clone().unwrap_or_else(|| "Unknown".to_string()),
            project_title: brief.project_title.clone().unwrap_or_else(|| "Unknown".to_string()),
            success,
            total,
            error,
        }
    }
}

pub const DEFAULT_HISTORY_LIMIT: usize = 500;

pub struct GenerationHistory {
    entries: RwLock<Vec<HistoryEntry>>,
    path: Option<PathBuf>,
    limit: usize,
}

fn trim_to(entries: &mut Vec<HistoryEntry>, limit: usize) {
    if entries.len() > limit {
        let excess = entries.len() - limit;
        entries.drain(..excess);
    }
}

impl Default for GenerationHistory {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl GenerationHistory {
    pub fn in_memory() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            path: None,
            limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// History backed by a JSON file. A missing file starts empty.
    pub async fn persistent(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let json = fs::read_to_string(&path)
                .await
                .context("Failed to read history file")?;
            serde_json::from_str(&json).context("Failed to deserialize history")?
        } else {
            Vec::new()
        };

        Ok(Self {
            entries: RwLock::new(entries),
            path: Some(path),
            limit: DEFAULT_HISTORY_LIMIT,
        })
    }

    /// Keep at most `limit` entries; older ones are dropped on the next record.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    /// Append an entry and persist the log if file backed.
    ///
    /// The entry stays in memory even when the write fails.
    pub async fn record(&self, entry: HistoryEntry) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.push(entry);
        trim_to(&mut entries, self.limit);

        if let Some(path) = &self.path {
            let json = serde_json::to_string_pretty(&*entries).context("Failed to serialize history")?;
            fs::write(path, json).await.context("Failed to write history file")?;
        }
        Ok(())
    }

    /// Like `record`, but a failed write is only logged.
    pub async fn record_or_warn(&self, entry: HistoryEntry) {
        if let Err(e) = self.record(entry).await {
            warn!("Failed to record generation history: {:#}", e);
        }
    }

    /// All entries, oldest first.
    pub async fn entries(&self) -> Vec<HistoryEntry> {
        self.entries.read().await.clone()
    }

    /// The newest `n` entries, newest first.
    pub async fn recent(&self, n: usize) -> Vec<HistoryEntry> {
        self.entries.read().await.iter().rev().take(n).cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
