//! Persisted interview performance history.
//!
//! The quiz subsystem appends one record per completed interview session.
//! The log is a single JSON file rewritten wholesale on every append; a
//! missing file reads as an empty history.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

use crate::error::Result;

/// One interview session's outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    /// Company the session was prepared for.
    pub company: String,

    /// Role the session was prepared for.
    pub role: String,

    /// Number of questions answered correctly.
    pub score: u32,

    /// Number of questions asked.
    pub total_questions: u32,

    /// When the session finished.
    pub timestamp: DateTime<Utc>,
}

impl PerformanceRecord {
    /// Create a record timestamped now.
    pub fn new(
        company: impl Into<String>,
        role: impl Into<String>,
        score: u32,
        total_questions: u32,
    ) -> Self {
        Self {
            company: company.into(),
            role: role.into(),
            score,
            total_questions,
            timestamp: Utc::now(),
        }
    }
}

/// Append-only performance log backed by one JSON file.
pub struct PerformanceLog {
    path: PathBuf,
}

impl PerformanceLog {
    /// Create a log handle for the given file path.
    ///
    /// The file is created on first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load all records. A missing file yields an empty list.
    pub async fn records(&self) -> Result<Vec<PerformanceRecord>> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Append a record by rewriting the whole file.
    pub async fn append(&self, record: PerformanceRecord) -> Result<()> {
        let mut records = self.records().await?;
        records.push(record);

        let content = serde_json::to_string_pretty(&records)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Write atomically
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, &content).await?;
        fs::rename(&temp_path, &self.path).await?;

        debug!("Appended performance record, {} total", records.len());
        Ok(())
    }
}
