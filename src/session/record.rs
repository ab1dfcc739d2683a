//! Persisted session shape — one JSON-serializable record per session.
//!
//! Every field carries a serde default so older stored shapes deserialize
//! cleanly: absent fields come back empty/zero, never as an error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One prior conversation turn, stored with truncated snippets.
///
/// Truncation happens at session-write time (200 chars for user input,
/// 400 for the response); readers never re-truncate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryTurn {
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub input_snippet: String,
    #[serde(default)]
    pub response_snippet: String,
}

impl Default for HistoryTurn {
    fn default() -> Self {
        Self {
            timestamp: Utc::now(),
            input_snippet: String::new(),
            response_snippet: String::new(),
        }
    }
}

/// Outcome of one document analysis, kept across requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisEntry {
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub findings: String,
    #[serde(default)]
    pub risk_flags: Vec<String>,
    #[serde(default = "Utc::now")]
    pub analyzed_at: DateTime<Utc>,
}

/// One attempted upload, recorded whether or not extraction succeeded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadEntry {
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub content_type: String,
    #[serde(default)]
    pub size: usize,
    #[serde(default = "Utc::now")]
    pub uploaded_at: DateTime<Utc>,
}

/// Persisted, TTL-bounded memory of one user's prior turns and analyses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(default)]
    pub session_id: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub last_active: DateTime<Utc>,
    #[serde(default)]
    pub conversation_history: Vec<HistoryTurn>,
    #[serde(default)]
    pub analyses: Vec<AnalysisEntry>,
    #[serde(default)]
    pub upload_history: Vec<UploadEntry>,
    #[serde(default)]
    pub message_count: u64,
    #[serde(default)]
    pub upload_count: u64,
    #[serde(default)]
    pub has_active_analysis: bool,
}

impl SessionRecord {
    /// Fresh empty record for a newly allocated session identifier.
    pub fn new(session_id: &str) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.to_string(),
            created_at: now,
            last_active: now,
            conversation_history: Vec::new(),
            analyses: Vec::new(),
            upload_history: Vec::new(),
            message_count: 0,
            upload_count: 0,
            has_active_analysis: false,
        }
    }
}
