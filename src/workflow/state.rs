//! Per-run interaction state and the declared partial updates stages
//! return.
//!
//! The state is an explicit value the engine passes to each stage; no
//! stage holds a reference to anything store-wide. Stages report their
//! writes through `StageUpdate` and the engine merges them, so every
//! field a stage touches is declared at the type level.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::engine::Directive;
use crate::session::{AnalysisEntry, HistoryTurn, SessionRecord};

/// Descriptor of an uploaded file. The payload travels separately and is
/// never serialized.
#[derive(Debug, Clone, Serialize)]
pub struct FileMeta {
    pub filename: String,
    pub content_type: String,
    pub size: usize,
}

/// The single mutable record threaded through one graph execution.
#[derive(Debug, Clone, Serialize)]
pub struct InteractionState {
    /// Immutable once assigned, never empty.
    pub session_id: String,
    pub user_text: Option<String>,
    pub file_meta: Option<FileMeta>,
    /// Raw upload bytes. Present only until the document-extraction stage
    /// runs; stripped from every serialized or logged projection.
    #[serde(skip)]
    pub file_bytes: Option<Vec<u8>>,

    /// Routing directive set by the most recent stage.
    pub directive: Directive,

    /// Snapshot of prior turns from the session record (append-only).
    pub history: Vec<HistoryTurn>,
    /// Snapshot of prior document analyses (append-only).
    pub analyses: Vec<AnalysisEntry>,

    // Per-run derived fields.
    pub parsed_text: Option<String>,
    pub redacted_text: Option<String>,
    pub findings: Option<String>,
    pub risk_flags: Vec<String>,
    pub insight: Option<String>,
    pub answer: Option<String>,
    pub pre_final_response: Option<String>,
    pub final_response: Option<String>,

    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl InteractionState {
    /// Build the initial state for one request from the request input plus
    /// a session record snapshot.
    pub fn from_request(
        session: &SessionRecord,
        user_text: Option<String>,
        file: Option<(FileMeta, Vec<u8>)>,
    ) -> Self {
        let now = Utc::now();
        let (file_meta, file_bytes) = match file {
            Some((meta, bytes)) => (Some(meta), Some(bytes)),
            None => (None, None),
        };
        Self {
            session_id: session.session_id.clone(),
            user_text,
            file_meta,
            file_bytes,
            directive: Directive::End,
            history: session.conversation_history.clone(),
            analyses: session.analyses.clone(),
            parsed_text: None,
            redacted_text: None,
            findings: None,
            risk_flags: Vec::new(),
            insight: None,
            answer: None,
            pre_final_response: None,
            final_response: None,
            created_at: now,
            last_updated: now,
        }
    }

    /// Whether the request carried non-blank text.
    pub fn has_text(&self) -> bool {
        self.user_text
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty())
    }

    /// Whether the request carried a file.
    pub fn has_file(&self) -> bool {
        self.file_meta.is_some()
    }

    /// Merge a stage's declared partial update into the state.
    pub fn apply(&mut self, update: StageUpdate) {
        if let Some(v) = update.parsed_text {
            self.parsed_text = Some(v);
        }
        if let Some(v) = update.redacted_text {
            self.redacted_text = Some(v);
        }
        if let Some(v) = update.findings {
            self.findings = Some(v);
        }
        if let Some(v) = update.risk_flags {
            self.risk_flags = v;
        }
        if let Some(v) = update.insight {
            self.insight = Some(v);
        }
        if let Some(v) = update.answer {
            self.answer = Some(v);
        }
        if let Some(v) = update.pre_final_response {
            self.pre_final_response = Some(v);
        }
        if let Some(v) = update.final_response {
            self.final_response = Some(v);
        }
        if update.drop_file_payload {
            self.file_bytes = None;
        }
        self.directive = update.directive;
        self.last_updated = Utc::now();
    }
}

/// A stage's partial update: a mapping of written fields to new values,
/// plus the routing directive for the engine.
#[derive(Debug, Clone)]
pub struct StageUpdate {
    pub directive: Directive,
    pub parsed_text: Option<String>,
    pub redacted_text: Option<String>,
    pub findings: Option<String>,
    pub risk_flags: Option<Vec<String>>,
    pub insight: Option<String>,
    pub answer: Option<String>,
    pub pre_final_response: Option<String>,
    pub final_response: Option<String>,
    /// Set by the extraction stage so the raw payload never travels
    /// downstream, on success or failure.
    pub drop_file_payload: bool,
}

impl StageUpdate {
    /// An update that writes nothing and only routes.
    pub fn route(directive: Directive) -> Self {
        Self {
            directive,
            parsed_text: None,
            redacted_text: None,
            findings: None,
            risk_flags: None,
            insight: None,
            answer: None,
            pre_final_response: None,
            final_response: None,
            drop_file_payload: false,
        }
    }

    /// A terminal update carrying the final user-facing response.
    pub fn terminal(final_response: impl Into<String>) -> Self {
        Self {
            final_response: Some(final_response.into()),
            ..Self::route(Directive::End)
        }
    }
}
