//! Chat endpoint — one multipart request drives one workflow run.
//!
//! The request carries an optional `message` text part and an optional
//! `file` PDF part; at least one must be present. Session continuity
//! travels in the `X-Session-ID` header both ways. The workflow itself
//! is synchronous (blocking model and PDF calls), so it runs on the
//! blocking pool and the handler awaits the result.

use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, HeaderName};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::AppContext;
use crate::api::validate;
use crate::context::{snippet, INPUT_SNIPPET_MAX, RESPONSE_SNIPPET_MAX};
use crate::session::{AnalysisEntry, HistoryTurn, SessionRecord, UploadEntry};
use crate::workflow::engine::EMPTY_RUN_RESPONSE;
use crate::workflow::stages::assemble_workflow;
use crate::workflow::state::{FileMeta, InteractionState};

pub const SESSION_HEADER: &str = "x-session-id";

#[derive(Serialize)]
pub struct ChatResponse {
    pub message: String,
    pub session_id: String,
    pub has_active_analysis: bool,
}

/// Parsed multipart input for one chat request.
struct ChatRequest {
    message: Option<String>,
    file: Option<(FileMeta, Vec<u8>)>,
}

/// `POST /api/chat` — run the workflow for one user interaction.
pub async fn send(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let request = parse_multipart(multipart).await?;

    let has_text = request
        .message
        .as_deref()
        .is_some_and(|t| !t.trim().is_empty());
    if !has_text && request.file.is_none() {
        return Err(ApiError::BadRequest(
            "Provide a message, a file, or both".into(),
        ));
    }

    let requested_id = headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok());
    let record = ctx.sessions.get_or_create(requested_id)?;
    let session_id = record.session_id.clone();

    // Kept past the run for session bookkeeping; the payload itself is
    // consumed by extraction and never comes back.
    let upload_meta = request.file.as_ref().map(|(meta, _)| meta.clone());

    let state = InteractionState::from_request(&record, request.message, request.file);

    // Blocking model and PDF calls; keep them off the async workers.
    let model = ctx.model.clone();
    let extractor = ctx.extractor.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let workflow = assemble_workflow(model.as_ref(), extractor.as_ref());
        workflow.run(state)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("workflow task failed: {e}")))?;

    let message = outcome
        .final_response
        .clone()
        .unwrap_or_else(|| EMPTY_RUN_RESPONSE.to_string());

    let record = persist_outcome(&ctx, record, upload_meta, &outcome, &message)?;

    Ok((
        [(HeaderName::from_static(SESSION_HEADER), session_id.clone())],
        Json(ChatResponse {
            message,
            session_id,
            has_active_analysis: record.has_active_analysis,
        }),
    ))
}

async fn parse_multipart(mut multipart: Multipart) -> Result<ChatRequest, ApiError> {
    let mut message = None;
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        match field.name() {
            Some("message") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Unreadable message part: {e}")))?;
                message = Some(text);
            }
            Some("file") => {
                let filename = field.file_name().unwrap_or("upload.pdf").to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Unreadable file part: {e}")))?;

                validate::check_upload(&filename, &content_type, &bytes)?;

                file = Some((
                    FileMeta {
                        filename,
                        content_type,
                        size: bytes.len(),
                    },
                    bytes.to_vec(),
                ));
            }
            // Unknown parts are skipped, not an error.
            _ => {}
        }
    }

    Ok(ChatRequest { message, file })
}

/// Fold one run's outcome back into the session record and save it.
fn persist_outcome(
    ctx: &AppContext,
    mut record: SessionRecord,
    upload_meta: Option<FileMeta>,
    outcome: &InteractionState,
    response: &str,
) -> Result<SessionRecord, ApiError> {
    let now = Utc::now();
    record.message_count += 1;

    if let Some(meta) = upload_meta {
        record.upload_count += 1;
        // Every attempted upload is recorded, including failed extractions.
        record.upload_history.push(UploadEntry {
            filename: meta.filename.clone(),
            content_type: meta.content_type,
            size: meta.size,
            uploaded_at: now,
        });

        if let Some(findings) = outcome.findings.as_deref() {
            record.analyses.push(AnalysisEntry {
                filename: meta.filename,
                findings: findings.to_string(),
                risk_flags: outcome.risk_flags.clone(),
                analyzed_at: now,
            });
            record.has_active_analysis = true;
        }
    }

    let input = outcome
        .user_text
        .clone()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| {
            let name = outcome
                .file_meta
                .as_ref()
                .map(|m| m.filename.as_str())
                .unwrap_or("document");
            format!("[uploaded {name}]")
        });
    record.conversation_history.push(HistoryTurn {
        timestamp: now,
        input_snippet: snippet(&input, INPUT_SNIPPET_MAX),
        response_snippet: snippet(response, RESPONSE_SNIPPET_MAX),
    });
    record.last_active = now;

    ctx.sessions.save(&record.session_id, record.clone())?;
    Ok(record)
}
