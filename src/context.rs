//! Context assembler — a bounded, human-and-model-readable block built
//! from session history.
//!
//! Deterministic and pure: last window of conversation turns (oldest
//! first), the single most recent document analysis, and the current
//! message verbatim. Snippet truncation happens at session-write time via
//! the helper below; the assembler never re-truncates.

use crate::workflow::state::InteractionState;

/// How many prior turns the assembled context includes.
pub const HISTORY_WINDOW: usize = 5;
/// Write-time truncation for stored user input snippets.
pub const INPUT_SNIPPET_MAX: usize = 200;
/// Write-time truncation for stored response snippets.
pub const RESPONSE_SNIPPET_MAX: usize = 400;

/// Build the structured context block for classification and answering.
///
/// Returns an empty string when there is no history, no prior analysis,
/// and no current message.
pub fn build_context(state: &InteractionState) -> String {
    let mut parts = Vec::new();

    if !state.history.is_empty() {
        let start = state.history.len().saturating_sub(HISTORY_WINDOW);
        let mut lines = Vec::new();
        for (i, turn) in state.history[start..].iter().enumerate() {
            lines.push(format!("  Turn {}:", i + 1));
            lines.push(format!("    User: {}", turn.input_snippet));
            lines.push(format!("    Assistant: {}", turn.response_snippet));
        }
        parts.push(format!("CONVERSATION HISTORY:\n{}", lines.join("\n")));
    }

    if let Some(latest) = state.analyses.last() {
        let flags = if latest.risk_flags.is_empty() {
            "None".to_string()
        } else {
            latest.risk_flags.join(", ")
        };
        parts.push(format!(
            "PREVIOUS DOCUMENT ANALYSIS: {}\n  - Findings: {}\n  - Risk flags: {}",
            latest.filename, latest.findings, flags
        ));
    }

    if let Some(text) = state.user_text.as_deref().filter(|t| !t.trim().is_empty()) {
        parts.push(format!("NEW MESSAGE FROM USER:\n  \"{text}\""));
    }

    parts.join("\n\n")
}

/// Truncate text to at most `max` characters, on a char boundary.
/// Applied when history entries are written to the session record.
pub fn snippet(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
