//! analyze, assess-risk, summarize — the document analysis stages.

use crate::collaborators::llm::{ChatModel, Classification};
use crate::workflow::engine::{Directive, Stage, StageId};
use crate::workflow::prompts;
use crate::workflow::state::{InteractionState, StageUpdate};
use crate::workflow::StageFailure;

const OFF_TOPIC_FINDINGS: &str = "The document does not appear to be health-related.";
const OFF_TOPIC_DOCUMENT_RESPONSE: &str =
    "The uploaded document is not health-related. Please provide a health-related \
     document for analysis.";

/// analyze — judge the redacted document content and, when relevant,
/// produce a findings summary. Off-topic documents skip risk assessment
/// and go straight to finalize.
pub struct Analyze<'a> {
    model: &'a dyn ChatModel,
}

impl<'a> Analyze<'a> {
    pub fn new(model: &'a dyn ChatModel) -> Self {
        Self { model }
    }
}

impl Stage for Analyze<'_> {
    fn id(&self) -> StageId {
        StageId::Analyze
    }

    fn run(&self, state: &InteractionState) -> Result<StageUpdate, StageFailure> {
        let content = state.redacted_text.as_deref().unwrap_or_default();

        let verdict = self
            .model
            .classify(&prompts::document_classification(), content)?;

        if verdict == Classification::OffTopic {
            tracing::info!("document judged off-topic; skipping risk assessment");
            return Ok(StageUpdate {
                findings: Some(OFF_TOPIC_FINDINGS.to_string()),
                insight: Some(OFF_TOPIC_FINDINGS.to_string()),
                pre_final_response: Some(OFF_TOPIC_DOCUMENT_RESPONSE.to_string()),
                ..StageUpdate::route(Directive::To(StageId::Finalize))
            });
        }

        let findings = self.model.generate(&prompts::document_analysis(), content)?;
        tracing::info!(chars = findings.len(), "document analysis complete");

        Ok(StageUpdate {
            findings: Some(findings),
            ..StageUpdate::route(Directive::To(StageId::AssessRisk))
        })
    }
}

/// assess-risk — derive risk flags from the findings text.
/// Unconditional forward to summarize.
pub struct AssessRisk<'a> {
    model: &'a dyn ChatModel,
}

impl<'a> AssessRisk<'a> {
    pub fn new(model: &'a dyn ChatModel) -> Self {
        Self { model }
    }
}

impl Stage for AssessRisk<'_> {
    fn id(&self) -> StageId {
        StageId::AssessRisk
    }

    fn run(&self, state: &InteractionState) -> Result<StageUpdate, StageFailure> {
        let findings = state.findings.as_deref().unwrap_or_default();
        let raw = self.model.generate(&prompts::risk_assessment(), findings)?;
        let flags = parse_risk_flags(&raw);
        tracing::info!(count = flags.len(), "risk flags assessed");

        Ok(StageUpdate {
            risk_flags: Some(flags),
            ..StageUpdate::route(Directive::To(StageId::Summarize))
        })
    }
}

/// Parse a comma/newline-separated flag list. A literal `NONE` yields an
/// empty set.
fn parse_risk_flags(raw: &str) -> Vec<String> {
    if raw.trim().eq_ignore_ascii_case("none") {
        return Vec::new();
    }
    raw.split(['\n', ','])
        .map(|flag| flag.trim().trim_start_matches(['-', '*', ' ']).trim())
        .filter(|flag| !flag.is_empty())
        .map(str::to_string)
        .collect()
}

/// summarize — consolidate findings and risk flags into the insight text
/// and decide whether the original request still has a question to answer.
pub struct Summarize;

impl Stage for Summarize {
    fn id(&self) -> StageId {
        StageId::Summarize
    }

    fn run(&self, state: &InteractionState) -> Result<StageUpdate, StageFailure> {
        let findings = state.findings.as_deref().unwrap_or_default();
        let insight = if state.risk_flags.is_empty() {
            format!("{findings}; Risks: none flagged")
        } else {
            format!("{findings}; Risks: {}", state.risk_flags.join(", "))
        };

        // Document + text goes on to answer the question; document-only
        // requests finish here, so the insight becomes the response.
        if state.has_text() {
            Ok(StageUpdate {
                insight: Some(insight),
                ..StageUpdate::route(Directive::To(StageId::AnswerQuestion))
            })
        } else {
            Ok(StageUpdate {
                insight: Some(insight.clone()),
                pre_final_response: Some(insight),
                ..StageUpdate::route(Directive::To(StageId::Finalize))
            })
        }
    }
}
