//! answer-question and finalize — the response-shaping stages.

use crate::collaborators::llm::ChatModel;
use crate::context::build_context;
use crate::workflow::engine::{Directive, Stage, StageId};
use crate::workflow::prompts;
use crate::workflow::state::{InteractionState, StageUpdate};
use crate::workflow::StageFailure;

/// Response when a run reaches finalize without any stage having shaped
/// a reply.
const MISSING_RESPONSE_FALLBACK: &str =
    "I'm sorry — I couldn't produce a response for this request.";

/// answer-question — answer the user's text against session context and
/// any insight from this run's document analysis.
pub struct AnswerQuestion<'a> {
    model: &'a dyn ChatModel,
}

impl<'a> AnswerQuestion<'a> {
    pub fn new(model: &'a dyn ChatModel) -> Self {
        Self { model }
    }
}

impl Stage for AnswerQuestion<'_> {
    fn id(&self) -> StageId {
        StageId::AnswerQuestion
    }

    fn run(&self, state: &InteractionState) -> Result<StageUpdate, StageFailure> {
        let mut content = build_context(state);
        if let Some(insight) = state.insight.as_deref() {
            content.push_str("\n\nDOCUMENT INSIGHTS FROM THIS REQUEST:\n  ");
            content.push_str(insight);
        }

        let answer = self.model.generate(&prompts::question_answer(), &content)?;
        tracing::info!(chars = answer.len(), "question answered");

        Ok(StageUpdate {
            answer: Some(answer.clone()),
            pre_final_response: Some(answer),
            ..StageUpdate::route(Directive::To(StageId::Finalize))
        })
    }
}

/// finalize — the designated terminal stage: promote the pre-final
/// response to the final response and end the run.
pub struct Finalize;

impl Stage for Finalize {
    fn id(&self) -> StageId {
        StageId::Finalize
    }

    fn run(&self, state: &InteractionState) -> Result<StageUpdate, StageFailure> {
        let response = state
            .pre_final_response
            .clone()
            .unwrap_or_else(|| MISSING_RESPONSE_FALLBACK.to_string());
        Ok(StageUpdate::terminal(response))
    }
}
