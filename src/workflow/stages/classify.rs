//! classify-intent — the routing brain at the graph entry.
//!
//! Branches on presence of text/file. Text-only messages are classified
//! on/off-topic against the assembled session context; off-topic runs
//! terminate with a contextual reply, and a request with neither text nor
//! file terminates with a fallback (the handler rejects that case before
//! a run starts; this is the defensive path).

use crate::collaborators::llm::{ChatModel, Classification};
use crate::context::build_context;
use crate::workflow::engine::{Directive, Stage, StageId};
use crate::workflow::prompts;
use crate::workflow::state::{InteractionState, StageUpdate};
use crate::workflow::StageFailure;

/// Static reply when the contextual off-topic generation itself fails.
const OFF_TOPIC_FALLBACK: &str =
    "I can only help with health questions and medical documents. \
     Is there anything health-related I can help you with?";

/// Reply when a request carries neither text nor a file.
const NO_INPUT_RESPONSE: &str = "No valid input provided.";

pub struct ClassifyIntent<'a> {
    model: &'a dyn ChatModel,
}

impl<'a> ClassifyIntent<'a> {
    pub fn new(model: &'a dyn ChatModel) -> Self {
        Self { model }
    }
}

impl Stage for ClassifyIntent<'_> {
    fn id(&self) -> StageId {
        StageId::ClassifyIntent
    }

    fn run(&self, state: &InteractionState) -> Result<StageUpdate, StageFailure> {
        // Any upload goes through the document pipeline, with or without
        // accompanying text; summarize decides later whether to answer.
        if state.has_file() {
            tracing::info!("file present; routing to document pipeline");
            return Ok(StageUpdate::route(Directive::To(StageId::ExtractDocument)));
        }

        if state.has_text() {
            let context = build_context(state);
            let verdict = self
                .model
                .classify(&prompts::intent_classification(), &context)?;
            tracing::info!(verdict = ?verdict, "classified text-only message");

            return Ok(match verdict {
                Classification::OnTopic => {
                    StageUpdate::route(Directive::To(StageId::AnswerQuestion))
                }
                Classification::OffTopic => {
                    StageUpdate::terminal(self.off_topic_reply(state))
                }
            });
        }

        tracing::warn!("request carried neither text nor file");
        Ok(StageUpdate::terminal(NO_INPUT_RESPONSE))
    }
}

impl ClassifyIntent<'_> {
    /// Contextual off-topic reply; falls back to a static message if the
    /// generation call fails, since the run is terminating anyway.
    fn off_topic_reply(&self, state: &InteractionState) -> String {
        let content = format!(
            "User message: '{}'",
            state.user_text.as_deref().unwrap_or_default()
        );
        match self.model.generate(&prompts::off_topic_reply(), &content) {
            Ok(reply) if !reply.trim().is_empty() => reply,
            Ok(_) => OFF_TOPIC_FALLBACK.to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "off-topic reply generation failed; using fallback");
                OFF_TOPIC_FALLBACK.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::llm::LlmError;
    use crate::session::SessionRecord;
    use crate::workflow::prompts::PromptSpec;
    use crate::workflow::state::FileMeta;

    struct MockModel {
        on_topic: bool,
        reply_fails: bool,
    }

    impl ChatModel for MockModel {
        fn generate(&self, spec: &PromptSpec, _content: &str) -> Result<String, LlmError> {
            if spec.system == prompts::intent_classification().system {
                return Ok(if self.on_topic { "ON_TOPIC" } else { "OFF_TOPIC" }.into());
            }
            if self.reply_fails {
                return Err(LlmError::Connection("refused".into()));
            }
            Ok("I'm a health assistant — happy to help with health questions!".into())
        }
    }

    fn text_state(text: &str) -> InteractionState {
        InteractionState::from_request(&SessionRecord::new("sess_cls"), Some(text.into()), None)
    }

    fn file_state(text: Option<&str>) -> InteractionState {
        InteractionState::from_request(
            &SessionRecord::new("sess_cls"),
            text.map(str::to_string),
            Some((
                FileMeta {
                    filename: "labs.pdf".into(),
                    content_type: "application/pdf".into(),
                    size: 9,
                },
                b"%PDF-1.4 ".to_vec(),
            )),
        )
    }

    #[test]
    fn file_routes_to_extraction_without_classification() {
        let model = MockModel { on_topic: false, reply_fails: true };
        let stage = ClassifyIntent::new(&model);
        let update = stage.run(&file_state(None)).unwrap();
        assert_eq!(update.directive, Directive::To(StageId::ExtractDocument));
    }

    #[test]
    fn file_with_text_still_routes_to_extraction() {
        let model = MockModel { on_topic: true, reply_fails: false };
        let stage = ClassifyIntent::new(&model);
        let update = stage.run(&file_state(Some("what does this mean?"))).unwrap();
        assert_eq!(update.directive, Directive::To(StageId::ExtractDocument));
    }

    #[test]
    fn on_topic_text_routes_to_answer() {
        let model = MockModel { on_topic: true, reply_fails: false };
        let stage = ClassifyIntent::new(&model);
        let update = stage.run(&text_state("What does high cholesterol mean?")).unwrap();
        assert_eq!(update.directive, Directive::To(StageId::AnswerQuestion));
        assert!(update.final_response.is_none());
    }

    #[test]
    fn off_topic_text_terminates_with_contextual_reply() {
        let model = MockModel { on_topic: false, reply_fails: false };
        let stage = ClassifyIntent::new(&model);
        let update = stage.run(&text_state("What's the weather?")).unwrap();
        assert_eq!(update.directive, Directive::End);
        assert!(update.final_response.unwrap().contains("health"));
    }

    #[test]
    fn off_topic_reply_failure_uses_static_fallback() {
        let model = MockModel { on_topic: false, reply_fails: true };
        let stage = ClassifyIntent::new(&model);
        let update = stage.run(&text_state("What's the weather?")).unwrap();
        assert_eq!(update.directive, Directive::End);
        assert_eq!(update.final_response.as_deref(), Some(OFF_TOPIC_FALLBACK));
    }

    #[test]
    fn no_input_terminates_with_fallback() {
        let model = MockModel { on_topic: true, reply_fails: false };
        let stage = ClassifyIntent::new(&model);
        let state = InteractionState::from_request(&SessionRecord::new("sess_cls"), None, None);
        let update = stage.run(&state).unwrap();
        assert_eq!(update.directive, Directive::End);
        assert_eq!(update.final_response.as_deref(), Some(NO_INPUT_RESPONSE));
    }

    #[test]
    fn classification_failure_propagates_as_stage_failure() {
        struct FailingModel;
        impl ChatModel for FailingModel {
            fn generate(&self, _: &PromptSpec, _: &str) -> Result<String, LlmError> {
                Err(LlmError::Timeout(300))
            }
        }
        let model = FailingModel;
        let stage = ClassifyIntent::new(&model);
        let result = stage.run(&text_state("am I ok?"));
        assert!(matches!(result, Err(StageFailure::Model(_))));
    }
}
