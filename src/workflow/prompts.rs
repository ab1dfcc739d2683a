//! Prompt registry — one `PromptSpec` per model call site.
//!
//! Stage code never embeds instruction text inline; it asks this module
//! for the spec (system instruction, model, temperature) of a named call
//! site. Classification specs demand a single uppercase token so the
//! collaborator's normalized output parses deterministically.

/// Everything the model collaborator needs for one call, besides the
/// message content itself.
#[derive(Debug, Clone, Copy)]
pub struct PromptSpec {
    pub system: &'static str,
    pub model: &'static str,
    pub temperature: f32,
}

const DEFAULT_MODEL: &str = "medgemma";

/// classify-intent: is a text-only message health-related?
pub fn intent_classification() -> PromptSpec {
    PromptSpec {
        system: "You classify user messages for a health-insights assistant. \
                 Considering the conversation context, reply with exactly one \
                 token: ON_TOPIC if the new message concerns health, medicine, \
                 lab results, or the user's prior analyses; OFF_TOPIC otherwise.",
        model: DEFAULT_MODEL,
        temperature: 0.0,
    }
}

/// classify-intent: contextual reply for an off-topic message.
pub fn off_topic_reply() -> PromptSpec {
    PromptSpec {
        system: "You are a health-insights assistant. The user's message is \
                 off-topic for you. Reply in one or two friendly sentences: \
                 acknowledge the message and explain that you can only help \
                 with health questions and medical documents.",
        model: DEFAULT_MODEL,
        temperature: 0.4,
    }
}

/// analyze: is the uploaded document health-related?
pub fn document_classification() -> PromptSpec {
    PromptSpec {
        system: "You classify documents for a health-insights assistant. \
                 Reply with exactly one token: ON_TOPIC if the document is a \
                 medical or health document (lab report, prescription, \
                 discharge summary, clinical note); OFF_TOPIC otherwise.",
        model: DEFAULT_MODEL,
        temperature: 0.0,
    }
}

/// analyze: findings summary for an on-topic document.
pub fn document_analysis() -> PromptSpec {
    PromptSpec {
        system: "You are a clinical document analyst. Summarize the key \
                 findings of the document in plain language: values out of \
                 range, notable diagnoses, medications, and follow-ups. Be \
                 factual and concise; do not give medical advice.",
        model: DEFAULT_MODEL,
        temperature: 0.2,
    }
}

/// assess-risk: flag list from the findings text.
pub fn risk_assessment() -> PromptSpec {
    PromptSpec {
        system: "Given clinical findings, list the health risk flags they \
                 support, one short phrase per line (for example: High \
                 cholesterol). Reply with the word NONE if the findings \
                 support no risk flags. Output only the list.",
        model: DEFAULT_MODEL,
        temperature: 0.0,
    }
}

/// answer-question: grounded answer to the user's question.
pub fn question_answer() -> PromptSpec {
    PromptSpec {
        system: "You are a health-insights assistant. Answer the user's \
                 question using the provided conversation context and \
                 document insights. Be clear and plain-spoken, and remind \
                 the user to confirm anything important with their \
                 healthcare team.",
        model: DEFAULT_MODEL,
        temperature: 0.3,
    }
}
