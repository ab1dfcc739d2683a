//! extract-document and redact — the document intake stages.
//!
//! Extraction is the only stage that may touch the raw file payload, and
//! it drops the payload from the state in every outcome so nothing
//! downstream can observe it. Extraction failure terminates the run with
//! a user-facing error response rather than propagating.

use crate::collaborators::extractor::DocumentExtract;
use crate::collaborators::redact::scrub_pii;
use crate::workflow::engine::{truncate_for_log, Directive, Stage, StageId};
use crate::workflow::state::{InteractionState, StageUpdate};
use crate::workflow::StageFailure;

pub struct ExtractDocument<'a> {
    extractor: &'a dyn DocumentExtract,
}

impl<'a> ExtractDocument<'a> {
    pub fn new(extractor: &'a dyn DocumentExtract) -> Self {
        Self { extractor }
    }
}

impl Stage for ExtractDocument<'_> {
    fn id(&self) -> StageId {
        StageId::ExtractDocument
    }

    fn run(&self, state: &InteractionState) -> Result<StageUpdate, StageFailure> {
        let filename = state
            .file_meta
            .as_ref()
            .map(|m| m.filename.as_str())
            .unwrap_or("unknown.pdf");

        let Some(bytes) = state.file_bytes.as_deref() else {
            tracing::error!(filename, "no file payload present at extraction");
            let mut update = StageUpdate::terminal("Error: No file content");
            update.drop_file_payload = true;
            return Ok(update);
        };

        match self.extractor.extract(bytes) {
            Ok(text) => {
                tracing::info!(filename, chars = text.len(), "document extracted");
                Ok(StageUpdate {
                    parsed_text: Some(text),
                    drop_file_payload: true,
                    ..StageUpdate::route(Directive::To(StageId::Redact))
                })
            }
            Err(e) => {
                tracing::error!(
                    filename,
                    error = %truncate_for_log(&e.to_string()),
                    "document extraction failed"
                );
                let mut update = StageUpdate::terminal(format!(
                    "An error occurred while processing the document: {e}"
                ));
                update.drop_file_payload = true;
                Ok(update)
            }
        }
    }
}

/// redact — scrub personal identifiers from the parsed text before any
/// model sees it. Unconditional forward to analyze.
pub struct Redact;

impl Stage for Redact {
    fn id(&self) -> StageId {
        StageId::Redact
    }

    fn run(&self, state: &InteractionState) -> Result<StageUpdate, StageFailure> {
        let parsed = state.parsed_text.as_deref().unwrap_or_default();
        Ok(StageUpdate {
            redacted_text: Some(scrub_pii(parsed)),
            ..StageUpdate::route(Directive::To(StageId::Analyze))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::extractor::ExtractError;
    use crate::session::SessionRecord;
    use crate::workflow::state::FileMeta;

    struct MockExtractor {
        result: Result<&'static str, &'static str>,
    }

    impl DocumentExtract for MockExtractor {
        fn extract(&self, _bytes: &[u8]) -> Result<String, ExtractError> {
            match self.result {
                Ok(text) => Ok(text.to_string()),
                Err(msg) => Err(ExtractError::PdfParsing(msg.to_string())),
            }
        }
    }

    fn upload_state() -> InteractionState {
        InteractionState::from_request(
            &SessionRecord::new("sess_doc"),
            None,
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
    fn successful_extraction_routes_to_redact_and_drops_payload() {
        let extractor = MockExtractor { result: Ok("Cholesterol 7.2") };
        let stage = ExtractDocument::new(&extractor);
        let update = stage.run(&upload_state()).unwrap();

        assert_eq!(update.directive, Directive::To(StageId::Redact));
        assert_eq!(update.parsed_text.as_deref(), Some("Cholesterol 7.2"));
        assert!(update.drop_file_payload);
    }

    #[test]
    fn failed_extraction_terminates_with_error_response() {
        let extractor = MockExtractor { result: Err("corrupt xref table") };
        let stage = ExtractDocument::new(&extractor);
        let update = stage.run(&upload_state()).unwrap();

        assert_eq!(update.directive, Directive::End);
        let response = update.final_response.unwrap();
        assert!(response.contains("error occurred while processing the document"));
        assert!(response.contains("corrupt xref table"));
        assert!(update.drop_file_payload);
    }

    #[test]
    fn missing_payload_terminates_with_error() {
        let extractor = MockExtractor { result: Ok("unused") };
        let stage = ExtractDocument::new(&extractor);
        let mut state = upload_state();
        state.file_bytes = None;

        let update = stage.run(&state).unwrap();
        assert_eq!(update.directive, Directive::End);
        assert!(update.final_response.unwrap().contains("No file content"));
    }

    #[test]
    fn redact_scrubs_pii_and_forwards() {
        let mut state = upload_state();
        state.parsed_text = Some("Patient S1234567D, LDL 4.1 mmol/L".into());

        let update = Redact.run(&state).unwrap();
        assert_eq!(update.directive, Directive::To(StageId::Analyze));
        let redacted = update.redacted_text.unwrap();
        assert!(redacted.contains("[REDACTED-ID]"));
        assert!(redacted.contains("LDL 4.1"));
    }
}
