//! The eight stage functions of the workflow graph.
//!
//! Each stage is specified by its read/write field contract and routing
//! choices; classification, generation, extraction and redaction
//! internals live behind the collaborator seams.

pub mod analysis;
pub mod classify;
pub mod document;
pub mod respond;

pub use analysis::{Analyze, AssessRisk, Summarize};
pub use classify::ClassifyIntent;
pub use document::{ExtractDocument, Redact};
pub use respond::{AnswerQuestion, Finalize};

use crate::collaborators::extractor::DocumentExtract;
use crate::collaborators::llm::ChatModel;

use super::engine::{GraphError, Stage, Workflow};

/// Assemble the production workflow over the given collaborators.
pub fn assemble_workflow<'a>(
    model: &'a dyn ChatModel,
    extractor: &'a dyn DocumentExtract,
) -> Workflow<'a> {
    let stages: Vec<Box<dyn Stage + 'a>> = vec![
        Box::new(ClassifyIntent::new(model)),
        Box::new(ExtractDocument::new(extractor)),
        Box::new(Redact),
        Box::new(Analyze::new(model)),
        Box::new(AssessRisk::new(model)),
        Box::new(Summarize),
        Box::new(AnswerQuestion::new(model)),
        Box::new(Finalize),
    ];
    match Workflow::new(stages) {
        Ok(workflow) => workflow,
        // Unreachable: the stage set above is the complete enum.
        Err(GraphError::DuplicateStage(id)) | Err(GraphError::MissingStage(id)) => {
            unreachable!("production graph is statically complete, offending stage: {id}")
        }
    }
}
