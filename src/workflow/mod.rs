pub mod engine;
pub mod prompts;
pub mod stages;
pub mod state;

pub use engine::{Directive, Stage, StageId, Workflow};
pub use state::{FileMeta, InteractionState, StageUpdate};

use thiserror::Error;

use crate::collaborators::extractor::ExtractError;
use crate::collaborators::llm::LlmError;

/// Unrecoverable failure raised inside a stage. The engine catches it at
/// the stage boundary and converts it to a terminal error state; it never
/// propagates past the run.
#[derive(Debug, Error)]
pub enum StageFailure {
    #[error("model call failed: {0}")]
    Model(#[from] LlmError),

    #[error("document extraction failed: {0}")]
    Extraction(#[from] ExtractError),
}
