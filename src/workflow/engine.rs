//! Workflow routing engine.
//!
//! Executes a fixed, statically declared graph of named stages for one
//! request. Each stage receives the full current state, returns a declared
//! partial update, and the engine merges the update before following the
//! stage's own routing directive. The engine performs no retries and no
//! rollback: a failing stage ends the run with a terminal error state, and
//! a directive outside the static transition table is a routing defect
//! that forces termination at `finalize` rather than looping or crashing.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use super::state::{InteractionState, StageUpdate};
use super::StageFailure;

// ═══════════════════════════════════════════════════════════
// Stage identity & routing
// ═══════════════════════════════════════════════════════════

/// Closed set of stage names. Every transition point routes through this
/// enum, so an out-of-graph target is unrepresentable and an unmapped one
/// is checked against the transition table at run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageId {
    ClassifyIntent,
    ExtractDocument,
    Redact,
    Analyze,
    AssessRisk,
    Summarize,
    AnswerQuestion,
    Finalize,
}

impl StageId {
    pub const ALL: [StageId; 8] = [
        StageId::ClassifyIntent,
        StageId::ExtractDocument,
        StageId::Redact,
        StageId::Analyze,
        StageId::AssessRisk,
        StageId::Summarize,
        StageId::AnswerQuestion,
        StageId::Finalize,
    ];

    /// The single entry stage.
    pub const ENTRY: StageId = StageId::ClassifyIntent;

    pub fn as_str(self) -> &'static str {
        match self {
            StageId::ClassifyIntent => "classify-intent",
            StageId::ExtractDocument => "extract-document",
            StageId::Redact => "redact",
            StageId::Analyze => "analyze",
            StageId::AssessRisk => "assess-risk",
            StageId::Summarize => "summarize",
            StageId::AnswerQuestion => "answer-question",
            StageId::Finalize => "finalize",
        }
    }

    /// Static graph topology: the stages each stage may route to.
    /// The choice among them belongs to the stage, not the engine.
    fn allowed_next(self) -> &'static [StageId] {
        match self {
            StageId::ClassifyIntent => &[StageId::ExtractDocument, StageId::AnswerQuestion],
            StageId::ExtractDocument => &[StageId::Redact],
            StageId::Redact => &[StageId::Analyze],
            StageId::Analyze => &[StageId::AssessRisk, StageId::Finalize],
            StageId::AssessRisk => &[StageId::Summarize],
            StageId::Summarize => &[StageId::AnswerQuestion, StageId::Finalize],
            StageId::AnswerQuestion => &[StageId::Finalize],
            // Terminal: finalize never routes to another stage.
            StageId::Finalize => &[],
        }
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a stage tells the engine to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Directive {
    /// Continue at the named stage.
    To(StageId),
    /// Terminate the run with the current state.
    End,
}

// ═══════════════════════════════════════════════════════════
// Stage contract
// ═══════════════════════════════════════════════════════════

/// One unit of work in the workflow graph.
///
/// Stages are pure with respect to the engine: they read the state they
/// are given, return a declared partial update, and never touch graph
/// topology. An `Err` is an unrecoverable stage failure; the engine
/// converts it to a terminal error state.
pub trait Stage: Send + Sync {
    fn id(&self) -> StageId;
    fn run(&self, state: &InteractionState) -> Result<StageUpdate, StageFailure>;
}

// ═══════════════════════════════════════════════════════════
// Workflow
// ═══════════════════════════════════════════════════════════

/// Graph assembly errors — defects in wiring, not in execution.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("stage registered twice: {0}")]
    DuplicateStage(StageId),
    #[error("graph is missing stage: {0}")]
    MissingStage(StageId),
}

/// User-facing response when a stage fails mid-run.
pub const STAGE_FAILURE_RESPONSE: &str =
    "Sorry — something went wrong while handling your request. Please try again.";

/// Response when the run terminates without any stage producing one.
pub const EMPTY_RUN_RESPONSE: &str =
    "I'm sorry — I couldn't produce a response for this request.";

/// Hard bound on stages executed in one run. The longest legitimate path
/// visits every stage once; one extra step covers a forced finalize.
const STEP_LIMIT: usize = StageId::ALL.len() + 1;

/// Compiled workflow: the full stage set, executed to completion for one
/// request.
pub struct Workflow<'a> {
    stages: HashMap<StageId, Box<dyn Stage + 'a>>,
}

impl fmt::Debug for Workflow<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workflow")
            .field("stages", &self.stages.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<'a> Workflow<'a> {
    /// Compile a workflow from a complete stage set.
    pub fn new(stages: Vec<Box<dyn Stage + 'a>>) -> Result<Self, GraphError> {
        let mut map: HashMap<StageId, Box<dyn Stage + 'a>> = HashMap::new();
        for stage in stages {
            let id = stage.id();
            if map.insert(id, stage).is_some() {
                return Err(GraphError::DuplicateStage(id));
            }
        }
        for id in StageId::ALL {
            if !map.contains_key(&id) {
                return Err(GraphError::MissingStage(id));
            }
        }
        Ok(Self { stages: map })
    }

    /// Execute the graph from the entry stage until a stage terminates the
    /// run or the designated final stage completes. Always returns a state;
    /// failures and defects are folded into it.
    pub fn run(&self, mut state: InteractionState) -> InteractionState {
        let mut current = StageId::ENTRY;

        for _ in 0..STEP_LIMIT {
            // `new` guarantees every StageId is present.
            let stage = &self.stages[&current];
            tracing::info!(stage = %current, "running workflow stage");

            let update = match stage.run(&state) {
                Ok(update) => update,
                Err(failure) => {
                    let detail = failure.to_string();
                    tracing::error!(
                        stage = %current,
                        error = %truncate_for_log(&detail),
                        "stage failed; terminating run"
                    );
                    let mut terminal = StageUpdate::terminal(STAGE_FAILURE_RESPONSE);
                    terminal.drop_file_payload = true;
                    state.apply(terminal);
                    return state;
                }
            };

            state.apply(update);

            match state.directive {
                Directive::End => return state,
                Directive::To(next) => {
                    if current.allowed_next().contains(&next) {
                        current = next;
                    } else {
                        // Routing defect: force termination at finalize
                        // instead of looping or crashing.
                        tracing::error!(
                            from = %current,
                            to = %next,
                            "unmapped routing directive; forcing finalize"
                        );
                        if current == StageId::Finalize {
                            return state;
                        }
                        current = StageId::Finalize;
                    }
                }
            }
        }

        tracing::error!("stage budget exhausted; terminating run");
        if state.final_response.is_none() {
            state.final_response = Some(EMPTY_RUN_RESPONSE.to_string());
        }
        state
    }
}

/// Truncate failure detail for logging.
pub fn truncate_for_log(detail: &str) -> &str {
    match detail.char_indices().nth(120) {
        Some((idx, _)) => &detail[..idx],
        None => detail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionRecord;
    use crate::workflow::state::InteractionState;

    /// Scripted stage for engine-level tests.
    struct Scripted {
        id: StageId,
        update: fn() -> Result<StageUpdate, StageFailure>,
    }

    impl Stage for Scripted {
        fn id(&self) -> StageId {
            self.id
        }
        fn run(&self, _state: &InteractionState) -> Result<StageUpdate, StageFailure> {
            (self.update)()
        }
    }

    fn stage(id: StageId, update: fn() -> Result<StageUpdate, StageFailure>) -> Box<dyn Stage> {
        Box::new(Scripted { id, update })
    }

    fn finalize_ok() -> Result<StageUpdate, StageFailure> {
        Ok(StageUpdate {
            final_response: Some("done".into()),
            ..StageUpdate::route(Directive::End)
        })
    }

    /// Full stage set where every stage just forwards along the document
    /// path; individual tests override the interesting stages.
    fn happy_path_stages() -> Vec<Box<dyn Stage + 'static>> {
        vec![
            stage(StageId::ClassifyIntent, || {
                Ok(StageUpdate::route(Directive::To(StageId::ExtractDocument)))
            }),
            stage(StageId::ExtractDocument, || {
                Ok(StageUpdate {
                    parsed_text: Some("text".into()),
                    drop_file_payload: true,
                    ..StageUpdate::route(Directive::To(StageId::Redact))
                })
            }),
            stage(StageId::Redact, || {
                Ok(StageUpdate {
                    redacted_text: Some("text".into()),
                    ..StageUpdate::route(Directive::To(StageId::Analyze))
                })
            }),
            stage(StageId::Analyze, || {
                Ok(StageUpdate {
                    findings: Some("findings".into()),
                    ..StageUpdate::route(Directive::To(StageId::AssessRisk))
                })
            }),
            stage(StageId::AssessRisk, || {
                Ok(StageUpdate {
                    risk_flags: Some(vec!["flag".into()]),
                    ..StageUpdate::route(Directive::To(StageId::Summarize))
                })
            }),
            stage(StageId::Summarize, || {
                Ok(StageUpdate {
                    insight: Some("insight".into()),
                    pre_final_response: Some("insight".into()),
                    ..StageUpdate::route(Directive::To(StageId::Finalize))
                })
            }),
            stage(StageId::AnswerQuestion, || {
                Ok(StageUpdate {
                    answer: Some("answer".into()),
                    pre_final_response: Some("answer".into()),
                    ..StageUpdate::route(Directive::To(StageId::Finalize))
                })
            }),
            stage(StageId::Finalize, finalize_ok),
        ]
    }

    fn replace(
        stages: &mut Vec<Box<dyn Stage + 'static>>,
        id: StageId,
        update: fn() -> Result<StageUpdate, StageFailure>,
    ) {
        let idx = stages.iter().position(|s| s.id() == id).unwrap();
        stages[idx] = stage(id, update);
    }

    fn initial_state() -> InteractionState {
        InteractionState::from_request(&SessionRecord::new("sess_engine"), Some("hi".into()), None)
    }

    #[test]
    fn missing_stage_is_a_graph_error() {
        let mut stages = happy_path_stages();
        stages.retain(|s| s.id() != StageId::Redact);
        let err = Workflow::new(stages).unwrap_err();
        assert!(matches!(err, GraphError::MissingStage(StageId::Redact)));
    }

    #[test]
    fn duplicate_stage_is_a_graph_error() {
        let mut stages = happy_path_stages();
        stages.push(stage(StageId::Redact, || {
            Ok(StageUpdate::route(Directive::To(StageId::Analyze)))
        }));
        let err = Workflow::new(stages).unwrap_err();
        assert!(matches!(err, GraphError::DuplicateStage(StageId::Redact)));
    }

    #[test]
    fn run_walks_the_document_path_and_merges_updates() {
        let workflow = Workflow::new(happy_path_stages()).unwrap();
        let state = workflow.run(initial_state());

        assert_eq!(state.final_response.as_deref(), Some("done"));
        assert_eq!(state.findings.as_deref(), Some("findings"));
        assert_eq!(state.risk_flags, vec!["flag".to_string()]);
        assert_eq!(state.directive, Directive::End);
    }

    #[test]
    fn unmapped_directive_forces_finalize() {
        let mut stages = happy_path_stages();
        // classify-intent may not route straight to assess-risk.
        replace(&mut stages, StageId::ClassifyIntent, || {
            Ok(StageUpdate::route(Directive::To(StageId::AssessRisk)))
        });
        let workflow = Workflow::new(stages).unwrap();
        let state = workflow.run(initial_state());

        // Forced finalize still produces a response; the document
        // stages never ran.
        assert_eq!(state.final_response.as_deref(), Some("done"));
        assert!(state.parsed_text.is_none());
        assert!(state.findings.is_none());
    }

    #[test]
    fn finalize_routing_anywhere_is_a_defect_that_ends_the_run() {
        let mut stages = happy_path_stages();
        replace(&mut stages, StageId::Finalize, || {
            Ok(StageUpdate {
                final_response: Some("done".into()),
                ..StageUpdate::route(Directive::To(StageId::ClassifyIntent))
            })
        });
        let workflow = Workflow::new(stages).unwrap();
        let state = workflow.run(initial_state());

        // No loop: the run terminates with finalize's own output.
        assert_eq!(state.final_response.as_deref(), Some("done"));
    }

    #[test]
    fn stage_failure_short_circuits_with_error_response() {
        let mut stages = happy_path_stages();
        replace(&mut stages, StageId::Analyze, || {
            Err(StageFailure::Model(
                crate::collaborators::llm::LlmError::Connection("refused".into()),
            ))
        });
        let workflow = Workflow::new(stages).unwrap();
        let state = workflow.run(initial_state());

        assert_eq!(state.final_response.as_deref(), Some(STAGE_FAILURE_RESPONSE));
        // Later stages were skipped.
        assert!(state.risk_flags.is_empty());
        assert!(state.insight.is_none());
        assert_eq!(state.directive, Directive::End);
    }

    #[test]
    fn truncate_for_log_bounds_long_detail() {
        let long = "x".repeat(500);
        assert_eq!(truncate_for_log(&long).len(), 120);
        assert_eq!(truncate_for_log("short"), "short");
    }
}
