//! Shared context for the API layer.

use std::sync::Arc;

use crate::collaborators::extractor::DocumentExtract;
use crate::collaborators::llm::ChatModel;
use crate::session::SessionStore;

/// Shared state handed to every handler: the session store plus the
/// collaborators each workflow run is assembled over.
#[derive(Clone)]
pub struct AppContext {
    pub sessions: Arc<SessionStore>,
    pub model: Arc<dyn ChatModel>,
    pub extractor: Arc<dyn DocumentExtract>,
}

impl AppContext {
    pub fn new(
        sessions: Arc<SessionStore>,
        model: Arc<dyn ChatModel>,
        extractor: Arc<dyn DocumentExtract>,
    ) -> Self {
        Self {
            sessions,
            model,
            extractor,
        }
    }
}
