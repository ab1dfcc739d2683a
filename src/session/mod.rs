pub mod record;
pub mod store;

pub use record::{AnalysisEntry, HistoryTurn, SessionRecord, UploadEntry};
pub use store::SessionStore;

use thiserror::Error;

/// Errors from session store operations.
///
/// Store failures are never masked: losing session continuity silently
/// would corrupt future context assembly, so these propagate to the caller
/// as a hard request failure.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session store lock poisoned")]
    LockPoisoned,
}
