//! TTL-bounded in-memory session store.
//!
//! Key properties:
//! - Records expire after a fixed inactivity window measured from the
//!   last `save`/`extend`; expiry is absolute-reset-on-touch.
//! - Expiry is enforced lazily on read, so no background sweep runs.
//!   A `get` racing an expiry returns `None` and the caller allocates a
//!   fresh record — expected behavior, not an error.
//! - Identifiers are namespace-tagged high-entropy tokens, never derived
//!   from user input.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::Utc;
use uuid::Uuid;

use super::record::SessionRecord;
use super::SessionError;
use crate::config::SESSION_TTL;

// ═══════════════════════════════════════════════════════════
// SessionStore
// ═══════════════════════════════════════════════════════════

struct Entry {
    record: SessionRecord,
    expires_at: Instant,
}

/// Durable-for-the-window key/value store of per-user interaction state.
pub struct SessionStore {
    ttl: Duration,
    sessions: Mutex<HashMap<String, Entry>>,
}

impl SessionStore {
    /// Store with an explicit inactivity window (tests use short windows).
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Store with the production 30-minute window.
    pub fn with_default_ttl() -> Self {
        Self::new(SESSION_TTL)
    }

    /// Return the live record for `id` after refreshing its expiry, or
    /// allocate a fresh record under a new identifier.
    pub fn get_or_create(&self, id: Option<&str>) -> Result<SessionRecord, SessionError> {
        if let Some(id) = id.filter(|s| !s.trim().is_empty()) {
            if let Some(mut record) = self.get(id)? {
                self.extend(id, &mut record)?;
                return Ok(record);
            }
        }

        let new_id = generate_session_id();
        let record = SessionRecord::new(&new_id);
        self.save(&new_id, record.clone())?;
        tracing::info!(session_id = %new_id, "allocated new session");
        Ok(record)
    }

    /// Return the record, or `None` if absent or expired.
    pub fn get(&self, id: &str) -> Result<Option<SessionRecord>, SessionError> {
        let mut sessions = self.lock()?;
        match sessions.get(id) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.record.clone())),
            Some(_) => {
                sessions.remove(id);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Upsert the record and reset its expiry to a full window from now.
    pub fn save(&self, id: &str, record: SessionRecord) -> Result<(), SessionError> {
        let mut sessions = self.lock()?;
        sessions.insert(
            id.to_string(),
            Entry {
                record,
                expires_at: Instant::now() + self.ttl,
            },
        );
        Ok(())
    }

    /// Refresh the last-active timestamp and reset expiry without
    /// altering any other content.
    pub fn extend(&self, id: &str, record: &mut SessionRecord) -> Result<(), SessionError> {
        record.last_active = Utc::now();
        self.save(id, record.clone())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Entry>>, SessionError> {
        self.sessions.lock().map_err(|_| SessionError::LockPoisoned)
    }
}

/// High-entropy session identifier with a namespace tag.
fn generate_session_id() -> String {
    format!("sess_{}", Uuid::new_v4().simple())
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
