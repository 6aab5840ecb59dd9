use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use uuid::Uuid;

use super::form_controller::FormController;
use crate::error::AppError;

pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLimits {
    pub ttl: Duration,
    pub max_sessions: usize,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_SESSION_TTL,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

struct SessionEntry {
    form: FormController,
    last_seen: Instant,
    touch: u64,
}

#[derive(Default)]
struct Sessions {
    entries: HashMap<Uuid, SessionEntry>,
    touches: u64,
}

impl Sessions {
    fn next_touch(&mut self) -> u64 {
        self.touches += 1;
        self.touches
    }

    fn entry(&mut self, id: Uuid) -> Result<&mut SessionEntry, AppError> {
        let touch = self.next_touch();
        let entry = self
            .entries
            .get_mut(&id)
            .ok_or(AppError::SessionNotFound(id))?;
        entry.last_seen = Instant::now();
        entry.touch = touch;
        Ok(entry)
    }

    /// Drops idle sessions, then the least recently used ones until there is room for one more.
    /// Sessions with a request in flight are never dropped.
    fn evict(&mut self, limits: SessionLimits, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| {
            entry.form.is_loading() || now.duration_since(entry.last_seen) < limits.ttl
        });

        while self.entries.len() >= limits.max_sessions {
            let oldest = self
                .entries
                .iter()
                .filter(|(_, entry)| !entry.form.is_loading())
                .min_by_key(|(_, entry)| entry.touch)
                .map(|(id, _)| *id);
            match oldest {
                Some(id) => {
                    self.entries.remove(&id);
                }
                None => break,
            }
        }

        before - self.entries.len()
    }
}

/// Per-session form state, kept only in memory. Idle sessions expire after `ttl`
/// and the store never holds more than `max_sessions` idle sessions.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<Mutex<Sessions>>,
    limits: SessionLimits,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: SessionLimits) -> Self {
        Self {
            sessions: Arc::default(),
            limits,
        }
    }

    pub fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        let mut sessions = self.sessions.lock();

        let evicted = sessions.evict(self.limits, Instant::now());
        if evicted > 0 {
            tracing::debug!(evicted, "Evicted idle sessions");
        }

        let touch = sessions.next_touch();
        sessions.entries.insert(
            id,
            SessionEntry {
                form: FormController::default(),
                last_seen: Instant::now(),
                touch,
            },
        );
        tracing::info!(session_id = %id, active = sessions.entries.len(), "Session created");
        id
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.sessions.lock().entries.len()
    }

    pub fn read<R>(&self, id: Uuid, f: impl FnOnce(&FormController) -> R) -> Result<R, AppError> {
        let mut sessions = self.sessions.lock();
        let entry = sessions.entry(id)?;
        Ok(f(&entry.form))
    }

    /// Runs `f` under the lock; callers must not await while inside it.
    pub fn update<R>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut FormController) -> R,
    ) -> Result<R, AppError> {
        let mut sessions = self.sessions.lock();
        let entry = sessions.entry(id)?;
        Ok(f(&mut entry.form))
    }
}
