//! Keyed session store with per-session locking and sliding 30-minute expiry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use bahi_core::{DomainError, DomainResult, SessionId};

/// Sessions idle longer than this are treated as gone (30 minutes).
pub const DEFAULT_SESSION_TTL_SECS: i64 = 30 * 60;

/// One conversation session. `F` is the flow-state payload; `F::default()`
/// is the idle state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session<F> {
    pub id: SessionId,
    pub flow: F,
    pub created_at: DateTime<Utc>,
    pub last_touched_at: DateTime<Utc>,
}

impl<F> Session<F> {
    fn expired_at(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.last_touched_at > ttl
    }
}

/// In-memory session store.
///
/// Locking: the outer `RwLock` guards only the id → slot map (lookup, insert,
/// remove). Each session sits behind its own `Mutex`, so operations on a given
/// id are linearizable while different ids never block each other.
#[derive(Debug)]
pub struct SessionStore<F> {
    slots: RwLock<HashMap<SessionId, Arc<Mutex<Session<F>>>>>,
    ttl: Duration,
}

impl<F> SessionStore<F>
where
    F: Clone + Default,
{
    pub fn new() -> Self {
        Self::with_ttl(Duration::seconds(DEFAULT_SESSION_TTL_SECS))
    }

    /// Store with a custom TTL (tests use short TTLs instead of sleeping).
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Create a fresh idle session and return its id.
    pub fn create(&self) -> SessionId {
        let id = SessionId::new();
        let now = Utc::now();
        let session = Session {
            id,
            flow: F::default(),
            created_at: now,
            last_touched_at: now,
        };
        let mut slots = self.slots.write().unwrap_or_else(|e| e.into_inner());
        slots.insert(id, Arc::new(Mutex::new(session)));
        tracing::debug!(session_id = %id, "session created");
        id
    }

    /// Fetch a session, refreshing its `last_touched_at` (sliding expiry).
    ///
    /// A session idle past the TTL is removed and reported as not-found.
    pub fn get(&self, id: &SessionId) -> Option<Session<F>> {
        let slot = self.live_slot(id)?;
        let mut session = slot.lock().unwrap_or_else(|e| e.into_inner());
        session.last_touched_at = Utc::now();
        Some(session.clone())
    }

    /// Replace the session's flow state.
    pub fn update(&self, id: &SessionId, flow: F) -> DomainResult<()> {
        self.modify(id, |f| *f = flow)
    }

    /// Run a closure against the session's flow state under its lock.
    ///
    /// This is the linearizable read-modify-write primitive: concurrent calls
    /// for the same id serialize on the session mutex, so no update is lost.
    pub fn modify<R>(&self, id: &SessionId, f: impl FnOnce(&mut F) -> R) -> DomainResult<R> {
        let slot = self.live_slot(id).ok_or(DomainError::NotFound)?;
        let mut session = slot.lock().unwrap_or_else(|e| e.into_inner());
        session.last_touched_at = Utc::now();
        Ok(f(&mut session.flow))
    }

    /// Reset the session to the idle flow state, keeping the session alive.
    pub fn clear(&self, id: &SessionId) -> DomainResult<()> {
        self.update(id, F::default())
    }

    /// Destroy a session outright.
    pub fn remove(&self, id: &SessionId) {
        let mut slots = self.slots.write().unwrap_or_else(|e| e.into_inner());
        slots.remove(id);
    }

    /// Remove every expired session; returns how many were dropped.
    ///
    /// Safe to run from a periodic timer; `get` already enforces expiry on the
    /// request path, so the sweep only reclaims memory.
    pub fn expire_sweep(&self) -> usize {
        let now = Utc::now();
        let mut slots = self.slots.write().unwrap_or_else(|e| e.into_inner());
        let before = slots.len();
        slots.retain(|_, slot| {
            let session = slot.lock().unwrap_or_else(|e| e.into_inner());
            !session.expired_at(now, self.ttl)
        });
        let dropped = before - slots.len();
        if dropped > 0 {
            tracing::debug!(dropped, "expired sessions swept");
        }
        dropped
    }

    pub fn len(&self) -> usize {
        self.slots.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up a slot, evicting it if expired.
    fn live_slot(&self, id: &SessionId) -> Option<Arc<Mutex<Session<F>>>> {
        let slot = {
            let slots = self.slots.read().unwrap_or_else(|e| e.into_inner());
            slots.get(id)?.clone()
        };

        let expired = {
            let session = slot.lock().unwrap_or_else(|e| e.into_inner());
            session.expired_at(Utc::now(), self.ttl)
        };

        if expired {
            let mut slots = self.slots.write().unwrap_or_else(|e| e.into_inner());
            slots.remove(id);
            tracing::debug!(session_id = %id, "session expired");
            return None;
        }

        Some(slot)
    }
}

impl<F> Default for SessionStore<F>
where
    F: Clone + Default,
{
    fn default() -> Self {
        Self::new()
    }
}
